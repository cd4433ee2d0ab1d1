//! In-memory sources.
//!
//! Useful for embedding dirmap behind another enumeration layer, for the
//! demonstration dataset and for exercising failure paths.

use std::io;
use std::sync::Arc;
use std::time::SystemTime;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use super::{DirectorySource, EntryReader, FileSource, FlatFile, SourceEntry};

/// Default number of entries handed out per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// A file held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    relative_path: String,
    contents: Arc<[u8]>,
    size: u64,
    unreadable: bool,
}

impl MemoryFile {
    /// Create a file at a slash-separated relative path.
    pub fn new(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        let relative_path = relative_path.into();
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let contents: Arc<[u8]> = contents.into().into();
        Self {
            name,
            relative_path,
            size: contents.len() as u64,
            contents,
            unreadable: false,
        }
    }

    /// Report a size other than the content length.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Make every content read fail with a permission error.
    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn modified(&self) -> Option<SystemTime> {
        None
    }

    fn read_prefix(&self, limit: usize) -> BoxFuture<'_, io::Result<Vec<u8>>> {
        let result = if self.unreadable {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is not readable", self.relative_path),
            ))
        } else {
            let end = limit.min(self.contents.len());
            Ok(self.contents[..end].to_vec())
        };
        future::ready(result).boxed()
    }
}

impl FlatFile for MemoryFile {
    fn relative_path(&self) -> &str {
        &self.relative_path
    }
}

#[derive(Debug, Clone)]
enum MemoryEntry {
    Dir(Arc<MemoryDirectory>),
    File(Arc<MemoryFile>),
}

/// A directory held in memory.
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    name: String,
    entries: Vec<MemoryEntry>,
    batch_size: usize,
    unsupported: bool,
    failing: bool,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            unsupported: false,
            failing: false,
        }
    }

    /// Build a hierarchy from files whose relative paths are taken from
    /// inside this directory. Intermediate directories appear in first-seen
    /// order.
    pub fn from_files(name: impl Into<String>, files: impl IntoIterator<Item = MemoryFile>) -> Self {
        let mut root = Self::new(name);
        for file in files {
            let path = file.relative_path.clone();
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let dirs = segments.split_last().map(|(_, dirs)| dirs).unwrap_or_default();
            root.insert(dirs, file);
        }
        root
    }

    fn insert(&mut self, dirs: &[&str], file: MemoryFile) {
        let Some((first, rest)) = dirs.split_first() else {
            self.entries.push(MemoryEntry::File(Arc::new(file)));
            return;
        };
        let existing = self.entries.iter_mut().find_map(|e| match e {
            MemoryEntry::Dir(dir) if dir.name == *first => Some(dir),
            _ => None,
        });
        match existing {
            Some(dir) => Arc::make_mut(dir).insert(rest, file),
            None => {
                let mut dir = Self::new(*first);
                dir.batch_size = self.batch_size;
                dir.insert(rest, file);
                self.entries.push(MemoryEntry::Dir(Arc::new(dir)));
            }
        }
    }

    /// Add a file.
    pub fn with_file(mut self, file: MemoryFile) -> Self {
        self.entries.push(MemoryEntry::File(Arc::new(file)));
        self
    }

    /// Add a subdirectory.
    pub fn with_dir(mut self, dir: MemoryDirectory) -> Self {
        self.entries.push(MemoryEntry::Dir(Arc::new(dir)));
        self
    }

    /// Hand out entries `batch_size` at a time.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Make `reader` report that enumeration is unsupported.
    pub fn unsupported(mut self) -> Self {
        self.unsupported = true;
        self
    }

    /// Make every batch read fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl DirectorySource for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> io::Result<Box<dyn EntryReader>> {
        if self.unsupported {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "directory enumeration is not available",
            ));
        }
        let entries = self
            .entries
            .iter()
            .map(|entry| match entry {
                MemoryEntry::Dir(dir) => SourceEntry::Directory(dir.clone()),
                MemoryEntry::File(file) => SourceEntry::File(file.clone()),
            })
            .collect();
        Ok(Box::new(MemoryReader {
            entries,
            position: 0,
            batch_size: self.batch_size,
            failing: self.failing,
        }))
    }
}

struct MemoryReader {
    entries: Vec<SourceEntry>,
    position: usize,
    batch_size: usize,
    failing: bool,
}

impl EntryReader for MemoryReader {
    fn next_batch(&mut self) -> BoxFuture<'_, io::Result<Vec<SourceEntry>>> {
        let result = if self.failing {
            Err(io::Error::other("directory listing failed"))
        } else {
            let end = (self.position + self.batch_size).min(self.entries.len());
            let batch = self.entries[self.position..end].to_vec();
            self.position = end;
            Ok(batch)
        };
        future::ready(result).boxed()
    }
}
