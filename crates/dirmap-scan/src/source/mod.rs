//! Directory source contracts.
//!
//! A scan reads from one of two source shapes:
//!
//! - a [`DirectorySource`] handle whose entries are pulled in batches through
//!   an [`EntryReader`] until an empty batch comes back, recursively;
//! - a flat list of [`FlatFile`]s, each tagged with its slash-separated path
//!   relative to the selected folder.
//!
//! [`fs`] adapts the local filesystem to both shapes and [`memory`] provides
//! in-memory sources.

pub mod fs;
pub mod memory;

use std::io;
use std::sync::Arc;
use std::time::SystemTime;

use futures::future::BoxFuture;

/// A readable file exposed by a source.
pub trait FileSource: Send + Sync {
    /// Bare file name.
    fn name(&self) -> &str;

    /// Size in bytes.
    fn size(&self) -> u64;

    /// Last modification time, if the source knows it.
    fn modified(&self) -> Option<SystemTime>;

    /// Read at most `limit` leading bytes.
    fn read_prefix(&self, limit: usize) -> BoxFuture<'_, io::Result<Vec<u8>>>;
}

/// A file from a pre-enumerated list.
pub trait FlatFile: FileSource {
    /// Slash-separated path relative to the selected folder, file name last.
    fn relative_path(&self) -> &str;
}

/// A directory that can be enumerated.
pub trait DirectorySource: Send + Sync {
    /// Directory name.
    fn name(&self) -> &str;

    /// Start a fresh enumeration.
    ///
    /// Fails with [`io::ErrorKind::Unsupported`] when the source cannot be
    /// enumerated in this environment.
    fn reader(&self) -> io::Result<Box<dyn EntryReader>>;
}

/// Paginated enumeration of one directory.
pub trait EntryReader: Send {
    /// Next batch of entries. An empty batch means the listing is complete.
    fn next_batch(&mut self) -> BoxFuture<'_, io::Result<Vec<SourceEntry>>>;
}

/// One entry yielded by an [`EntryReader`].
#[derive(Clone)]
pub enum SourceEntry {
    /// Subdirectory.
    Directory(Arc<dyn DirectorySource>),
    /// Regular file.
    File(Arc<dyn FileSource>),
}

impl SourceEntry {
    /// Entry name.
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(dir) => dir.name(),
            Self::File(file) => file.name(),
        }
    }
}

impl std::fmt::Debug for SourceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory(dir) => f.debug_tuple("Directory").field(&dir.name()).finish(),
            Self::File(file) => f.debug_tuple("File").field(&file.name()).finish(),
        }
    }
}
