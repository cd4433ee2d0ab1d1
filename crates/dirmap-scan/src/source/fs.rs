//! Local filesystem sources.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use futures::FutureExt;
use futures::future::BoxFuture;
use jwalk::WalkDir;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use dirmap_core::{ScanConfig, ScanError};

use super::{DirectorySource, EntryReader, FileSource, FlatFile, SourceEntry};

/// Default number of directory entries pulled per batch.
pub const DEFAULT_READ_BATCH: usize = 256;

/// A directory on the local filesystem, enumerated with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    path: PathBuf,
    name: String,
    batch_size: usize,
}

impl FsDirectory {
    /// Open a directory. The path must exist and be a directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|e| ScanError::io(path.as_ref().display().to_string(), e))?;
        if !path.is_dir() {
            return Err(ScanError::NotADirectory {
                path: path.display().to_string(),
            });
        }
        Ok(Self {
            name: display_name(&path),
            path,
            batch_size: DEFAULT_READ_BATCH,
        })
    }

    /// Pull at most `batch_size` entries per batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Absolute path of this directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectorySource for FsDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn reader(&self) -> io::Result<Box<dyn EntryReader>> {
        Ok(Box::new(FsEntryReader {
            path: self.path.clone(),
            batch_size: self.batch_size,
            read_dir: None,
            finished: false,
        }))
    }
}

struct FsEntryReader {
    path: PathBuf,
    batch_size: usize,
    read_dir: Option<tokio::fs::ReadDir>,
    finished: bool,
}

impl FsEntryReader {
    async fn read_batch(&mut self) -> io::Result<Vec<SourceEntry>> {
        if self.finished {
            return Ok(Vec::new());
        }
        if self.read_dir.is_none() {
            self.read_dir = Some(tokio::fs::read_dir(&self.path).await?);
        }
        let Some(read_dir) = self.read_dir.as_mut() else {
            return Ok(Vec::new());
        };

        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            let Some(entry) = read_dir.next_entry().await? else {
                self.finished = true;
                self.read_dir = None;
                break;
            };
            match Self::inspect(self.batch_size, &entry).await {
                Ok(Some(source_entry)) => batch.push(source_entry),
                Ok(None) => {}
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "Skipping entry that vanished or cannot be inspected");
                }
            }
        }
        Ok(batch)
    }

    /// Symlinks and special files yield `None`; they are not followed.
    async fn inspect(batch_size: usize, entry: &tokio::fs::DirEntry) -> io::Result<Option<SourceEntry>> {
        let file_type = entry.file_type().await?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if file_type.is_dir() {
            return Ok(Some(SourceEntry::Directory(Arc::new(FsDirectory {
                path,
                name,
                batch_size,
            }))));
        }
        if !file_type.is_file() {
            return Ok(None);
        }
        let metadata = entry.metadata().await?;
        Ok(Some(SourceEntry::File(Arc::new(FsFile {
            relative_path: name.clone(),
            path,
            name,
            size: metadata.len(),
            modified: metadata.modified().ok(),
        }))))
    }
}

impl EntryReader for FsEntryReader {
    fn next_batch(&mut self) -> BoxFuture<'_, io::Result<Vec<SourceEntry>>> {
        self.read_batch().boxed()
    }
}

/// A regular file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsFile {
    path: PathBuf,
    name: String,
    relative_path: String,
    size: u64,
    modified: Option<SystemTime>,
}

impl FsFile {
    /// Absolute path of this file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    fn read_prefix(&self, limit: usize) -> BoxFuture<'_, io::Result<Vec<u8>>> {
        async move {
            let file = tokio::fs::File::open(&self.path).await?;
            let mut buf = Vec::with_capacity(limit);
            file.take(limit as u64).read_to_end(&mut buf).await?;
            Ok(buf)
        }
        .boxed()
    }
}

impl FlatFile for FsFile {
    fn relative_path(&self) -> &str {
        &self.relative_path
    }
}

/// Enumerate every regular file under `root` as a flat list.
///
/// Relative paths start with the root folder's own name, so
/// `/home/me/photos/2020/a.jpg` becomes `photos/2020/a.jpg`. Hidden entries
/// are skipped when the config excludes them; symlinks are not followed.
pub fn enumerate_files(
    root: impl AsRef<Path>,
    config: &ScanConfig,
) -> Result<Vec<Arc<dyn FlatFile>>, ScanError> {
    let root = root
        .as_ref()
        .canonicalize()
        .map_err(|e| ScanError::io(root.as_ref().display().to_string(), e))?;
    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.display().to_string(),
        });
    }
    let root_name = display_name(&root);

    let walker = WalkDir::new(&root)
        .skip_hidden(!config.include_hidden)
        .follow_links(false)
        .sort(true);

    let mut files: Vec<Arc<dyn FlatFile>> = Vec::new();
    for entry_result in walker {
        let entry = entry_result.map_err(|err| ScanError::Traversal {
            path: err
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| root.display().to_string()),
            message: err.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping file that vanished or cannot be inspected");
                continue;
            }
        };
        let relative = path
            .strip_prefix(&root)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        files.push(Arc::new(FsFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            relative_path: format!("{root_name}/{relative}"),
            path: path.clone(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        }));
    }

    debug!(root = %root.display(), files = files.len(), "enumerated flat file list");
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // Tree lives in a visible subfolder: temp dir names start with a dot.
    fn create_test_tree() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("tree");

        fs::create_dir(&root).unwrap();
        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join(".hidden"), "secret").unwrap();

        (temp, root)
    }

    #[tokio::test]
    async fn test_reader_lists_entries_in_batches() {
        let (_temp, root) = create_test_tree();
        let dir = FsDirectory::open(&root).unwrap().with_batch_size(1);
        assert_eq!(dir.name(), "tree");

        let mut reader = dir.reader().unwrap();
        let mut names = Vec::new();
        loop {
            let batch = reader.next_batch().await.unwrap();
            if batch.is_empty() {
                break;
            }
            assert_eq!(batch.len(), 1);
            names.extend(batch.iter().map(|e| e.name().to_string()));
        }
        names.sort();
        assert_eq!(names, vec![".hidden", "dir1", "empty", "file1.txt"]);
    }

    #[tokio::test]
    async fn test_fs_file_prefix() {
        let (_temp, root) = create_test_tree();
        let dir = FsDirectory::open(&root).unwrap();
        let mut reader = dir.reader().unwrap();
        let batch = reader.next_batch().await.unwrap();

        let file = batch
            .into_iter()
            .find_map(|e| match e {
                SourceEntry::File(f) if f.name() == "file1.txt" => Some(f),
                _ => None,
            })
            .unwrap();
        assert_eq!(file.size(), 5);
        assert!(file.modified().is_some());
        assert_eq!(file.read_prefix(3).await.unwrap(), b"hel");
    }

    #[tokio::test]
    async fn test_vanished_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("churn");
        fs::create_dir(&root).unwrap();
        for i in 0..8 {
            fs::write(root.join(format!("tmp{i}.part")), "x").unwrap();
        }

        let dir = FsDirectory::open(&root).unwrap().with_batch_size(1);
        let mut reader = dir.reader().unwrap();
        let first = reader.next_batch().await.unwrap();
        assert_eq!(first.len(), 1);

        // Entries already listed ahead of the consumer disappear before stat.
        for i in 0..8 {
            let _ = fs::remove_file(root.join(format!("tmp{i}.part")));
        }

        let rest = reader.next_batch().await.unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_open_rejects_files() {
        let (_temp, root) = create_test_tree();
        let err = FsDirectory::open(root.join("file1.txt")).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn test_enumerate_files_relative_paths() {
        let (_temp, root) = create_test_tree();

        let config = ScanConfig {
            include_hidden: false,
            ..ScanConfig::default()
        };
        let files = enumerate_files(&root, &config).unwrap();
        let mut paths: Vec<String> = files.iter().map(|f| f.relative_path().to_string()).collect();
        paths.sort();

        assert_eq!(
            paths,
            vec!["tree/dir1/file2.txt", "tree/dir1/subdir/file3.txt", "tree/file1.txt"]
        );
    }
}
