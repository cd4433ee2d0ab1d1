//! File and directory node types.

use std::collections::HashSet;
use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Cheap content-adjacent identity token used as the deduplication key.
///
/// This is not a cryptographic digest: two different files collide when their
/// leading bytes and the folded-in metadata coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already composed token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase extension of a file name (text after the last `.`), empty if none.
pub fn file_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// A single file or directory in the scanned tree.
///
/// Children are kept in discovery order. `path` is the identity the
/// visualization layer correlates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirectoryNode {
    /// Directory with its children.
    Directory {
        /// Last path segment.
        name: CompactString,
        /// Full path from the scan root.
        path: String,
        /// Child nodes in discovery order.
        children: Vec<DirectoryNode>,
    },
    /// Regular file.
    File {
        /// Last path segment.
        name: CompactString,
        /// Full path from the scan root.
        path: String,
        /// Size in bytes.
        size: u64,
        /// Lowercase extension, possibly empty.
        #[serde(rename = "type")]
        file_type: String,
        /// Fingerprint, absent when the content could not be read.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hash: Option<Fingerprint>,
        /// Whether this file was flagged as a duplicate.
        #[serde(default)]
        is_duplicate: bool,
    },
}

impl DirectoryNode {
    /// Create an empty directory node.
    pub fn new_directory(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self::Directory {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    /// Create a file node. The extension is derived from the name.
    pub fn new_file(name: impl Into<CompactString>, path: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        let file_type = file_extension(&name);
        Self::File {
            name,
            path: path.into(),
            size,
            file_type,
            hash: None,
            is_duplicate: false,
        }
    }

    /// Attach a fingerprint and duplicate flag to a file node.
    pub fn with_fingerprint(mut self, fingerprint: Fingerprint, duplicate: bool) -> Self {
        if let Self::File {
            hash, is_duplicate, ..
        } = &mut self
        {
            *hash = Some(fingerprint);
            *is_duplicate = duplicate;
        }
        self
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } | Self::File { name, .. } => name.as_str(),
        }
    }

    /// Full path from the scan root.
    pub fn path(&self) -> &str {
        match self {
            Self::Directory { path, .. } | Self::File { path, .. } => path,
        }
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Fingerprint of a file node.
    pub fn hash(&self) -> Option<&Fingerprint> {
        match self {
            Self::File { hash, .. } => hash.as_ref(),
            Self::Directory { .. } => None,
        }
    }

    /// Whether a file node is flagged as duplicate. Always false for directories.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::File { is_duplicate: true, .. })
    }

    /// Direct children (empty for files).
    pub fn children(&self) -> &[DirectoryNode] {
        match self {
            Self::Directory { children, .. } => children,
            Self::File { .. } => &[],
        }
    }

    /// Append a child. Returns `false` when called on a file node.
    pub fn push_child(&mut self, child: DirectoryNode) -> bool {
        match self {
            Self::Directory { children, .. } => {
                children.push(child);
                true
            }
            Self::File { .. } => false,
        }
    }

    /// File size, or aggregate size of the subtree for directories.
    pub fn size(&self) -> u64 {
        match self {
            Self::File { size, .. } => *size,
            Self::Directory { children, .. } => children.iter().map(DirectoryNode::size).sum(),
        }
    }

    /// Number of files in this subtree (1 for a file).
    pub fn file_count(&self) -> u64 {
        match self {
            Self::File { .. } => 1,
            Self::Directory { children, .. } => children.iter().map(DirectoryNode::file_count).sum(),
        }
    }

    /// Number of directories below this node, excluding itself.
    pub fn dir_count(&self) -> u64 {
        self.children()
            .iter()
            .filter(|c| c.is_dir())
            .map(|c| c.dir_count() + 1)
            .sum()
    }

    /// Find a node by its path.
    pub fn find(&self, path: &str) -> Option<&DirectoryNode> {
        if self.path() == path {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(path))
    }

    /// All file nodes of this subtree, depth-first in discovery order.
    pub fn files(&self) -> Vec<&DirectoryNode> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a DirectoryNode>) {
        match self {
            Self::File { .. } => out.push(self),
            Self::Directory { children, .. } => {
                for child in children {
                    child.collect_files(out);
                }
            }
        }
    }

    /// Flag every file whose path is in `paths` as a duplicate.
    pub fn mark_duplicates(&mut self, paths: &HashSet<&str>) {
        match self {
            Self::File {
                path, is_duplicate, ..
            } => {
                if paths.contains(path.as_str()) {
                    *is_duplicate = true;
                }
            }
            Self::Directory { children, .. } => {
                for child in children {
                    child.mark_duplicates(paths);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), "jpg");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("Makefile"), "");
        assert_eq!(file_extension(".bashrc"), "bashrc");
    }

    #[test]
    fn test_file_node_creation() {
        let node = DirectoryNode::new_file("test.txt", "/root/test.txt", 1024);
        assert!(node.is_file());
        assert!(!node.is_dir());
        assert_eq!(node.size(), 1024);
        assert!(node.hash().is_none());
        assert!(!node.is_duplicate());
        match &node {
            DirectoryNode::File { file_type, .. } => assert_eq!(file_type, "txt"),
            DirectoryNode::Directory { .. } => panic!("expected file"),
        }
    }

    #[test]
    fn test_directory_aggregates() {
        let mut root = DirectoryNode::new_directory("root", "/root");
        let mut sub = DirectoryNode::new_directory("sub", "/root/sub");
        sub.push_child(DirectoryNode::new_file("a.txt", "/root/sub/a.txt", 10));
        root.push_child(sub);
        root.push_child(DirectoryNode::new_file("b.txt", "/root/b.txt", 5));

        assert_eq!(root.size(), 15);
        assert_eq!(root.file_count(), 2);
        assert_eq!(root.dir_count(), 1);
        assert_eq!(root.find("/root/sub/a.txt").map(|n| n.name()), Some("a.txt"));
        assert!(root.find("/root/missing").is_none());
    }

    #[test]
    fn test_push_child_on_file_is_rejected() {
        let mut file = DirectoryNode::new_file("a.txt", "a.txt", 1);
        assert!(!file.push_child(DirectoryNode::new_file("b.txt", "b.txt", 1)));
    }

    #[test]
    fn test_mark_duplicates() {
        let mut root = DirectoryNode::new_directory("root", "");
        root.push_child(DirectoryNode::new_file("a.txt", "a.txt", 1));
        root.push_child(DirectoryNode::new_file("b.txt", "b.txt", 1));

        let paths: HashSet<&str> = ["a.txt"].into_iter().collect();
        root.mark_duplicates(&paths);

        assert!(root.find("a.txt").is_some_and(DirectoryNode::is_duplicate));
        assert!(!root.find("b.txt").is_some_and(DirectoryNode::is_duplicate));
    }
}
