//! Tree construction from slash-separated relative paths.

use std::collections::{HashMap, HashSet};

use compact_str::CompactString;

use dirmap_core::DirectoryNode;

/// Split a relative path into its directory segments and the file name.
/// Empty segments (leading, trailing or doubled slashes) are dropped.
pub fn split_relative_path(relative_path: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();
    let name = segments.pop().unwrap_or_default();
    (segments, name)
}

/// Add every directory prefix of `relative_path` to `prefixes`.
pub fn collect_prefixes(relative_path: &str, prefixes: &mut HashSet<String>) {
    let (dirs, _) = split_relative_path(relative_path);
    let mut current = String::new();
    for dir in dirs {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(dir);
        if !prefixes.contains(&current) {
            prefixes.insert(current.clone());
        }
    }
}

/// Every distinct non-empty directory prefix of the given relative paths.
pub fn directory_prefixes<'a>(relative_paths: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    let mut prefixes = HashSet::new();
    for relative_path in relative_paths {
        collect_prefixes(relative_path, &mut prefixes);
    }
    prefixes
}

#[derive(Debug, Default)]
struct PendingDir {
    name: CompactString,
    path: String,
    children: Vec<PendingChild>,
}

#[derive(Debug)]
enum PendingChild {
    Dir(usize),
    File(DirectoryNode),
}

/// Incrementally builds a tree under a synthetic root, creating
/// intermediate directories the first time a prefix is seen.
#[derive(Debug)]
pub struct TreeBuilder {
    dirs: Vec<PendingDir>,
    by_path: HashMap<String, usize>,
}

impl TreeBuilder {
    /// Index of the root directory.
    pub const ROOT: usize = 0;

    /// Create a builder whose root has the given name and the empty path.
    pub fn new(root_name: impl Into<CompactString>) -> Self {
        Self::with_capacity(root_name, 0)
    }

    /// Create a builder expecting `dir_count` directories below the root.
    pub fn with_capacity(root_name: impl Into<CompactString>, dir_count: usize) -> Self {
        let mut dirs = Vec::with_capacity(dir_count + 1);
        dirs.push(PendingDir {
            name: root_name.into(),
            path: String::new(),
            children: Vec::new(),
        });
        let mut by_path = HashMap::with_capacity(dir_count + 1);
        by_path.insert(String::new(), Self::ROOT);
        Self { dirs, by_path }
    }

    /// Number of directories created below the root.
    pub fn dir_count(&self) -> usize {
        self.dirs.len() - 1
    }

    /// Resolve the directory for `segments`, creating missing ones.
    ///
    /// `on_created` runs once per new directory with its path and depth
    /// (immediate children of the root have depth 1).
    pub fn ensure_dir(&mut self, segments: &[&str], mut on_created: impl FnMut(&str, u32)) -> usize {
        let mut parent = Self::ROOT;
        let mut path = String::new();

        for (i, segment) in segments.iter().enumerate() {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(segment);

            parent = match self.by_path.get(&path) {
                Some(&index) => index,
                None => {
                    let index = self.dirs.len();
                    self.dirs.push(PendingDir {
                        name: CompactString::from(*segment),
                        path: path.clone(),
                        children: Vec::new(),
                    });
                    self.dirs[parent].children.push(PendingChild::Dir(index));
                    self.by_path.insert(path.clone(), index);
                    on_created(&path, i as u32 + 1);
                    index
                }
            };
        }
        parent
    }

    /// Append a file node to a directory returned by [`ensure_dir`](Self::ensure_dir).
    pub fn push_file(&mut self, dir: usize, node: DirectoryNode) {
        if let Some(pending) = self.dirs.get_mut(dir) {
            pending.children.push(PendingChild::File(node));
        }
    }

    /// Assemble the owned tree.
    pub fn build(mut self) -> DirectoryNode {
        Self::materialize(&mut self.dirs, Self::ROOT)
    }

    fn materialize(dirs: &mut [PendingDir], index: usize) -> DirectoryNode {
        let pending = std::mem::take(&mut dirs[index]);
        let mut node = DirectoryNode::new_directory(pending.name, pending.path);
        for child in pending.children {
            let child = match child {
                PendingChild::Dir(child_index) => Self::materialize(dirs, child_index),
                PendingChild::File(file) => file,
            };
            node.push_child(child);
        }
        node
    }
}
