//! Fingerprint to duplicate-group index.

use indexmap::IndexMap;

use dirmap_core::{DirectoryNode, DuplicateGroup, Fingerprint};

/// Accumulates files per fingerprint in discovery order.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    groups: IndexMap<Fingerprint, DuplicateGroup>,
}

impl DuplicateIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file.
    ///
    /// Returns `true` when the fingerprint was already known, meaning this
    /// file is a later member of its group. The first-seen member always gets
    /// `false`.
    pub fn record(&mut self, fingerprint: &Fingerprint, path: &str, file_name: &str, size: u64) -> bool {
        match self.groups.get_mut(fingerprint) {
            Some(group) => {
                group.push(path, file_name);
                true
            }
            None => {
                self.groups.insert(
                    fingerprint.clone(),
                    DuplicateGroup::new(fingerprint.clone(), path, file_name, size),
                );
                false
            }
        }
    }

    /// Record every fingerprinted file of `node` depth-first in child order,
    /// flagging later members on the nodes themselves.
    pub fn record_tree(&mut self, node: &mut DirectoryNode) {
        match node {
            DirectoryNode::File {
                name,
                path,
                size,
                hash: Some(fingerprint),
                is_duplicate,
                ..
            } => {
                *is_duplicate = self.record(fingerprint, path, name.as_str(), *size);
            }
            DirectoryNode::File { .. } => {}
            DirectoryNode::Directory { children, .. } => {
                for child in children {
                    self.record_tree(child);
                }
            }
        }
    }

    /// Number of distinct fingerprints seen.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Keep groups with at least two members, in order of first discovery.
    pub fn finalize(self) -> Vec<DuplicateGroup> {
        self.groups
            .into_values()
            .filter(|group| group.count() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_member_is_not_flagged() {
        let mut index = DuplicateIndex::new();
        let fp = Fingerprint::new("41414141_4");

        assert!(!index.record(&fp, "a/x.txt", "x.txt", 4));
        assert!(index.record(&fp, "b/x.txt", "x.txt", 4));
        assert!(index.record(&fp, "c/z.txt", "z.txt", 4));
        assert_eq!(index.len(), 1);

        let groups = index.finalize();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].file_name, "x.txt");
        assert_eq!(groups[0].paths, vec!["a/x.txt", "b/x.txt", "c/z.txt"]);
        assert_eq!(groups[0].full_filenames, vec!["x.txt", "x.txt", "z.txt"]);
    }

    #[test]
    fn test_singletons_dropped_and_order_kept() {
        let mut index = DuplicateIndex::new();
        let a = Fingerprint::new("a");
        let b = Fingerprint::new("b");
        let c = Fingerprint::new("c");

        index.record(&b, "1", "1", 1);
        index.record(&a, "2", "2", 1);
        index.record(&c, "3", "3", 1);
        index.record(&a, "4", "4", 1);
        index.record(&b, "5", "5", 1);

        let groups = index.finalize();
        let hashes: Vec<&str> = groups.iter().map(|g| g.hash.as_str()).collect();
        assert_eq!(hashes, vec!["b", "a"]);
    }

    #[test]
    fn test_record_tree_follows_child_order() {
        let fp = Fingerprint::new("6869_2");
        let mut root = DirectoryNode::new_directory("root", "/root");
        let mut sub = DirectoryNode::new_directory("sub", "/root/sub");
        sub.push_child(
            DirectoryNode::new_file("b.txt", "/root/sub/b.txt", 2).with_fingerprint(fp.clone(), false),
        );
        root.push_child(sub);
        root.push_child(
            DirectoryNode::new_file("c.txt", "/root/c.txt", 2).with_fingerprint(fp, false),
        );
        root.push_child(DirectoryNode::new_file("d.txt", "/root/d.txt", 2));

        let mut index = DuplicateIndex::new();
        index.record_tree(&mut root);

        assert!(!root.find("/root/sub/b.txt").is_some_and(DirectoryNode::is_duplicate));
        assert!(root.find("/root/c.txt").is_some_and(DirectoryNode::is_duplicate));
        assert!(!root.find("/root/d.txt").is_some_and(DirectoryNode::is_duplicate));

        let groups = index.finalize();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths, vec!["/root/sub/b.txt", "/root/c.txt"]);
        assert_eq!(groups[0].full_filenames, vec!["b.txt", "c.txt"]);
    }

    #[test]
    fn test_empty_index() {
        let index = DuplicateIndex::new();
        assert!(index.is_empty());
        assert!(index.finalize().is_empty());
    }
}
