//! Duplicate group reporting.

use serde::{Deserialize, Serialize};

use dirmap_core::DuplicateGroup;

/// Duplicate groups ranked by reclaimable space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups sorted by wasted space, largest first. Ties keep discovery order.
    pub groups: Vec<DuplicateGroup>,

    /// Total size of all member files.
    pub total_duplicate_size: u64,

    /// Total wasted space (could be reclaimed).
    pub total_wasted_space: u64,

    /// Number of files that belong to a group.
    pub files_with_duplicates: u64,

    /// Groups whose members carry different names.
    pub renamed_groups: usize,
}

impl DuplicateReport {
    /// Build a report from finalized groups, keeping at most `max_groups`
    /// (0 = unlimited). Totals always cover every group.
    pub fn from_groups(groups: &[DuplicateGroup], max_groups: usize) -> Self {
        let total_duplicate_size = groups.iter().map(|g| g.size * g.count() as u64).sum();
        let total_wasted_space = groups.iter().map(DuplicateGroup::wasted_bytes).sum();
        let files_with_duplicates = groups.iter().map(|g| g.count() as u64).sum();
        let renamed_groups = groups.iter().filter(|g| g.has_renamed_members()).count();

        let mut ranked = groups.to_vec();
        ranked.sort_by(|a, b| b.wasted_bytes().cmp(&a.wasted_bytes()));
        if max_groups > 0 {
            ranked.truncate(max_groups);
        }

        Self {
            groups: ranked,
            total_duplicate_size,
            total_wasted_space,
            files_with_duplicates,
            renamed_groups,
        }
    }

    /// Get the number of groups in the report.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Check if no duplicates were found.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirmap_core::Fingerprint;

    fn group(hash: &str, size: u64, names: &[&str]) -> DuplicateGroup {
        let mut group = DuplicateGroup::new(Fingerprint::new(hash), names[0], names[0], size);
        for name in &names[1..] {
            group.push(*name, *name);
        }
        group
    }

    #[test]
    fn test_ranked_by_wasted_space() {
        let groups = vec![
            group("small", 10, &["a", "b"]),
            group("big", 100, &["c", "d", "e"]),
            group("tie", 10, &["f", "g"]),
        ];
        let report = DuplicateReport::from_groups(&groups, 0);

        let hashes: Vec<&str> = report.groups.iter().map(|g| g.hash.as_str()).collect();
        assert_eq!(hashes, vec!["big", "small", "tie"]);
        assert_eq!(report.total_wasted_space, 220);
        assert_eq!(report.total_duplicate_size, 340);
        assert_eq!(report.files_with_duplicates, 7);
        assert_eq!(report.renamed_groups, 3);
    }

    #[test]
    fn test_truncation_keeps_totals() {
        let groups = vec![group("x", 5, &["a", "a"]), group("y", 50, &["b", "b"])];
        let report = DuplicateReport::from_groups(&groups, 1);

        assert_eq!(report.group_count(), 1);
        assert_eq!(report.groups[0].hash.as_str(), "y");
        assert_eq!(report.total_wasted_space, 55);
        assert_eq!(report.renamed_groups, 0);
    }

    #[test]
    fn test_empty_report() {
        let report = DuplicateReport::from_groups(&[], 0);
        assert!(report.is_empty());
        assert_eq!(report.total_wasted_space, 0);
    }
}
