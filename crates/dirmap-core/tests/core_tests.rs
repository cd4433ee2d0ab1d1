use std::collections::HashSet;
use std::time::Duration;

use dirmap_core::{
    AnalysisResult, DirectoryNode, DuplicateGroup, DuplicateMarking, Fingerprint,
    FingerprintScheme, Recommendation, ScanConfig, StatsAccumulator, format_bytes,
};

fn sample_tree() -> DirectoryNode {
    let mut root = DirectoryNode::new_directory("root", "");

    let mut docs = DirectoryNode::new_directory("docs", "docs");
    docs.push_child(
        DirectoryNode::new_file("a.txt", "docs/a.txt", 512)
            .with_fingerprint(Fingerprint::new("41_512"), false),
    );
    let mut nested = DirectoryNode::new_directory("old", "docs/old");
    nested.push_child(
        DirectoryNode::new_file("a-copy.txt", "docs/old/a-copy.txt", 512)
            .with_fingerprint(Fingerprint::new("41_512"), true),
    );
    docs.push_child(nested);

    let empty = DirectoryNode::new_directory("empty", "empty");

    root.push_child(docs);
    root.push_child(empty);
    root.push_child(DirectoryNode::new_file("README", "README", 100));
    root
}

#[test]
fn test_fingerprint_display_and_equality() {
    let a = Fingerprint::new("abcd_4");
    let b = Fingerprint::new(String::from("abcd_4"));

    assert_eq!(a, b);
    assert_eq!(a.to_string(), "abcd_4");
    assert_eq!(a.as_str(), "abcd_4");
    assert_ne!(a, Fingerprint::new("abcd_5"));
}

#[test]
fn test_nested_directory_structure() {
    let root = sample_tree();

    assert_eq!(root.file_count(), 3);
    assert_eq!(root.dir_count(), 3);
    assert_eq!(root.size(), 1124);
    assert_eq!(root.children().len(), 3);

    // Discovery order is preserved, not sorted by size.
    let names: Vec<&str> = root.children().iter().map(DirectoryNode::name).collect();
    assert_eq!(names, vec!["docs", "empty", "README"]);

    let empty = root.find("empty").unwrap();
    assert!(empty.is_dir());
    assert!(empty.children().is_empty());
}

#[test]
fn test_file_node_without_extension() {
    let root = sample_tree();
    match root.find("README").unwrap() {
        DirectoryNode::File { file_type, hash, .. } => {
            assert_eq!(file_type, "");
            assert!(hash.is_none());
        }
        DirectoryNode::Directory { .. } => panic!("Expected file node"),
    }
}

#[test]
fn test_files_iterates_in_discovery_order() {
    let root = sample_tree();
    let paths: Vec<&str> = root.files().into_iter().map(DirectoryNode::path).collect();
    assert_eq!(paths, vec!["docs/a.txt", "docs/old/a-copy.txt", "README"]);
}

#[test]
fn test_mark_all_members() {
    let mut root = sample_tree();
    let paths: HashSet<&str> = ["docs/a.txt", "docs/old/a-copy.txt"].into_iter().collect();
    root.mark_duplicates(&paths);

    let flagged = root.files().into_iter().filter(|f| f.is_duplicate()).count();
    assert_eq!(flagged, 2);
}

#[test]
fn test_node_serialization_shape() {
    let node = DirectoryNode::new_file("a.TXT", "docs/a.TXT", 3)
        .with_fingerprint(Fingerprint::new("616263_3"), true);
    let json = serde_json::to_value(&node).unwrap();

    assert_eq!(json["kind"], "file");
    assert_eq!(json["type"], "txt");
    assert_eq!(json["hash"], "616263_3");
    assert_eq!(json["is_duplicate"], true);

    let back: DirectoryNode = serde_json::from_value(json).unwrap();
    assert_eq!(back, node);
}

#[test]
fn test_stats_against_tree() {
    let mut acc = StatsAccumulator::new();
    acc.record_dir(1); // docs
    acc.record_dir(2); // docs/old
    acc.record_dir(1); // empty
    acc.record_file(512, "txt");
    acc.record_file(512, "txt");
    acc.record_file(100, "");

    let mut group = DuplicateGroup::new(Fingerprint::new("41_512"), "docs/a.txt", "a.txt", 512);
    group.push("docs/old/a-copy.txt", "a-copy.txt");
    let stats = acc.finalize(std::slice::from_ref(&group));

    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.total_dirs, 3);
    assert_eq!(stats.total_size, 1124);
    assert_eq!(stats.duplicate_files, 2);
    assert_eq!(stats.max_depth, 2);
    assert!((stats.avg_depth - 4.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.file_types.len(), 2);
}

#[test]
fn test_analysis_result_helpers() {
    let mut group = DuplicateGroup::new(Fingerprint::new("41_512"), "docs/a.txt", "a.txt", 512);
    group.push("docs/old/a-copy.txt", "a-copy.txt");

    let result = AnalysisResult {
        root: sample_tree(),
        stats: StatsAccumulator::new().finalize(&[]),
        duplicates: vec![group],
        recommendations: vec![Recommendation::new("t", "d").with_suggestion("s")],
        warnings: Vec::new(),
        scanned_at: chrono::Utc::now(),
        scan_duration: Duration::from_millis(5),
    };

    assert!(result.has_duplicates());
    assert!(!result.has_warnings());
    assert_eq!(result.wasted_bytes(), 512);
    assert!(result.find("docs/old").is_some());
    assert_eq!(result.recommendations[0].suggestion.as_deref(), Some("s"));
}

#[test]
fn test_scan_config_from_partial_toml_shape() {
    let config: ScanConfig = serde_json::from_str(
        r#"{ "fingerprint_scheme": "content_name_and_size", "duplicate_marking": "all_members" }"#,
    )
    .unwrap();

    assert_eq!(config.fingerprint_scheme, FingerprintScheme::ContentNameAndSize);
    assert_eq!(config.duplicate_marking, DuplicateMarking::AllMembers);
    assert_eq!(config.fingerprint_prefix_len, 1024);
    assert_eq!(config.max_concurrent_reads, 32);
    assert!(config.validate().is_ok());
}

#[test]
fn test_format_bytes() {
    assert_eq!(format_bytes(0), "0 Bytes");
    assert!(format_bytes(2 * 1024 * 1024).contains("MB"));
}
