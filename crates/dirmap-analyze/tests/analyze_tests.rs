use dirmap_analyze::{DuplicateReport, RecommendationConfig, RuleEvaluator};
use dirmap_core::{DuplicateGroup, FileStats, Fingerprint, Recommender, StatsAccumulator};

fn beach_group() -> DuplicateGroup {
    let mut group = DuplicateGroup::new(
        Fingerprint::new("ffd8_5500000"),
        "/root/Pictures/Vacation/beach.jpg",
        "beach.jpg",
        5_500_000,
    );
    group.push("/root/Pictures/Vacation/beach_copy.jpg", "beach_copy.jpg");
    group.push("/root/Downloads/backup/old_photos/beach.jpg", "beach.jpg");
    group
}

fn busy_stats(duplicates: &[DuplicateGroup]) -> FileStats {
    let mut acc = StatsAccumulator::new();
    for ext in ["jpg", "png", "pdf", "docx", "xlsx", "mp4"] {
        acc.record_file(1, ext);
    }
    for _ in 0..1000 {
        acc.record_file(1, "jpg");
    }
    for depth in 0..=6 {
        acc.record_dir(depth);
    }
    acc.finalize(duplicates)
}

#[test]
fn test_all_rules_fire_in_order() {
    let duplicates = vec![beach_group()];
    let stats = busy_stats(&duplicates);

    let recommendations = RuleEvaluator::new().recommend(&stats, &duplicates);
    let titles: Vec<&str> = recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Clean up duplicate files",
            "Organize by file types",
            "Simplify folder structure",
            "Break down large directories",
        ]
    );
    assert!(recommendations.iter().all(|r| r.suggestion.is_some()));
}

#[test]
fn test_duplicate_recommendation_cites_wasted_space() {
    let duplicates = vec![beach_group()];
    let stats = StatsAccumulator::new().finalize(&duplicates);

    let recommendations = RuleEvaluator::new().recommend(&stats, &duplicates);
    assert_eq!(recommendations.len(), 1);

    let description = &recommendations[0].description;
    assert!(description.starts_with("Found 3 duplicate files that waste "));
    // 11,000,000 bytes
    assert!(description.contains("MB"));
}

#[test]
fn test_file_type_and_depth_messages() {
    let stats = busy_stats(&[]);
    let recommendations = RuleEvaluator::new().recommend(&stats, &[]);

    let types = recommendations
        .iter()
        .find(|r| r.title == "Organize by file types")
        .unwrap();
    assert!(types.description.contains("6 different file types"));

    let depth = recommendations
        .iter()
        .find(|r| r.title == "Simplify folder structure")
        .unwrap();
    assert!(depth.description.contains("max depth: 6"));

    let files = recommendations
        .iter()
        .find(|r| r.title == "Break down large directories")
        .unwrap();
    assert!(files.description.contains("1006 files"));
}

#[test]
fn test_config_from_json_uses_defaults() {
    let config: RecommendationConfig = serde_json::from_str(r#"{"max_depth": 2}"#).unwrap();
    assert_eq!(config.max_depth, 2);
    assert_eq!(config.max_file_types, 5);
    assert_eq!(config.max_files, 1000);

    let evaluator = RuleEvaluator::with_config(config);
    let stats = FileStats {
        max_depth: 3,
        ..FileStats::default()
    };
    assert_eq!(evaluator.recommend(&stats, &[]).len(), 1);
}

#[test]
fn test_duplicate_report_over_groups() {
    let mut small = DuplicateGroup::new(Fingerprint::new("aa_10"), "/a", "a.txt", 10);
    small.push("/b", "a.txt");
    let groups = vec![small, beach_group()];

    let report = DuplicateReport::from_groups(&groups, 0);
    assert_eq!(report.group_count(), 2);
    assert_eq!(report.groups[0].file_name, "beach.jpg");
    assert_eq!(report.total_wasted_space, 11_000_010);
    assert_eq!(report.files_with_duplicates, 5);
    assert_eq!(report.renamed_groups, 1);
}
