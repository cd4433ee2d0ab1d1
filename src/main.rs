//! dirmap - map a directory tree, find duplicate files and summarize it.
//!
//! Usage:
//!   dirmap scan [PATH]         Scan and show a summary tree
//!   dirmap duplicates [PATH]   List duplicate groups
//!   dirmap export [PATH]       Export the full analysis to JSON
//!   dirmap demo                Analyze the built-in demonstration dataset
//!   dirmap --help              Show help

mod logging;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use dirmap_analyze::{DuplicateReport, RuleEvaluator};
use dirmap_core::format_bytes;
use dirmap_scan::{
    AnalysisResult, DirectoryNode, FsDirectory, ProgressInfo, ScanConfig, ScanError,
    ScanPipeline, Stage, demo, enumerate_files,
};

#[derive(Parser)]
#[command(
    name = "dirmap",
    version,
    about = "Map a directory tree and find duplicate files",
    long_about = "dirmap walks a folder, fingerprints every file from its first bytes, \
                  groups likely duplicates and summarizes the tree.\n\n\
                  Press Ctrl-C to cancel a running scan."
)]
struct Cli {
    /// Load scan settings from a TOML file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Do not draw the progress line
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SourceArgs {
    /// Path to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Enumerate all files up front instead of walking directory handles
    #[arg(long)]
    flat: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scan and show a summary
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Maximum depth to display
        #[arg(short, long, default_value = "3")]
        depth: u32,

        /// Number of entries to show per directory
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Find duplicate files
    Duplicates {
        #[command(flatten)]
        source: SourceArgs,

        /// Maximum number of duplicate groups to show (0 = all)
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Export the analysis to JSON
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze the built-in demonstration dataset
    Demo {
        /// Maximum depth to display
        #[arg(short, long, default_value = "3")]
        depth: u32,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let show_progress = !cli.quiet;

    match cli.command {
        Command::Scan {
            source,
            depth,
            top,
            format,
        } => {
            let result = analyze(&source, config, show_progress).await?;
            let label = source.path.display().to_string();
            print_result(&result, &label, depth, top, format)?;
        }
        Command::Duplicates {
            source,
            top,
            format,
        } => {
            let result = analyze(&source, config, show_progress).await?;
            print_duplicates(&result, top, format)?;
        }
        Command::Export { source, output } => {
            let result = analyze(&source, config, show_progress).await?;
            run_export(&result, output)?;
        }
        Command::Demo { depth, format } => {
            let pipeline = build_pipeline(config)?;
            let printer = show_progress.then(|| spawn_progress_printer(pipeline.subscribe()));
            let result = pipeline.scan_files(demo::demo_files()).await;
            drop(pipeline);
            if let Some(printer) = printer {
                let _ = printer.await;
            }
            let result = result.context("Demo analysis failed")?;
            print_result(&result, demo::DEMO_ROOT, depth, 10, format)?;
        }
    }

    Ok(())
}

/// Read scan settings, falling back to defaults.
fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    let Some(path) = path else {
        return Ok(ScanConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Could not read config {}", path.display()))?;
    let config: ScanConfig = toml::from_str(&text)
        .wrap_err_with(|| format!("Invalid config {}", path.display()))?;
    config.validate()?;
    info!(path = %path.display(), "Loaded scan config");
    Ok(config)
}

fn build_pipeline(config: ScanConfig) -> Result<ScanPipeline> {
    let pipeline = ScanPipeline::new(config)?.with_recommender(RuleEvaluator::new());

    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    Ok(pipeline)
}

/// Scan a local folder, retrying with a flat file list when walking
/// directory handles fails.
async fn analyze(source: &SourceArgs, config: ScanConfig, show_progress: bool) -> Result<AnalysisResult> {
    let pipeline = build_pipeline(config)?;
    let printer = show_progress.then(|| spawn_progress_printer(pipeline.subscribe()));

    let result = if source.flat {
        scan_flat(&pipeline, &source.path).await
    } else {
        match scan_handles(&pipeline, &source.path).await {
            Err(err) if !err.is_cancelled() => {
                warn!(error = %err, "Directory walk failed, retrying with a flat file list");
                scan_flat(&pipeline, &source.path).await
            }
            other => other,
        }
    };

    drop(pipeline);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    result.wrap_err_with(|| format!("Scan of {} failed", source.path.display()))
}

async fn scan_handles(pipeline: &ScanPipeline, path: &Path) -> Result<AnalysisResult, ScanError> {
    let root = FsDirectory::open(path)?;
    pipeline.scan_directory(Arc::new(root)).await
}

async fn scan_flat(pipeline: &ScanPipeline, path: &Path) -> Result<AnalysisResult, ScanError> {
    let files = tokio::task::block_in_place(|| enumerate_files(path, pipeline.config()))?;
    pipeline.scan_files(files).await
}

/// Draw progress events on stderr until the pipeline goes away.
fn spawn_progress_printer(mut rx: broadcast::Receiver<ProgressInfo>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stderr = std::io::stderr();
        let mut line_open = false;

        loop {
            match rx.recv().await {
                Ok(progress) => {
                    let eta = progress
                        .estimated_time_remaining
                        .filter(|secs| *secs > 0.0)
                        .map(|secs| format!(" ~{secs:.0}s left"))
                        .unwrap_or_default();
                    let _ = write!(
                        stderr,
                        "\r\x1b[2K {:<11} {:>5.1}%  {}{}",
                        progress.stage.to_string(),
                        progress.percentage,
                        truncate(&progress.current_file, 48),
                        eta
                    );
                    let _ = stderr.flush();
                    line_open = progress.stage != Stage::Visualizing;
                    if !line_open {
                        let _ = writeln!(stderr);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        if line_open {
            let _ = writeln!(stderr);
        }
    })
}

/// Print the summary, tree, duplicates and recommendations.
fn print_result(
    result: &AnalysisResult,
    label: &str,
    max_depth: u32,
    top_n: usize,
    format: OutputFormat,
) -> Result<()> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let stats = &result.stats;
    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {}", label, format_bytes(stats.total_size));
    println!(
        " {} files, {} directories, {} file types",
        stats.total_files,
        stats.total_dirs,
        stats.file_types.len()
    );
    println!(
        " Depth: avg {:.1}, max {}",
        stats.avg_depth, stats.max_depth
    );
    println!(" Scanned in {:.2}s", result.scan_duration.as_secs_f64());
    println!("{}", "─".repeat(60));
    println!();

    print_node(&result.root, label, 0, max_depth, top_n, result.root.size());

    if result.has_duplicates() {
        println!();
        println!(
            " {} duplicate files in {} groups, {} reclaimable",
            stats.duplicate_files,
            result.duplicates.len(),
            format_bytes(result.wasted_bytes())
        );
    }

    if !result.recommendations.is_empty() {
        println!();
        println!(" Recommendations:");
        for rec in &result.recommendations {
            println!("   • {}: {}", rec.title, rec.description);
            if let Some(suggestion) = &rec.suggestion {
                for line in suggestion.lines() {
                    println!("       {line}");
                }
            }
        }
    }

    if result.has_warnings() {
        println!();
        println!("{} file(s) could not be read", result.warnings.len());
    }

    Ok(())
}

/// Print duplicate groups ranked by wasted space.
fn print_duplicates(result: &AnalysisResult, top_n: usize, format: OutputFormat) -> Result<()> {
    let report = DuplicateReport::from_groups(&result.duplicates, top_n);

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate File Report");
            println!("{}", "─".repeat(70));
            println!();

            if report.is_empty() {
                println!(" No duplicate files found.");
            } else {
                println!(
                    " Found {} duplicate groups ({} files)",
                    result.duplicates.len(),
                    report.files_with_duplicates
                );
                println!(
                    " Total wasted space: {}",
                    format_bytes(report.total_wasted_space)
                );
                println!();

                for (i, group) in report.groups.iter().enumerate() {
                    println!(
                        " Group {} ({} files, {} each, {} wasted)",
                        i + 1,
                        group.count(),
                        format_bytes(group.size),
                        format_bytes(group.wasted_bytes())
                    );
                    for (path, name) in group.paths.iter().zip(&group.full_filenames) {
                        if *name == group.file_name {
                            println!("   {path}");
                        } else {
                            println!("   {path}  (as {name})");
                        }
                    }
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Export the analysis to JSON.
fn run_export(result: &AnalysisResult, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .wrap_err_with(|| format!("Could not write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{json}");
        }
    }

    Ok(())
}

/// Print a node and its children.
fn print_node(
    node: &DirectoryNode,
    label: &str,
    depth: u32,
    max_depth: u32,
    top_n: usize,
    root_size: u64,
) {
    let indent = "  ".repeat(depth as usize);
    let size = node.size();
    let ratio = if root_size > 0 {
        size as f64 / root_size as f64 * 100.0
    } else {
        0.0
    };

    let bar = make_bar(ratio / 100.0, 10);
    let name = if depth == 0 { label } else { node.name() };
    let dir_marker = if node.is_dir() { "/" } else { "" };
    let dup_marker = if node.is_duplicate() { " (dup)" } else { "" };

    println!(
        "{}{}{:<40} {:>10} {:>5.1}% {}{}",
        indent,
        if node.is_dir() { "▼ " } else { "  " },
        truncate(&format!("{name}{dir_marker}"), 40),
        format_bytes(size),
        ratio,
        bar,
        dup_marker
    );

    if node.is_dir() && depth < max_depth {
        let children = node.children();
        for child in children.iter().take(top_n) {
            print_node(child, label, depth + 1, max_depth, top_n, root_size);
        }

        let remaining = children.len().saturating_sub(top_n);
        if remaining > 0 {
            let indent = "  ".repeat((depth + 1) as usize);
            println!("{indent}  ... and {remaining} more");
        }
    }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
