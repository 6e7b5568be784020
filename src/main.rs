use clap::Parser;
use console::style;
use env_logger::Env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use curator::analyzer::rules::RuleConfig;
use curator::analyzer::{AnalysisResult, Analyzer, Severity};
use curator::cache::{default_cache_path, ScanCache};
use curator::cancel::CancelToken;
use curator::cli::Args;
use curator::dupes::{DuplicateGroup, DuplicateIndex};
use curator::errors::{CuratorError, CuratorResult};
use curator::models::{ScanProgress, ScanResult, ScanStats};
use curator::project::detect_project_type;
use curator::scanner::{ProjectScanner, ScanOptions};
use curator::ui::ProgressReporter;

#[derive(serde::Serialize)]
struct Report<'a> {
    result: &'a ScanResult,
    stats: &'a ScanStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    duplicates: Option<&'a [DuplicateGroup]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<&'a AnalysisResult>,
}

#[tokio::main]
async fn main() -> CuratorResult<()> {
    let args = Args::parse();

    let log_level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    if args.default_config {
        print!("{}", RuleConfig::default().to_toml()?);
        return Ok(());
    }

    if args.threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
        {
            log::warn!("Could not configure thread pool: {}", e);
        }
    } else {
        log::debug!("Using {} extraction threads", num_cpus::get());
    }

    let config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| CuratorError::io(e, path.clone()))?;
            let (config, warnings) = RuleConfig::from_toml_lenient(&content)?;
            for warning in warnings {
                log::warn!("{}: {}", path.display(), warning);
            }
            config
        }
        None => RuleConfig::default(),
    };

    let mut exclude = Vec::with_capacity(args.exclude.len());
    for pattern in &args.exclude {
        exclude.push(regex::Regex::new(pattern).map_err(|e| CuratorError::regex(e, pattern))?);
    }

    let root = std::fs::canonicalize(&args.directory)
        .map_err(|e| CuratorError::io(e, PathBuf::from(&args.directory)))?;

    let cache_path = args
        .cache_file
        .clone()
        .unwrap_or_else(|| default_cache_path(&root));
    let cache = if args.no_cache {
        ScanCache::new()
    } else {
        ScanCache::load(&cache_path).unwrap_or_default()
    };
    let cache = Arc::new(cache);
    log::debug!("Cache at {} ({} entries)", cache_path.display(), cache.len());

    let project_type = detect_project_type(&root);
    if let Some(kind) = project_type {
        log::info!("Detected project type: {:?}", kind);
    }

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    let options = ScanOptions {
        project_type,
        follow_symlinks: args.follow_symlinks,
        max_depth: args.max_depth,
        exclude,
    };
    let scanner = ProjectScanner::new(Arc::clone(&cache), options);

    let (tx, rx) = mpsc::channel::<ScanProgress>(256);
    let ui = tokio::spawn(ProgressReporter::new(args.quiet).run(rx));

    let scan_root = root.clone();
    let scan_cancel = cancel.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        scanner.scan(&scan_root, &scan_cancel, Some(&tx))
    })
    .await??;
    let _ = ui.await;

    if !args.no_cache {
        if let Err(e) = cache.save(&cache_path) {
            log::warn!("Could not persist scan cache: {}", e);
        }
    }

    let want_duplicates = args.duplicates || (args.analyze && config.duplicate.enabled);
    let duplicates = if want_duplicates {
        Some(DuplicateIndex::build(
            &outcome.result.assets,
            &cache,
            &cancel,
        )?)
    } else {
        None
    };

    let analysis = if args.analyze {
        Some(Analyzer::with_config(config).analyze(&outcome.result.assets, duplicates.as_ref()))
    } else {
        None
    };

    if let Some(path) = &args.output {
        let report = Report {
            result: &outcome.result,
            stats: &outcome.stats,
            duplicates: duplicates.as_ref().map(|d| d.groups()),
            analysis: analysis.as_ref(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).map_err(|e| CuratorError::io(e, path.clone()))?;
        log::info!("Report written to {}", path.display());
    }

    if !args.quiet {
        print_summary(&outcome.result, &outcome.stats);
        if args.duplicates {
            if let Some(index) = &duplicates {
                print_duplicates(index);
            }
        }
        if let Some(analysis) = &analysis {
            print_analysis(analysis);
        }
    }

    Ok(())
}

fn print_summary(result: &ScanResult, stats: &ScanStats) {
    println!();
    println!(
        "  {} {}",
        style("Scan completed").green().bold(),
        style(format!("({:.2}s)", stats.duration_seconds)).dim()
    );
    println!(
        "  {} assets, {:.2} MB total",
        style(result.total_count).bold(),
        result.total_size as f64 / (1024.0 * 1024.0)
    );
    println!(
        "  cache: {} reused, {} extracted, {} skipped",
        stats.cached_files, stats.rescanned_files, stats.skipped_files
    );
    if stats.extract_failure_count > 0 {
        println!(
            "  {} {} file(s) had unreadable metadata",
            style("!").yellow(),
            stats.extract_failure_count
        );
    }

    let mut counts: Vec<(&String, &usize)> = result.type_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (kind, count) in counts {
        println!("    {:<10} {}", kind, count);
    }
}

fn print_duplicates(index: &DuplicateIndex) {
    println!();
    if index.is_empty() {
        println!("  {}", style("No duplicate files").green());
        return;
    }
    println!(
        "  {} duplicate group(s), {:.2} MB wasted",
        style(index.groups().len()).bold(),
        index.total_wasted_bytes() as f64 / (1024.0 * 1024.0)
    );
    for group in index.groups() {
        println!("    {} copies of {} bytes:", group.paths.len(), group.size);
        for path in &group.paths {
            println!("      {}", path);
        }
    }
}

fn print_analysis(analysis: &AnalysisResult) {
    println!();
    println!(
        "  {} issue(s): {} error, {} warning, {} info",
        style(analysis.issue_count).bold(),
        style(analysis.error_count).red(),
        style(analysis.warning_count).yellow(),
        style(analysis.info_count).cyan()
    );
    for issue in &analysis.issues {
        let tag = match issue.severity {
            Severity::Error => style("error").red().bold(),
            Severity::Warning => style("warn ").yellow(),
            Severity::Info => style("info ").cyan(),
        };
        println!("  {} [{}] {}: {}", tag, issue.rule_id, issue.asset_path, issue.message);
        if let Some(suggestion) = &issue.suggestion {
            println!("        {}", style(suggestion).dim());
        }
    }
}
