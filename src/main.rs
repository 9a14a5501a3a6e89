use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use nshealth::data::units::{format_size, parse_duration};
use nshealth::{
    CeleniumSource, FileSource, HealthEngine, HealthHistory, HealthReport, MessagePage,
    NamespaceSource, Settings,
};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Parser, Debug)]
#[command(name = "nshealth")]
#[command(about = "Health scoring for Celestia data-availability namespaces")]
struct Args {
    /// Namespace identifier (hex)
    namespace_id: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Indexer API base URL (overrides configuration)
    #[arg(long, conflicts_with = "file")]
    api_url: Option<String>,

    /// Score a recorded fixture file instead of querying the indexer
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Number of messages in the scoring sample
    #[arg(long)]
    page_size: Option<u32>,

    /// Refresh the score this many times after the initial analysis
    #[arg(short, long, default_value = "0")]
    refresh: u32,

    /// Delay between refreshes (e.g., "30s", "1m")
    #[arg(long, default_value = "30s")]
    interval: String,

    /// Load one more page of messages starting at this offset
    #[arg(long)]
    page: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Export the final report to a JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Everything the binary prints or exports.
#[derive(Debug, Serialize)]
struct Output<'a> {
    source: &'a str,
    report: &'a HealthReport,
    /// Dashboard colour for the report's tier.
    status_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<&'a MessagePage>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = Settings::load(args.config.as_deref())?
        .with_overrides(args.api_url, args.page_size)
        .context("invalid command-line option")?;
    let interval = parse_duration(&args.interval)?;

    let source: Arc<dyn NamespaceSource> = match &args.file {
        Some(path) => Arc::new(FileSource::new(path)),
        None => Arc::new(CeleniumSource::new(settings.client()?)),
    };
    let engine = HealthEngine::new(source, settings.engine_settings());

    let mut report = engine
        .analyze(&args.namespace_id)
        .await
        .with_context(|| format!("failed to analyze namespace {}", args.namespace_id))?;

    for round in 1..=args.refresh {
        tokio::time::sleep(interval).await;
        report = engine.refresh().await.context("refresh failed")?;
        info!(round, score = report.score, "refresh complete");
        if !args.json {
            println!(
                "refresh {}/{}: {:.1} ({})",
                round, args.refresh, report.score, report.status
            );
        }
    }

    let page = match args.page {
        Some(offset) => Some(
            engine
                .load_message_page(offset, settings.page_size)
                .await
                .with_context(|| format!("failed to load messages at offset {}", offset))?,
        ),
        None => None,
    };

    let output = Output {
        source: engine.source_description(),
        report: &report,
        status_color: report.status.color(),
        page: page.as_ref(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&output, &engine.history());
    }

    if let Some(path) = args.export {
        export_to_file(&output, &path)?;
    }

    Ok(())
}

/// Logs go to stderr so `--json` output stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn print_report(output: &Output<'_>, history: &HealthHistory) {
    let report = output.report;
    let ns = &report.namespace;

    println!("Namespace   {} ({})", ns.display_name(), ns.namespace_id);
    println!("Source      {}", output.source);
    println!(
        "Activity    {} posted, {} blobs in {} PFBs, last height {}",
        format_size(ns.size),
        ns.blobs_count,
        ns.pfb_count,
        ns.last_height
    );
    println!("Last seen   {}", ns.last_message_time.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    println!(
        "Score       {:.1} / 10  [{}] {} (tier from {:.0})",
        report.score,
        report.status.symbol(),
        report.status,
        report.status.lower_bound()
    );
    for (label, value) in report.metrics.iter() {
        println!("  {:<22}{:>5.1}", label, value);
    }
    println!("  sample: {} message(s)", report.sample_size);

    let trend = history
        .trend()
        .map(|delta| format!(", trend {:+.1}", delta))
        .unwrap_or_default();
    let spark: String = history
        .sparkline()
        .into_iter()
        .map(|level| SPARK_LEVELS[usize::from(level.min(7))])
        .collect();
    println!("History     {} ({} point(s){})", spark, history.len(), trend);
    if let Some(latest) = history.latest() {
        println!("Scored at   {}", latest.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    if report.rollups.is_empty() {
        println!("Rollups     none");
    } else {
        for rollup in &report.rollups {
            let links = rollup.all_links();
            if links.is_empty() {
                println!("Rollup      {}", rollup.name);
            } else {
                println!("Rollup      {} ({})", rollup.name, links.join(", "));
            }
        }
    }

    for notice in &report.notices {
        println!("Notice      {}", notice);
    }

    if let Some(page) = output.page {
        println!();
        println!(
            "Messages    page {} (offset {}), {} shown of ~{}",
            page.page_index() + 1,
            page.offset,
            page.messages.len(),
            page.estimated_total
        );
        for msg in &page.messages {
            let size = msg.size.map(format_size).unwrap_or_else(|| "-".to_string());
            let blobs = msg.blob_bytes().map(format_size).unwrap_or_else(|| "-".to_string());
            let status = if msg.is_successful() { "ok" } else { "failed" };
            println!(
                "  {:>10}  {:>9}  {}  {:<16}  {:>9}  {:>9}  {}",
                msg.id,
                msg.height,
                msg.time.format("%Y-%m-%d %H:%M:%S"),
                msg.msg_type,
                size,
                blobs,
                status
            );
        }
        if page.has_more() {
            println!(
                "  more with --page {}",
                page.offset + page.messages.len() as u64
            );
        }
    }
}

fn export_to_file(output: &Output<'_>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;

    eprintln!("Exported report to: {}", path.display());
    Ok(())
}
