use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gaa_stats::calculate::MatchSummary;
use gaa_stats::config::AppConfig;
use gaa_stats::fetch::{DocumentSource, Fetcher, FetcherConfig};
use gaa_stats::ingest;
use gaa_stats::models::MatchReport;
use gaa_stats::storage::{JsonlReader, JsonlWriter, StorageConfig};
use gaa_stats::DocumentFormat;

#[derive(Parser)]
#[command(name = "gaa-stats")]
#[command(about = "GAA match tagging parser and statistics aggregator")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./gaa-stats.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one tagging document and print its statistics as JSON
    Parse {
        /// File path or http(s) URL
        source: String,

        /// Document format (xml or json); detected when omitted
        #[arg(long)]
        format: Option<DocumentFormat>,

        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print a per-team summary of one tagging document
    Summary {
        /// File path or http(s) URL
        source: String,

        /// Document format (xml or json); detected when omitted
        #[arg(long)]
        format: Option<DocumentFormat>,
    },

    /// Parse every file matching a glob and append reports to a JSONL file
    Batch {
        /// Glob pattern, e.g. "exports/**/*.xml"
        pattern: String,

        /// Report file (default: <output_dir>/reports.jsonl)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Replace the report file instead of appending
        #[arg(long)]
        replace: bool,
    },

    /// Sum the reports in a JSONL file into season totals
    Totals {
        /// Report file (default: <output_dir>/reports.jsonl)
        reports: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Initialize tracing; stdout is reserved for command output
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting gaa-stats v{}", env!("CARGO_PKG_VERSION"));

    let fetcher = Fetcher::new(FetcherConfig::from(&config.fetch))?;
    let storage = StorageConfig::new(config.output_dir.clone());

    match cli.command {
        Commands::Parse {
            source,
            format,
            output,
            compact,
        } => {
            let source = DocumentSource::parse(&source)?;
            let report = ingest::ingest_one(&fetcher, &source, format)
                .await
                .with_context(|| format!("Failed to parse {}", source))?;

            let json = if compact {
                serde_json::to_string(&report.statistics)?
            } else {
                serde_json::to_string_pretty(&report.statistics)?
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote statistics to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Summary { source, format } => {
            let source = DocumentSource::parse(&source)?;
            let report = ingest::ingest_one(&fetcher, &source, format)
                .await
                .with_context(|| format!("Failed to parse {}", source))?;

            println!("\n=== {} ===", report.source);
            print_summary(&MatchSummary::from_statistics(&report.statistics));
        }
        Commands::Batch {
            pattern,
            output,
            replace,
        } => {
            let paths = ingest::expand_glob(&pattern)?;
            if paths.is_empty() {
                bail!("No files match {}", pattern);
            }
            tracing::info!("Parsing {} documents...", paths.len());

            let sources = paths.into_iter().map(DocumentSource::Path).collect();
            let result =
                ingest::ingest_batch(Arc::new(fetcher), sources, config.batch.max_concurrent)
                    .await;

            let path = output.unwrap_or_else(|| storage.reports_path());
            let writer = JsonlWriter::<MatchReport>::new(path);
            let written = if replace {
                writer.write_all(&result.reports)?
            } else {
                writer.append_batch(&result.reports)?
            };

            println!("\n=== Batch Results ===");
            println!("Parsed:   {}", result.reports.len());
            println!("Failed:   {}", result.errors.len());
            println!("Written:  {} -> {}", written, writer.path().display());
            if !result.errors.is_empty() {
                println!("\nErrors:");
                for (source, err) in &result.errors {
                    println!("  - {}: {}", source, err);
                }
            }
        }
        Commands::Totals { reports } => {
            let path = reports.unwrap_or_else(|| storage.reports_path());
            let reader = JsonlReader::<MatchReport>::new(path.clone());
            let reports = reader.read_all()?;
            if reports.is_empty() {
                bail!("No reports found in {}", path.display());
            }

            let totals = ingest::season_totals(&reports);
            println!("\n=== Season Totals ({} matches) ===", reports.len());
            print_summary(&MatchSummary::from_statistics(&totals));
        }
    }

    Ok(())
}

fn print_summary(summary: &MatchSummary) {
    let (home, away) = (&summary.home, &summary.away);

    println!(
        "Events:           {} ({} distinct codes)",
        summary.total_events, summary.distinct_codes
    );
    println!();
    print_row("", "Home".to_string(), "Away".to_string());
    print_row("Score", home.score.to_string(), away.score.to_string());
    print_row("Shots", home.shots.to_string(), away.shots.to_string());
    print_row(
        "Conversion",
        percent(home.conversion_rate),
        percent(away.conversion_rate),
    );
    print_row(
        "Possessions",
        home.possessions.to_string(),
        away.possessions.to_string(),
    );
    print_row(
        "Possession time",
        format!("{:.0}s", home.possession_seconds),
        format!("{:.0}s", away.possession_seconds),
    );
    print_row(
        "Possession share",
        percent(home.possession_share),
        percent(away.possession_share),
    );
    print_row("Kickouts", home.kickouts.to_string(), away.kickouts.to_string());
    print_row(
        "Kickout retention",
        percent(home.kickout_retention),
        percent(away.kickout_retention),
    );
    print_row(
        "Turnovers",
        home.turnovers.to_string(),
        away.turnovers.to_string(),
    );

    println!();
    println!("Turnover balance: {:+}", summary.turnover_balance);
    println!(
        "Fouls:            {} conceded ({} scoreable), {} awarded",
        summary.fouls_conceded, summary.fouls_scoreable, summary.fouls_awarded
    );
}

fn print_row(label: &str, home: String, away: String) {
    println!("{:<20} {:>14} {:>14}", label, home, away);
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
