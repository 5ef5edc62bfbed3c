//! Campaign ROI: rolling-window ROI analysis and scaling recommendations
//! over a daily metrics feed.
//!
//! Reads a JSON array of daily metric records, runs them through the
//! analyzer, and prints the requested analysis as JSON on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use campaign_core::config::{AppConfig, LoggingConfig};
use campaign_core::types::read_records;
use campaign_reporting::{Clock, FixedClock, RoiAnalyzer, SystemClock};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-roi")]
#[command(about = "Rolling-window ROI analysis and campaign scaling recommendations")]
#[command(version)]
struct Cli {
    /// JSON file holding an array of daily metric records
    #[arg(long, short, env = "CAMPAIGN_ROI_INPUT")]
    input: PathBuf,

    /// Optional TOML config file (environment variables take precedence)
    #[arg(long, env = "CAMPAIGN_ROI_CONFIG_FILE")]
    config: Option<String>,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Analysis window in days (overrides config)
    #[arg(long)]
    window_days: Option<u32>,

    /// Pretty-print JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a single campaign
    Analyze {
        #[arg(long)]
        campaign: String,
    },
    /// Analyze every campaign, highest ROI first
    AnalyzeAll,
    /// Campaigns recommended for a budget change or pause
    Scaling,
    /// Portfolio totals and leaderboards
    Report,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref());
    init_tracing(
        &loaded
            .as_ref()
            .map(|c| c.logging.clone())
            .unwrap_or_default(),
    );

    let mut config = loaded.context("loading configuration")?;

    if let Some(window_days) = cli.window_days {
        config.analyzer.window_days = window_days;
    }
    config.analyzer.validate()?;

    let clock: Arc<dyn Clock> = match cli.as_of {
        Some(date) => Arc::new(FixedClock(date)),
        None => Arc::new(SystemClock),
    };

    info!(
        node_id = %config.node_id,
        today = %clock.today(),
        window_days = config.analyzer.window_days,
        retention_days = config.analyzer.retention_days,
        "Configuration loaded"
    );

    let records = read_records(&cli.input)
        .with_context(|| format!("loading metrics from {}", cli.input.display()))?;
    info!(count = records.len(), "Loaded metric records");

    let analyzer = RoiAnalyzer::new(config.analyzer.clone(), clock);
    analyzer.ingest(records);

    match cli.command {
        Command::Analyze { campaign } => {
            let analysis = analyzer.analyze(&campaign);
            if analysis.is_none() {
                warn!(campaign_id = %campaign, "Insufficient data in analysis window");
            }
            print_json(&analysis, cli.pretty)
        }
        Command::AnalyzeAll => print_json(&analyzer.analyze_all(), cli.pretty),
        Command::Scaling => print_json(&analyzer.for_scaling(), cli.pretty),
        Command::Report => print_json(&analyzer.report(), cli.pretty),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
