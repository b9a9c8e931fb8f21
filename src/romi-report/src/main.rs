//! romi-report: builds the traffic source dashboard and summary table from a
//! marketing spreadsheet.

use anyhow::Context;
use clap::Parser;
use romi_core::config::AppConfig;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "romi-report")]
#[command(about = "Per-source marketing efficiency dashboard and summary")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "ROMI_REPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Input spreadsheet or CSV (overrides config)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Worksheet name (overrides config)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Dashboard image path (overrides config)
    #[arg(long)]
    dashboard: Option<PathBuf>,

    /// Summary CSV path (overrides config)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Also write the summary as JSON to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Skip rendering the dashboard image
    #[arg(long, default_value_t = false)]
    no_dashboard: bool,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "romi_report=info,romi_reporting=info".into());
    if cli.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // An explicit config file must load; without one, fall back to defaults.
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(Some(path))
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }),
    };

    // Apply CLI overrides
    if let Some(input) = cli.input {
        config.input.path = input;
    }
    if let Some(sheet) = cli.sheet {
        config.input.sheet = sheet;
    }
    if let Some(path) = cli.dashboard {
        config.output.dashboard_path = path;
    }
    if let Some(path) = cli.summary {
        config.output.summary_path = path;
    }
    if cli.summary_json.is_some() {
        config.output.summary_json_path = cli.summary_json;
    }
    if cli.no_dashboard {
        config.dashboard.enabled = false;
    }

    info!(
        input = %config.input.path.display(),
        sheet = %config.input.sheet,
        "Configuration loaded"
    );

    let summary = romi_reporting::run(&config)
        .with_context(|| format!("report failed for {}", config.input.path.display()))?;

    if let Some(path) = &summary.dashboard {
        info!(path = %path.display(), "Dashboard ready");
    }
    info!(
        path = %summary.summary_csv.display(),
        sources = summary.totals.sources,
        "Summary ready"
    );
    Ok(())
}
