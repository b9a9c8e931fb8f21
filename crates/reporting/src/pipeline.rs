//! One report run: load, aggregate, render, export.

use crate::aggregate::{aggregate, Totals};
use crate::dashboard::DashboardData;
use crate::ingest::load_records;
use crate::{render, summary};
use romi_core::{AppConfig, ReportResult};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// What a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub totals: Totals,
    pub dashboard: Option<PathBuf>,
    pub summary_csv: PathBuf,
    pub summary_json: Option<PathBuf>,
}

pub fn run(config: &AppConfig) -> ReportResult<RunSummary> {
    let records = load_records(&config.input.path, &config.input.sheet)?;
    let rows = aggregate(&records);
    let totals = Totals::from_rows(&rows);
    info!(
        records = records.len(),
        sources = totals.sources,
        costs = totals.costs,
        revenue = totals.revenue,
        roas = ?totals.roas,
        "Aggregated by source"
    );

    let dashboard = if config.dashboard.enabled {
        let path = &config.output.dashboard_path;
        render::render_dashboard(path, &DashboardData::from_rows(&rows), &config.dashboard)?;
        Some(path.clone())
    } else {
        info!("Dashboard rendering disabled");
        None
    };

    summary::export_summary_csv(&config.output.summary_path, &rows)?;
    if let Some(path) = &config.output.summary_json_path {
        summary::export_summary_json(path, &rows)?;
    }

    Ok(RunSummary {
        records: records.len(),
        totals,
        dashboard,
        summary_csv: config.output.summary_path.clone(),
        summary_json: config.output.summary_json_path.clone(),
    })
}
