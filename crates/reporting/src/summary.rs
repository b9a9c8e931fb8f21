//! Summary table export in CSV and JSON.

use crate::aggregate::AggregatedRow;
use crate::dashboard::round2;
use chrono::{DateTime, Utc};
use romi_core::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Columns of the summary table, in output order.
pub const SUMMARY_COLUMNS: [&str; 8] = [
    "source",
    "costs",
    "clicks",
    "total_leads",
    "cpa",
    "orders",
    "revenue",
    "roas",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub source: String,
    pub costs: f64,
    pub clicks: f64,
    pub total_leads: f64,
    pub cpa: Option<f64>,
    pub orders: f64,
    pub revenue: f64,
    pub roas: Option<f64>,
}

impl From<&AggregatedRow> for SummaryRow {
    fn from(row: &AggregatedRow) -> Self {
        Self {
            source: row.source.clone(),
            costs: row.costs,
            clicks: row.clicks,
            total_leads: row.total_leads,
            cpa: row.cpa,
            orders: row.orders,
            revenue: row.revenue,
            roas: row.roas,
        }
    }
}

impl SummaryRow {
    fn to_record(&self) -> [String; SUMMARY_COLUMNS.len()] {
        [
            self.source.clone(),
            fixed2(self.costs),
            fixed2(self.clicks),
            fixed2(self.total_leads),
            self.cpa.map(fixed2).unwrap_or_default(),
            fixed2(self.orders),
            fixed2(self.revenue),
            self.roas.map(fixed2).unwrap_or_default(),
        ]
    }

    fn rounded(&self) -> Self {
        Self {
            source: self.source.clone(),
            costs: round2(self.costs),
            clicks: round2(self.clicks),
            total_leads: round2(self.total_leads),
            cpa: self.cpa.map(round2),
            orders: round2(self.orders),
            revenue: round2(self.revenue),
            roas: self.roas.map(round2),
        }
    }
}

/// JSON form of the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

fn fixed2(value: f64) -> String {
    format!("{value:.2}")
}

/// Write the summary as CSV: a header plus one line per source, numbers with
/// two decimals and missing ratios left empty.
pub fn write_summary_csv<W: Write>(out: W, rows: &[AggregatedRow]) -> ReportResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(SUMMARY_COLUMNS)
        .map_err(|e| ReportError::Csv(e.to_string()))?;
    for row in rows {
        writer
            .write_record(SummaryRow::from(row).to_record())
            .map_err(|e| ReportError::Csv(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_summary_csv(path: &Path, rows: &[AggregatedRow]) -> ReportResult<()> {
    create_parent(path)?;
    write_summary_csv(BufWriter::new(File::create(path)?), rows)?;
    info!(path = %path.display(), rows = rows.len(), "Summary CSV written");
    Ok(())
}

pub fn summary_report(rows: &[AggregatedRow]) -> SummaryReport {
    let rows: Vec<SummaryRow> = rows
        .iter()
        .map(|r| SummaryRow::from(r).rounded())
        .collect();
    SummaryReport {
        generated_at: Utc::now(),
        row_count: rows.len(),
        columns: SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

pub fn export_summary_json(path: &Path, rows: &[AggregatedRow]) -> ReportResult<()> {
    create_parent(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, &summary_report(rows))?;
    out.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Summary JSON written");
    Ok(())
}

fn create_parent(path: &Path) -> ReportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
