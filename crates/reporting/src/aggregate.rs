//! Per-source aggregation and the derived efficiency ratios.

use crate::ingest::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summed metrics for one normalized source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    pub source: String,
    pub costs: f64,
    pub clicks: f64,
    pub visits: f64,
    pub leads: f64,
    pub q_leads: f64,
    pub orders: f64,
    pub revenue: f64,
    pub total_leads: f64,
    /// Cost per lead (`costs / total_leads`).
    pub cpa: Option<f64>,
    /// Cost per order (`costs / orders`).
    pub cpo: Option<f64>,
    /// Return on ad spend (`revenue / costs`).
    pub roas: Option<f64>,
}

impl AggregatedRow {
    fn new(source: String) -> Self {
        Self {
            source,
            costs: 0.0,
            clicks: 0.0,
            visits: 0.0,
            leads: 0.0,
            q_leads: 0.0,
            orders: 0.0,
            revenue: 0.0,
            total_leads: 0.0,
            cpa: None,
            cpo: None,
            roas: None,
        }
    }

    fn add(&mut self, record: &Record) {
        self.costs += record.costs;
        self.clicks += record.clicks;
        self.visits += record.visits;
        self.leads += record.leads;
        self.q_leads += record.q_leads;
        self.orders += record.orders;
        self.revenue += record.revenue;
    }

    fn derive_ratios(&mut self) {
        self.total_leads = self.leads + self.q_leads;
        self.cpa = ratio(self.costs, self.total_leads);
        self.cpo = ratio(self.costs, self.orders);
        self.roas = ratio(self.revenue, self.costs);
    }
}

/// Division that yields `None` instead of an infinite or NaN result.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

/// Group records by normalized source and sum their metrics. Rows come back
/// ordered by source name.
pub fn aggregate(records: &[Record]) -> Vec<AggregatedRow> {
    let mut groups: BTreeMap<String, AggregatedRow> = BTreeMap::new();
    for record in records {
        let source = record.source();
        groups
            .entry(source.clone())
            .or_insert_with(|| AggregatedRow::new(source))
            .add(record);
    }

    groups
        .into_values()
        .map(|mut row| {
            row.derive_ratios();
            row
        })
        .collect()
}

/// Column totals across every source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub sources: usize,
    pub costs: f64,
    pub clicks: f64,
    pub total_leads: f64,
    pub orders: f64,
    pub revenue: f64,
    pub roas: Option<f64>,
}

impl Totals {
    pub fn from_rows(rows: &[AggregatedRow]) -> Self {
        let mut totals = rows.iter().fold(Self::default(), |mut acc, row| {
            acc.costs += row.costs;
            acc.clicks += row.clicks;
            acc.total_leads += row.total_leads;
            acc.orders += row.orders;
            acc.revenue += row.revenue;
            acc
        });
        totals.sources = rows.len();
        totals.roas = ratio(totals.revenue, totals.costs);
        totals
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
