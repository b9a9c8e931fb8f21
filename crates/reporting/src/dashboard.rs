//! Source performance dashboard: the data behind each of the six panels.

use crate::aggregate::AggregatedRow;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
}

/// Two side-by-side bars for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPair {
    pub label: String,
    pub first: f64,
    pub second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRow {
    pub source: String,
    pub costs: f64,
    pub revenue: f64,
    pub roas: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardData {
    /// Spend share, only sources that spent anything.
    pub cost_share: Vec<CategoryValue>,
    pub roas: Vec<CategoryValue>,
    /// Costs (first) against revenue (second), in ROAS order.
    pub costs_vs_revenue: Vec<CategoryPair>,
    pub cpa: Vec<CategoryValue>,
    /// Total leads (first) against orders (second).
    pub leads_vs_orders: Vec<CategoryPair>,
    pub efficiency: Vec<EfficiencyRow>,
}

impl DashboardData {
    pub fn from_rows(rows: &[AggregatedRow]) -> Self {
        let cost_share = rows
            .iter()
            .filter(|r| r.costs > 0.0)
            .map(|r| CategoryValue {
                label: r.source.clone(),
                value: r.costs,
            })
            .collect();

        let by_roas = sorted_desc_present(rows, |r| r.roas);
        let roas = by_roas
            .iter()
            .filter_map(|r| {
                r.roas.map(|value| CategoryValue {
                    label: r.source.clone(),
                    value,
                })
            })
            .collect();
        let costs_vs_revenue = by_roas
            .iter()
            .map(|r| CategoryPair {
                label: r.source.clone(),
                first: r.costs,
                second: r.revenue,
            })
            .collect();

        let cpa = sorted_desc_present(rows, |r| r.cpa)
            .iter()
            .filter_map(|r| {
                r.cpa.map(|value| CategoryValue {
                    label: r.source.clone(),
                    value,
                })
            })
            .collect();

        let mut by_leads: Vec<&AggregatedRow> = rows.iter().collect();
        by_leads.sort_by(|a, b| b.total_leads.total_cmp(&a.total_leads));
        let leads_vs_orders = by_leads
            .iter()
            .map(|r| CategoryPair {
                label: r.source.clone(),
                first: r.total_leads,
                second: r.orders,
            })
            .collect();

        // Ordered on the exact ROAS; rounding is for display only.
        let mut by_efficiency: Vec<&AggregatedRow> = rows.iter().collect();
        by_efficiency.sort_by(|a, b| desc_nulls_last(a.roas, b.roas));
        let efficiency = by_efficiency
            .iter()
            .map(|r| EfficiencyRow {
                source: r.source.clone(),
                costs: round2(r.costs),
                revenue: round2(r.revenue),
                roas: r.roas.map(round2),
            })
            .collect();

        Self {
            cost_share,
            roas,
            costs_vs_revenue,
            cpa,
            leads_vs_orders,
            efficiency,
        }
    }
}

/// Rows whose metric is present, highest first. Ties keep input order.
fn sorted_desc_present<F>(rows: &[AggregatedRow], metric: F) -> Vec<&AggregatedRow>
where
    F: Fn(&AggregatedRow) -> Option<f64>,
{
    let mut present: Vec<&AggregatedRow> = rows.iter().filter(|r| metric(r).is_some()).collect();
    present.sort_by(|a, b| desc_nulls_last(metric(a), metric(b)));
    present
}

fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::ingest::Record;

    fn record(source: &str, costs: f64, leads: f64, orders: f64, revenue: f64) -> Record {
        Record {
            traffic_source: Some("ad".into()),
            utm_source: Some(source.into()),
            costs,
            clicks: 0.0,
            visits: 0.0,
            leads,
            q_leads: 0.0,
            orders,
            revenue,
        }
    }

    fn sample() -> DashboardData {
        let rows = aggregate(&[
            record("google", 100.0, 10.0, 2.0, 300.0),
            record("yandex", 200.0, 5.0, 1.0, 200.0),
            record("vk", 0.0, 20.0, 4.0, 50.0),
            record("mytarget", 50.0, 0.0, 0.0, 400.0),
        ]);
        DashboardData::from_rows(&rows)
    }

    fn labels(values: &[CategoryValue]) -> Vec<&str> {
        values.iter().map(|v| v.label.as_str()).collect()
    }

    #[test]
    fn test_cost_share_excludes_zero_spend() {
        let data = sample();
        assert_eq!(labels(&data.cost_share), vec!["google", "mytarget", "yandex"]);
    }

    #[test]
    fn test_roas_sorted_descending_without_nulls() {
        let data = sample();
        // vk has no spend, so no ROAS.
        assert_eq!(labels(&data.roas), vec!["mytarget", "google", "yandex"]);
        assert!((data.roas[0].value - 8.0).abs() < f64::EPSILON);

        let pairs: Vec<_> = data
            .costs_vs_revenue
            .iter()
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(pairs, labels(&data.roas));
        assert!((data.costs_vs_revenue[1].second - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cpa_skips_sources_without_leads() {
        let data = sample();
        // yandex 40, google 10, vk 0; mytarget has no leads.
        assert_eq!(labels(&data.cpa), vec!["yandex", "google", "vk"]);
    }

    #[test]
    fn test_leads_vs_orders_covers_every_source() {
        let data = sample();
        let order: Vec<_> = data
            .leads_vs_orders
            .iter()
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(order, vec!["vk", "google", "yandex", "mytarget"]);
        assert!((data.leads_vs_orders[0].second - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_efficiency_table_puts_null_roas_last() {
        let rows = aggregate(&[
            record("a", 3.0, 1.0, 1.0, 10.0),
            record("b", 0.0, 1.0, 1.0, 10.0),
            record("c", 3.0, 1.0, 1.0, 20.0),
        ]);
        let data = DashboardData::from_rows(&rows);
        let sources: Vec<_> = data.efficiency.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["c", "a", "b"]);
        assert_eq!(data.efficiency[0].roas, Some(6.67));
        assert_eq!(data.efficiency[2].roas, None);
    }

    #[test]
    fn test_efficiency_order_uses_unrounded_roas() {
        // Both round to 1.00; b is the better source.
        let rows = aggregate(&[
            record("a", 1000.0, 1.0, 1.0, 1001.0),
            record("b", 1000.0, 1.0, 1.0, 1004.0),
        ]);
        let data = DashboardData::from_rows(&rows);
        let sources: Vec<_> = data.efficiency.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["b", "a"]);
        assert_eq!(data.efficiency[0].roas, Some(1.0));
        assert_eq!(data.efficiency[1].roas, Some(1.0));
    }

    #[test]
    fn test_empty_input_gives_empty_panels() {
        let data = DashboardData::from_rows(&[]);
        assert!(data.cost_share.is_empty());
        assert!(data.roas.is_empty());
        assert!(data.efficiency.is_empty());
    }
}
