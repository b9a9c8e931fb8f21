//! Marketing source reporting: spreadsheet ingestion, per-source
//! aggregation, efficiency ratios, the dashboard image and summary exports.

pub mod aggregate;
pub mod dashboard;
pub mod ingest;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod summary;

pub use aggregate::{aggregate, AggregatedRow, Totals};
pub use dashboard::DashboardData;
pub use ingest::{load_records, Record};
pub use pipeline::{run, RunSummary};
pub use source::normalize_source;
