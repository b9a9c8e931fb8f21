//! Input ingestion: turns a spreadsheet sheet (or a CSV export of it) into
//! typed [`Record`]s.
//!
//! The first row is the header; columns are located by name so the input may
//! carry any number of extra columns in any order. Numeric cells that are
//! empty or hold an NA token (`NaN`, `N/A`, `null`, ...) count as zero, which
//! keeps them neutral in the per-source sums; the same tokens in a category
//! column mean "no value".

use crate::source::normalize_source;
use calamine::{open_workbook_auto, Data, Range, Reader};
use romi_core::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One row of raw marketing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub traffic_source: Option<String>,
    pub utm_source: Option<String>,
    pub costs: f64,
    pub clicks: f64,
    pub visits: f64,
    pub leads: f64,
    pub q_leads: f64,
    pub orders: f64,
    pub revenue: f64,
}

impl Record {
    /// Reporting key for this row, see [`normalize_source`].
    pub fn source(&self) -> String {
        normalize_source(self.traffic_source.as_deref(), self.utm_source.as_deref())
    }
}

/// Header names every input must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "traffic_source",
    "utm_source",
    "costs",
    "clicks",
    "visits",
    "leads",
    "q_leads",
    "orders",
    "revenue",
];

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load every record from `sheet` of the workbook at `path`. A `.csv` path is
/// read as a single table and `sheet` is ignored.
pub fn load_records(path: &Path, sheet: &str) -> ReportResult<Vec<Record>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if extension == "csv" {
        debug!(path = %path.display(), "Reading CSV input, sheet name ignored");
        let records = records_from_csv(File::open(path)?)?;
        info!(path = %path.display(), rows = records.len(), "CSV input loaded");
        return Ok(records);
    }

    if !SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ReportError::UnsupportedFormat(path.display().to_string()));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ReportError::Spreadsheet(e.to_string()))?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(ReportError::MissingSheet {
            path: path.display().to_string(),
            sheet: sheet.to_string(),
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| ReportError::Spreadsheet(e.to_string()))?;

    let records = records_from_range(&range)?;
    info!(
        path = %path.display(),
        sheet,
        rows = records.len(),
        "Spreadsheet loaded"
    );
    Ok(records)
}

/// Parse the used range of a worksheet. The first row is the header.
pub fn records_from_range(range: &Range<Data>) -> ReportResult<Vec<Record>> {
    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let layout = ColumnLayout::from_header(&header)?;

    // Sheet row numbers are 1-based and the header occupies the first one.
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    let mut records = Vec::new();
    for (idx, cells) in rows.enumerate() {
        let line = first_row + idx + 2;
        let cells: Vec<Cell<'_>> = cells.iter().map(Cell::from).collect();
        match layout.parse(&cells, line)? {
            Some(record) => records.push(record),
            None => debug!(line, "Skipping blank row"),
        }
    }
    Ok(records)
}

/// Parse a CSV table with the same header as the spreadsheet.
pub fn records_from_csv<R: Read>(input: R) -> ReportResult<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| ReportError::Csv(e.to_string()))?
        .clone();
    let header: Vec<&str> = headers.iter().collect();
    let layout = ColumnLayout::from_header(&header)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let row = result.map_err(|e| ReportError::Csv(e.to_string()))?;
        let cells: Vec<Cell<'_>> = row
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(Cow::Borrowed(field))
                }
            })
            .collect();
        match layout.parse(&cells, line)? {
            Some(record) => records.push(record),
            None => debug!(line, "Skipping blank row"),
        }
    }
    Ok(records)
}

// ─── Cells ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Cell<'a> {
    Empty,
    Text(Cow<'a, str>),
    Number(f64),
}

impl<'a> From<&'a Data> for Cell<'a> {
    fn from(data: &'a Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(Cow::Borrowed(s.as_str())),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            other => Cell::Text(Cow::Owned(other.to_string())),
        }
    }
}

/// Cell texts read as missing values, following the usual spreadsheet and
/// dataframe conventions. Matched exactly, case included.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

impl Cell<'_> {
    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Category value; empty cells and NA tokens are null. Other text is kept
    /// verbatim, surrounding whitespace included.
    fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() || is_na_token(s.trim()) => None,
            Cell::Text(s) => Some(s.to_string()),
            // Whole numbers print without a fraction, as they appear in the sheet.
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Cell::Number(n) if n.is_nan() => None,
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// Metric value; empty cells and NA tokens count as zero. Anything else
    /// must be a finite, non-negative number.
    fn number(&self, line: usize, column: &str) -> ReportResult<f64> {
        let invalid = |value: String| ReportError::InvalidValue {
            row: line,
            column: column.to_string(),
            value,
        };
        let value = match self {
            Cell::Empty => return Ok(0.0),
            Cell::Number(n) => *n,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() || is_na_token(s) {
                    return Ok(0.0);
                }
                s.parse::<f64>().map_err(|_| invalid(s.to_string()))?
            }
        };
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(match self {
                Cell::Text(s) => s.trim().to_string(),
                _ => value.to_string(),
            }));
        }
        Ok(value)
    }
}

// ─── Header layout ──────────────────────────────────────────────────────────

/// Column positions of the required fields within a row.
#[derive(Debug)]
struct ColumnLayout {
    positions: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnLayout {
    fn from_header<S: AsRef<str>>(header: &[S]) -> ReportResult<Self> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            // Duplicate headers resolve to the first occurrence.
            index.entry(name.as_ref().trim()).or_insert(i);
        }

        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = *index
                .get(name)
                .ok_or_else(|| ReportError::MissingColumn(name.to_string()))?;
        }
        Ok(Self { positions })
    }

    /// Returns `Ok(None)` for a row with no content at all.
    fn parse(&self, cells: &[Cell<'_>], line: usize) -> ReportResult<Option<Record>> {
        if cells.iter().all(Cell::is_blank) {
            return Ok(None);
        }

        let cell = |field: usize| {
            cells
                .get(self.positions[field])
                .cloned()
                .unwrap_or(Cell::Empty)
        };
        let number = |field: usize| cell(field).number(line, REQUIRED_COLUMNS[field]);

        Ok(Some(Record {
            traffic_source: cell(0).text(),
            utm_source: cell(1).text(),
            costs: number(2)?,
            clicks: number(3)?,
            visits: number(4)?,
            leads: number(5)?,
            q_leads: number(6)?,
            orders: number(7)?,
            revenue: number(8)?,
        }))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
