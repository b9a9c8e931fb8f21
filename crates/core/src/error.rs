use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Sheet '{sheet}' not found in {path}")]
    MissingSheet { path: String, sheet: String },

    #[error("Column '{0}' not found in input header")]
    MissingColumn(String),

    #[error("Row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Chart rendering error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
