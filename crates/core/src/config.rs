use crate::error::{ReportError, ReportResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root report configuration. Loaded from an optional TOML file and from
/// environment variables with the prefix `ROMI_REPORT__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
    /// Worksheet to read. Ignored for CSV input.
    #[serde(default = "default_sheet")]
    pub sheet: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: PathBuf,
    #[serde(default = "default_summary_path")]
    pub summary_path: PathBuf,
    #[serde(default)]
    pub summary_json_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_enabled")]
    pub enabled: bool,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

// Default functions
fn default_input_path() -> PathBuf {
    PathBuf::from("ROMI_center_Данные_для_тестового_задания_аналитик_данных.xlsx")
}
fn default_sheet() -> String {
    "Сквозная аналитика 2025".to_string()
}
fn default_dashboard_path() -> PathBuf {
    PathBuf::from("marketing_dashboard.png")
}
fn default_summary_path() -> PathBuf {
    PathBuf::from("marketing_summary.csv")
}
fn default_dashboard_enabled() -> bool {
    true
}
fn default_title() -> String {
    "Advertising Source Efficiency".to_string()
}
fn default_width() -> u32 {
    2700
}
fn default_height() -> u32 {
    1800
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            sheet: default_sheet(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dashboard_path: default_dashboard_path(),
            summary_path: default_summary_path(),
            summary_json_path: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: default_dashboard_enabled(),
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file, then environment
    /// variables. Environment values win over the file.
    pub fn load(file: Option<&Path>) -> ReportResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "Reading config file");
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("ROMI_REPORT")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ReportError::Config(e.to_string()))
    }
}
