//! Column Configuration Module
//! Names the long-format columns the loader reads and how dates are parsed.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Measurement column read when no other variable is requested.
pub const DEFAULT_VALUE_COLUMN: &str = "Rainfall (mm)";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which columns of a long-format file hold the date, site and measurement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub date_column: String,
    pub site_column: String,
    pub value_column: String,
    /// chrono format string for the date column. When unset, a list of
    /// common layouts is tried per cell.
    pub date_format: Option<String>,
    pub separator: char,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            site_column: "Site".to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            date_format: None,
            separator: ',',
        }
    }
}

impl ColumnConfig {
    /// Default layout, reading `value_column` instead of rainfall.
    pub fn for_variable(value_column: impl Into<String>) -> Self {
        Self {
            value_column: value_column.into(),
            ..Self::default()
        }
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// The three columns that must be present, in read order.
    pub fn required_columns(&self) -> [&str; 3] {
        [
            self.date_column.as_str(),
            self.site_column.as_str(),
            self.value_column.as_str(),
        ]
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
