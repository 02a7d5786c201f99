//! CSV Data Loader Module
//! Reads long-format site measurements with Polars and hands them to the pivot.

use crate::config::ColumnConfig;
use crate::data::processor::{DataProcessor, ProcessorError};
use crate::data::table::SiteTable;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },
    #[error("Separator {0:?} is not an ASCII character")]
    InvalidSeparator(char),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Loads one measurement variable from a long-format CSV file.
pub struct DataLoader {
    columns: ColumnConfig,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(ColumnConfig::default())
    }
}

impl DataLoader {
    pub fn new(columns: ColumnConfig) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    /// Load the date, site and value columns of a CSV file using Polars.
    ///
    /// Other columns are dropped. Fails with `MissingColumn` before any
    /// reshaping if one of the three is absent.
    pub fn load_csv(&self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        if !self.columns.separator.is_ascii() {
            return Err(LoaderError::InvalidSeparator(self.columns.separator));
        }
        let separator = self.columns.separator as u8;

        // Full-file schema inference so a late text value types the whole column.
        let df = LazyCsvReader::new(file_path)
            .with_separator(separator)
            .with_infer_schema_length(None)
            .finish()?
            .collect()?;

        debug!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "read long-format CSV"
        );

        let required = self.columns.required_columns();
        if let Some(missing) = required
            .iter()
            .find(|name| df.get_column_index(name).is_none())
        {
            return Err(LoaderError::MissingColumn {
                column: missing.to_string(),
            });
        }

        let mut selected = df.select(required)?;

        // An all-empty value column is read as text; it holds no data, not text.
        let values = selected.column(&self.columns.value_column)?;
        if !values.is_empty()
            && values.null_count() == values.len()
            && values.dtype() == &DataType::String
        {
            let values = values.cast(&DataType::Float64)?;
            selected.with_column(values)?;
        }

        Ok(selected)
    }

    /// Load a CSV file and reshape it to one column per site.
    pub fn read_variable(&self, file_path: &Path) -> Result<SiteTable, LoaderError> {
        let long = self.load_csv(file_path)?;
        let table = DataProcessor::pivot_to_wide(&long, &self.columns)?;

        info!(
            path = %file_path.display(),
            variable = %self.columns.value_column,
            dates = table.height(),
            sites = table.sites().len(),
            "loaded variable"
        );

        Ok(table)
    }
}

/// Read the default rainfall column from `filename` into a wide table.
pub fn read_variable(filename: impl AsRef<Path>) -> Result<SiteTable, LoaderError> {
    DataLoader::default().read_variable(filename.as_ref())
}

/// Like [`read_variable`], with explicit column names and date layout.
pub fn read_variable_with(
    filename: impl AsRef<Path>,
    columns: &ColumnConfig,
) -> Result<SiteTable, LoaderError> {
    DataLoader::new(columns.clone()).read_variable(filename.as_ref())
}
