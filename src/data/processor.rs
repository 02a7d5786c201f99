//! Data Processor Module
//! Reshapes long-format site records into a wide, date-indexed table (pivot).

use crate::config::ColumnConfig;
use crate::data::table::{SiteTable, TableError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Layouts tried, in order, when no explicit date format is configured.
/// Date-only layouts resolve to midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d",
    "%d/%m/%Y",
];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: empty '{column}' value")]
    MissingKey { row: usize, column: String },
    #[error("Row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("Site '{0}' has the same name as the date column")]
    SiteNamedLikeIndex(String),
    #[error("Duplicate entry for site '{site}' at {date}")]
    DuplicateEntry { site: String, date: NaiveDateTime },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Parse one date cell, either with `format` or by trying the known layouts.
pub fn parse_timestamp(raw: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    match format {
        Some(format) => parse_with(raw, format),
        None => DATE_FORMATS.iter().find_map(|format| parse_with(raw, format)),
    }
}

fn parse_with(raw: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, format)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Timestamp of every row of the date column.
///
/// Temporal columns are taken as they are; anything else is rendered as
/// text and parsed.
fn row_timestamps(
    dates: &Column,
    columns: &ColumnConfig,
) -> Result<Vec<NaiveDateTime>, ProcessorError> {
    let missing = |row: usize| ProcessorError::MissingKey {
        row,
        column: columns.date_column.clone(),
    };

    if matches!(dates.dtype(), DataType::Date | DataType::Datetime(_, _)) {
        let micros = dates
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
            .cast(&DataType::Int64)?;
        return micros
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                value
                    .and_then(DateTime::<Utc>::from_timestamp_micros)
                    .map(|stamp| stamp.naive_utc())
                    .ok_or_else(|| missing(i + 1))
            })
            .collect();
    }

    let text = dates.cast(&DataType::String)?;
    text.str()?
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let row = i + 1;
            let raw = raw.ok_or_else(|| missing(row))?;
            parse_timestamp(raw, columns.date_format.as_deref()).ok_or_else(|| {
                ProcessorError::InvalidDate {
                    row,
                    value: raw.to_string(),
                }
            })
        })
        .collect()
}

/// Handles reshaping between long and wide layouts.
pub struct DataProcessor;

impl DataProcessor {
    /// Transform long-format records to a wide table (pivot operation).
    ///
    /// Rows become the distinct dates, sorted ascending. Columns become the
    /// distinct sites in the order they were first seen. A site with no
    /// record for a date gets a null cell. The value column keeps its dtype.
    /// The date column may be text or already temporal. A site may not share
    /// the date column's name.
    pub fn pivot_to_wide(
        long: &DataFrame,
        columns: &ColumnConfig,
    ) -> Result<SiteTable, ProcessorError> {
        for name in columns.required_columns() {
            if long.get_column_index(name).is_none() {
                return Err(ProcessorError::MissingColumn(name.to_string()));
            }
        }

        let stamps = row_timestamps(long.column(&columns.date_column)?, columns)?;
        let sites = long.column(&columns.site_column)?.cast(&DataType::String)?;
        let values = long.column(&columns.value_column)?.as_materialized_series();

        let mut index: Vec<NaiveDateTime> = Vec::new();
        let mut date_slots: HashMap<NaiveDateTime, usize> = HashMap::new();
        let mut site_names: Vec<String> = Vec::new();
        let mut site_slots: HashMap<String, usize> = HashMap::new();
        let mut placements: Vec<(usize, usize)> = Vec::with_capacity(long.height());

        for (i, (&stamp, site)) in stamps.iter().zip(sites.str()?).enumerate() {
            let site = site.ok_or_else(|| ProcessorError::MissingKey {
                row: i + 1,
                column: columns.site_column.clone(),
            })?;

            let date_slot = *date_slots.entry(stamp).or_insert_with(|| {
                index.push(stamp);
                index.len() - 1
            });
            let site_slot = match site_slots.get(site) {
                Some(&slot) => slot,
                None if site == columns.date_column => {
                    return Err(ProcessorError::SiteNamedLikeIndex(site.to_string()));
                }
                None => {
                    site_names.push(site.to_string());
                    site_slots.insert(site.to_string(), site_names.len() - 1);
                    site_names.len() - 1
                }
            };
            placements.push((site_slot, date_slot));
        }

        // Source row feeding each (site, date) cell; None leaves a gap.
        let mut cells: Vec<Vec<Option<IdxSize>>> =
            vec![vec![None; index.len()]; site_names.len()];
        for (row, &(site_slot, date_slot)) in placements.iter().enumerate() {
            let cell = &mut cells[site_slot][date_slot];
            if cell.is_some() {
                return Err(ProcessorError::DuplicateEntry {
                    site: site_names[site_slot].clone(),
                    date: index[date_slot],
                });
            }
            *cell = Some(row as IdxSize);
        }

        let site_columns = site_names
            .par_iter()
            .zip(cells.par_iter())
            .map(|(site, slots)| -> PolarsResult<Column> {
                let take: IdxCa = slots.iter().copied().collect();
                let series = values.take(&take)?.with_name(site.as_str().into());
                Ok(Column::from(series))
            })
            .collect::<PolarsResult<Vec<Column>>>()?;

        debug!(
            dates = index.len(),
            sites = site_names.len(),
            records = long.height(),
            "pivoted long records to wide table"
        );

        let mut wide_columns = Vec::with_capacity(site_columns.len() + 1);
        wide_columns.push(Column::new(columns.date_column.as_str().into(), index));
        wide_columns.extend(site_columns);

        let wide = DataFrame::new(wide_columns)?
            .sort([columns.date_column.as_str()], SortMultipleOptions::default())?;

        Ok(SiteTable::new(wide, &columns.date_column)?)
    }
}
