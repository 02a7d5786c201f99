//! Daily Statistics Module
//! Collapses a time-indexed site table to one row per calendar day.

use crate::data::{SiteTable, TableError};
use polars::prelude::*;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{column}' has type {dtype}, which cannot be reduced numerically")]
    NonNumericColumn { column: String, dtype: DataType },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Reduction applied to each (day, site) group.
///
/// Missing cells are skipped. A group with no values left yields a missing
/// cell for `Mean`, `Max` and `Min`, but `0` for `Total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    Total,
    Mean,
    Max,
    Min,
}

impl Reduction {
    pub const ALL: [Reduction; 4] = [
        Reduction::Total,
        Reduction::Mean,
        Reduction::Max,
        Reduction::Min,
    ];

    fn apply(self, expr: Expr) -> Expr {
        match self {
            Reduction::Total => expr.sum(),
            Reduction::Mean => expr.mean(),
            Reduction::Max => expr.max(),
            Reduction::Min => expr.min(),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Total => write!(f, "total"),
            Reduction::Mean => write!(f, "mean"),
            Reduction::Max => write!(f, "max"),
            Reduction::Min => write!(f, "min"),
        }
    }
}

fn is_reducible(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Null
    )
}

/// Group rows by the calendar date of the index and reduce every site column.
///
/// Output rows are sorted by date and the index becomes a `Date` column with
/// the same name. Site columns keep their order.
pub fn aggregate_daily(
    table: &SiteTable,
    reduction: Reduction,
) -> Result<SiteTable, AggregateError> {
    let index = table.index_name();
    let sites = table.sites();

    let mut aggregations = Vec::with_capacity(sites.len());
    for site in &sites {
        let column = table.frame().column(site)?;
        let dtype = column.dtype();
        // A column without a single value carries no data, whatever its type.
        let no_data = column.null_count() == column.len();
        if !no_data && !is_reducible(dtype) {
            return Err(AggregateError::NonNumericColumn {
                column: site.clone(),
                dtype: dtype.clone(),
            });
        }

        let values = if no_data && !matches!(dtype, DataType::Float32 | DataType::Float64) {
            col(site.as_str()).cast(DataType::Float64)
        } else {
            col(site.as_str())
        };
        aggregations.push(reduction.apply(values));
    }

    let daily = table
        .frame()
        .clone()
        .lazy()
        .group_by([col(index).cast(DataType::Date)])
        .agg(aggregations)
        .sort([index], SortMultipleOptions::default())
        .collect()?;

    debug!(
        %reduction,
        rows_in = table.height(),
        days = daily.height(),
        sites = sites.len(),
        "aggregated daily"
    );

    Ok(SiteTable::new(daily, index)?)
}

/// Daily sum per site.
pub fn daily_total(table: &SiteTable) -> Result<SiteTable, AggregateError> {
    aggregate_daily(table, Reduction::Total)
}

/// Daily arithmetic mean per site.
pub fn daily_mean(table: &SiteTable) -> Result<SiteTable, AggregateError> {
    aggregate_daily(table, Reduction::Mean)
}

/// Daily maximum per site.
pub fn daily_max(table: &SiteTable) -> Result<SiteTable, AggregateError> {
    aggregate_daily(table, Reduction::Max)
}

/// Daily minimum per site.
pub fn daily_min(table: &SiteTable) -> Result<SiteTable, AggregateError> {
    aggregate_daily(table, Reduction::Min)
}
