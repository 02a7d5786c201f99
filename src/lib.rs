//! Catchment - site measurement loading and daily statistics
//!
//! Site readings arrive as long-format CSV rows of `(date, site, value)`.
//! [`read_variable`] pivots them into a [`SiteTable`] with one row per
//! timestamp and one column per site; the `daily_*` functions collapse any
//! such table to one row per calendar day.
//!
//! ```no_run
//! use catchment::{daily_total, read_variable};
//!
//! let rainfall = read_variable("data/rain_data_2015-12.csv")?;
//! let totals = daily_total(&rainfall)?;
//! println!("{}", totals.frame());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod data;
pub mod stats;

pub use config::{ColumnConfig, ConfigError, DEFAULT_VALUE_COLUMN};
pub use data::{read_variable, read_variable_with, DataLoader, LoaderError, SiteTable};
pub use stats::{
    aggregate_daily, daily_max, daily_mean, daily_min, daily_total, AggregateError, Reduction,
};
