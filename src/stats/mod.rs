//! Stats module - daily reductions per site

mod daily;

pub use daily::{
    aggregate_daily, daily_max, daily_mean, daily_min, daily_total, AggregateError, Reduction,
};
