//! Site Table Module
//! Wide time-indexed table: one temporal index column plus one column per site.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Index column '{0}' not found")]
    MissingIndex(String),
    #[error("Index column '{column}' has type {dtype}, expected a date or datetime")]
    IndexNotTemporal { column: String, dtype: DataType },
}

/// A `DataFrame` whose named index column holds dates or timestamps and whose
/// remaining columns each hold one site's measurements.
#[derive(Debug, Clone)]
pub struct SiteTable {
    frame: DataFrame,
    index: String,
    index_pos: usize,
}

impl SiteTable {
    /// Wrap a frame, checking that `index` exists and is temporal.
    pub fn new(frame: DataFrame, index: &str) -> Result<Self, TableError> {
        let index_pos = frame
            .get_column_index(index)
            .ok_or_else(|| TableError::MissingIndex(index.to_string()))?;
        let column = &frame.get_columns()[index_pos];

        if !matches!(column.dtype(), DataType::Date | DataType::Datetime(_, _)) {
            return Err(TableError::IndexNotTemporal {
                column: index.to_string(),
                dtype: column.dtype().clone(),
            });
        }

        Ok(Self {
            frame,
            index: index.to_string(),
            index_pos,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub fn index(&self) -> &Column {
        &self.frame.get_columns()[self.index_pos]
    }

    /// Site column names in table order.
    pub fn sites(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .filter(|name| name.as_str() != self.index)
            .map(|name| name.to_string())
            .collect()
    }

    pub fn site(&self, name: &str) -> Option<&Column> {
        if name == self.index {
            return None;
        }
        self.frame.column(name).ok()
    }

    /// Number of rows (distinct index values).
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}

impl PartialEq for SiteTable {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.frame.equals_missing(&other.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn exposes_sites_without_index() {
        let frame = df!(
            "Date" => [stamp(1, 1), stamp(1, 2)],
            "A" => [1.0, 2.0],
            "B" => [3.0, 4.0],
        )
        .unwrap();
        let table = SiteTable::new(frame, "Date").unwrap();

        assert_eq!(table.sites(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(table.height(), 2);
        assert!(table.site("Date").is_none());
        assert!(table.site("A").is_some());
        assert_eq!(table.index().len(), 2);
    }

    #[test]
    fn rejects_missing_index() {
        let frame = df!("A" => [1.0]).unwrap();
        let err = SiteTable::new(frame, "Date").unwrap_err();
        assert!(matches!(err, TableError::MissingIndex(name) if name == "Date"));
    }

    #[test]
    fn rejects_text_index() {
        let frame = df!("Date" => ["2000-01-01"], "A" => [1.0]).unwrap();
        let err = SiteTable::new(frame, "Date").unwrap_err();
        assert!(matches!(err, TableError::IndexNotTemporal { .. }));
    }

    #[test]
    fn equality_treats_nulls_as_equal() {
        let build = || {
            let frame = df!(
                "Date" => [stamp(1, 0)],
                "A" => [None::<f64>],
            )
            .unwrap();
            SiteTable::new(frame, "Date").unwrap()
        };
        assert_eq!(build(), build());
    }
}
