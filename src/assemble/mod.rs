//! Derived column naming and merging.
//!
//! Every derived column is named `{prefix}_{year:04}_{field}`, so running
//! several pipelines (or one pipeline for several years) over the same batch
//! never produces clashing names. Columns are collected first and appended in
//! one step, which keeps the result all-or-nothing.

use crate::error_handling::CategoryError;
use crate::frame::{Column, Frame, Value};

/// Column name prefix for one (pipeline or dataset, year).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPrefix {
    name: String,
    year: u16,
}

impl ColumnPrefix {
    /// Creates a prefix such as `pred_phish` + 2016.
    pub fn new(name: impl Into<String>, year: u16) -> Self {
        Self {
            name: name.into(),
            year,
        }
    }

    /// Full column name for a derived field.
    pub fn column(&self, field: &str) -> String {
        format!("{}_{:04}_{}", self.name, self.year, field)
    }
}

/// Derived columns waiting to be merged onto a batch.
#[derive(Debug, Clone)]
pub struct DerivedColumns {
    prefix: ColumnPrefix,
    columns: Vec<Column>,
}

impl DerivedColumns {
    /// Starts an empty set of columns under `prefix`.
    pub fn new(prefix: ColumnPrefix) -> Self {
        Self {
            prefix,
            columns: Vec::new(),
        }
    }

    /// Adds the column `{prefix}_{field}`.
    pub fn push<I, V>(&mut self, field: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.columns
            .push(Column::new(self.prefix.column(field), values));
        self
    }

    /// Returns a copy of `frame` with every collected column appended.
    ///
    /// The caller's frame is never modified. A name collision with an existing
    /// column or a length mismatch is reported as a resolution error.
    pub fn apply(self, frame: &Frame) -> Result<Frame, CategoryError> {
        log::debug!(
            "Appending {} derived columns to {} rows",
            self.columns.len(),
            frame.len()
        );
        frame
            .with_columns(self.columns)
            .map_err(|e| CategoryError::ResolutionError(e.into()))
    }
}
