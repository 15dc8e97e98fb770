//! Ordered, labeled-column row store.
//!
//! `Frame` is the batch container every pipeline consumes and produces. It is
//! deliberately small: named columns of [`Value`]s with one value per row,
//! plus CSV and JSONL import/export.
//!
//! Frames are never mutated by the pipelines. Derived columns are appended to a
//! copy through [`Frame::with_columns`], which is all-or-nothing.

mod csv;
mod jsonl;
mod value;

pub use value::Value;

use crate::error_handling::FrameError;

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column label
    pub name: String,
    /// One value per row
    pub values: Vec<Value>,
}

impl Column {
    /// Creates a column from anything convertible into values.
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A batch of rows stored column by column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    rows: usize,
}

impl Frame {
    /// Creates an empty frame with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frame from columns, checking names are unique and lengths agree.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, FrameError> {
        Frame::new().with_columns(columns)
    }

    /// Builds a frame from a header and row-major values.
    pub fn from_rows<S>(header: &[S], rows: Vec<Vec<Value>>) -> Result<Self, FrameError>
    where
        S: AsRef<str>,
    {
        let mut columns: Vec<Column> = header
            .iter()
            .map(|name| Column {
                name: name.as_ref().to_string(),
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(FrameError::LengthMismatch {
                    column: format!("row {}", i),
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }

        Frame::from_columns(columns)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Returns true when the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column labels in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns true if a column with this label exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Values of the named column.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Value at `(row, column)`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|values| values.get(row))
    }

    /// Returns a copy of this frame with `extra` appended after the existing columns.
    ///
    /// Either every column is appended or none is: a length mismatch or a name
    /// that already exists (in the frame or twice in `extra`) fails the whole call.
    /// For a frame without columns the first appended column sets the row count.
    pub fn with_columns(&self, extra: Vec<Column>) -> Result<Frame, FrameError> {
        let expected = if self.columns.is_empty() {
            extra.first().map(|c| c.values.len()).unwrap_or(0)
        } else {
            self.rows
        };

        for (i, column) in extra.iter().enumerate() {
            if column.values.len() != expected {
                return Err(FrameError::LengthMismatch {
                    column: column.name.clone(),
                    expected,
                    actual: column.values.len(),
                });
            }
            if self.has_column(&column.name) || extra[..i].iter().any(|c| c.name == column.name)
            {
                return Err(FrameError::DuplicateColumn(column.name.clone()));
            }
        }

        let mut columns = self.columns.clone();
        columns.extend(extra);
        Ok(Frame {
            columns,
            rows: expected,
        })
    }
}
