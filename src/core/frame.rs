//! Column-oriented table used as the tabular interface of the crate.
//!
//! A [`Frame`] owns named, equally-sized, typed columns. It is deliberately
//! small: just enough table to carry a timestamp axis, value columns and
//! whatever extra columns the caller wants bound onto results.

use crate::error::{AnomalyError, Result};
use chrono::{DateTime, Utc};

/// A single typed column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// 64-bit floating point values.
    Float(Vec<f64>),
    /// 64-bit signed integers.
    Int(Vec<i64>),
    /// UTF-8 strings.
    Str(Vec<String>),
    /// UTC timestamps.
    Timestamp(Vec<DateTime<Utc>>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Str(v) => v.len(),
            Column::Timestamp(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable type tag used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Int(_) => "int",
            Column::Str(_) => "str",
            Column::Timestamp(_) => "timestamp",
        }
    }

    /// Copy the rows at `indices` into a new column of the same type.
    pub(crate) fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(indices.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(indices.iter().map(|&i| v[i]).collect()),
            Column::Str(v) => Column::Str(indices.iter().map(|&i| v[i].clone()).collect()),
            Column::Timestamp(v) => Column::Timestamp(indices.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Append the rows of `other` onto this column.
    pub(crate) fn append(&mut self, other: &Column) -> Result<()> {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => a.extend_from_slice(b),
            (Column::Int(a), Column::Int(b)) => a.extend_from_slice(b),
            (Column::Str(a), Column::Str(b)) => a.extend_from_slice(b),
            (Column::Timestamp(a), Column::Timestamp(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(AnomalyError::Validation(format!(
                    "cannot stack {} column onto {} column",
                    b.type_name(),
                    a.type_name()
                )))
            }
        }
        Ok(())
    }
}

/// Column-oriented table with named, equally-sized columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (0 for a frame with no columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Whether a column with the given name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Add a column. Fails if the name already exists or the length does not
    /// match the frame's row count.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(AnomalyError::Validation(format!(
                "duplicate column name: {name}"
            )));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(AnomalyError::Validation(format!(
                "column {name:?} has {} rows, expected {}",
                column.len(),
                self.n_rows()
            )));
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| AnomalyError::Validation(format!("missing column: {name}")))
    }

    /// Borrow a float column.
    pub fn float_column(&self, name: &str) -> Result<&[f64]> {
        match self.column(name)? {
            Column::Float(v) => Ok(v),
            other => Err(wrong_type(name, other, "float")),
        }
    }

    /// Borrow an integer column.
    pub fn int_column(&self, name: &str) -> Result<&[i64]> {
        match self.column(name)? {
            Column::Int(v) => Ok(v),
            other => Err(wrong_type(name, other, "int")),
        }
    }

    /// Borrow a string column.
    pub fn str_column(&self, name: &str) -> Result<&[String]> {
        match self.column(name)? {
            Column::Str(v) => Ok(v),
            other => Err(wrong_type(name, other, "str")),
        }
    }

    /// Borrow a timestamp column.
    pub fn timestamp_column(&self, name: &str) -> Result<&[DateTime<Utc>]> {
        match self.column(name)? {
            Column::Timestamp(v) => Ok(v),
            other => Err(wrong_type(name, other, "timestamp")),
        }
    }

    /// Read a column as floats, casting integers. Used for value columns,
    /// which may arrive as either numeric type.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        match self.column(name)? {
            Column::Float(v) => Ok(v.clone()),
            Column::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            other => Err(wrong_type(name, other, "numeric")),
        }
    }

    /// Copy the rows at `indices` into a new frame, in the given order.
    pub fn take(&self, indices: &[usize]) -> Result<Frame> {
        let n = self.n_rows();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(AnomalyError::Validation(format!(
                "row index {bad} out of bounds for frame with {n} rows"
            )));
        }
        Ok(Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
        })
    }

    /// Append the columns of `other` onto this frame (horizontal stack).
    /// Row counts must match and column names must stay unique.
    pub fn hstack(&mut self, other: Frame) -> Result<()> {
        if !self.columns.is_empty() && !other.columns.is_empty() && other.n_rows() != self.n_rows()
        {
            return Err(AnomalyError::Validation(format!(
                "cannot stack frames with {} and {} rows side by side",
                self.n_rows(),
                other.n_rows()
            )));
        }
        for (name, column) in other.names.into_iter().zip(other.columns) {
            self.push_column(name, column)?;
        }
        Ok(())
    }

    /// Append the rows of `other` onto this frame (vertical stack).
    /// Schemas must match exactly: same column names and types, in order.
    pub fn vstack(&mut self, other: &Frame) -> Result<()> {
        if self.columns.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if self.names != other.names {
            return Err(AnomalyError::Validation(
                "cannot stack frames with different columns".to_string(),
            ));
        }
        for (mine, theirs) in self.columns.iter_mut().zip(&other.columns) {
            mine.append(theirs)?;
        }
        Ok(())
    }
}

fn wrong_type(name: &str, actual: &Column, expected: &str) -> AnomalyError {
    AnomalyError::Validation(format!(
        "column {name:?} has type {}, expected {expected}",
        actual.type_name()
    ))
}
