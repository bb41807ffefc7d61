//! Core types for the Pointer Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: table cells, capture/path frames, and the sample threaded through
//! a [`Pipeline`](crate::pipeline::Pipeline).

use crate::error::ComputeError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Dense numeric tensor produced for one gesture path (rows = records, cols = schema)
pub type Tensor = Array2<f64>;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric coercion: numbers as-is, numeric text parsed, everything else rejected
    pub fn to_number(&self) -> Result<f64, String> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("text '{}' is not numeric", s)),
            Value::Null => Err("missing value".to_string()),
        }
    }
}

/// Row-major table with an ordered, named column list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Create an empty frame with the given columns
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a frame from columns and rows, rejecting ragged rows
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, ComputeError> {
        let mut frame = Frame::new(columns);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row; its width must match the column count
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ComputeError> {
        if row.len() != self.columns.len() {
            return Err(ComputeError::SchemaError(format!(
                "row {} has {} cells but the frame has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Cell at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterate the cells of one column in row order
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Owned copy of rows `start..end`, keeping the column set
    pub fn slice(&self, start: usize, end: usize) -> Frame {
        let end = end.min(self.rows.len());
        let start = start.min(end);
        Frame {
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Replace a column's values in place, or append it if absent
    pub fn upsert_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), ComputeError> {
        if values.len() != self.rows.len() {
            return Err(ComputeError::SchemaError(format!(
                "column '{}' has {} values but the frame has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Remove a column and return its values
    pub fn remove_column(&mut self, name: &str) -> Option<Vec<Value>> {
        let idx = self.column_index(name)?;
        self.columns.remove(idx);
        Some(self.rows.iter_mut().map(|r| r.remove(idx)).collect())
    }

    /// Apply `f` to every cell of a column; no-op when the column is absent
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(&Value) -> Value) {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx]);
            }
        }
    }

    /// Build a frame with columns in `order`; missing columns are filled with `fill`.
    /// Columns present in the frame but absent from `order` are appended after it.
    pub fn reindex(&self, order: &[String], fill: &Value) -> Frame {
        let mut columns: Vec<String> = order.to_vec();
        columns.extend(
            self.columns
                .iter()
                .filter(|c| !order.contains(c))
                .cloned(),
        );

        let sources: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| src.map_or_else(|| fill.clone(), |i| row[i].clone()))
                    .collect()
            })
            .collect();

        Frame { columns, rows }
    }
}

/// The value threaded through every pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// One capture file's raw records
    Frame(Frame),
    /// Ordered gesture paths
    Paths(Vec<Frame>),
    /// One tensor per path
    Tensors(Vec<Tensor>),
}

impl Sample {
    /// Variant name used in stage mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Sample::Frame(_) => "frame",
            Sample::Paths(_) => "paths",
            Sample::Tensors(_) => "tensors",
        }
    }

    pub fn into_tensors(self) -> Option<Vec<Tensor>> {
        match self {
            Sample::Tensors(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_paths(self) -> Option<Vec<Frame>> {
        match self {
            Sample::Paths(p) => Some(p),
            _ => None,
        }
    }
}
