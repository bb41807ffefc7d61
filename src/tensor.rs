//! Path table to tensor conversion

use crate::error::ComputeError;
use crate::types::{Frame, Tensor};
use tracing::debug;

/// Converts wrangled path tables into dense `f64` tensors.
///
/// Rows keep record order and columns keep the table's column order. Every cell
/// is coerced explicitly: numeric text is parsed, while missing values and
/// non-numeric text are rejected with a [`ComputeError::ConversionError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Tensorizer;

impl Tensorizer {
    pub fn new() -> Self {
        Self
    }

    /// Convert one path table
    pub fn to_tensor(&self, frame: &Frame) -> Result<Tensor, ComputeError> {
        let width = frame.width();
        let mut data = Vec::with_capacity(frame.len() * width);

        for (row_idx, row) in frame.rows().iter().enumerate() {
            for (cell, column) in row.iter().zip(frame.columns()) {
                let number = cell
                    .to_number()
                    .map_err(|message| ComputeError::ConversionError {
                        row: row_idx,
                        column: column.clone(),
                        message,
                    })?;
                data.push(number);
            }
        }

        Tensor::from_shape_vec((frame.len(), width), data)
            .map_err(|e| ComputeError::ShapeError(e.to_string()))
    }

    /// Convert every path, preserving order
    pub fn tensorize(&self, paths: &[Frame]) -> Result<Vec<Tensor>, ComputeError> {
        let tensors = paths
            .iter()
            .map(|path| self.to_tensor(path))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Tensorized {} paths", tensors.len());
        Ok(tensors)
    }
}
