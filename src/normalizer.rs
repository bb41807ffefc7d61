//! Path time normalization
//!
//! Rebases a path's timestamps so its earliest record sits at 0. Row order is
//! never changed: segmentation order is authoritative, so the first row is only
//! at 0 when it also carries the minimum timestamp.

use crate::schema::TS_COLUMN;
use crate::types::{Frame, Value};

/// Normalizer for per-path time bases
pub struct TimeNormalizer;

impl TimeNormalizer {
    /// Subtract the path minimum from every numeric timestamp.
    ///
    /// Non-numeric and non-finite cells do not take part in the minimum; they
    /// are left for schema enforcement to fill. Returns the subtracted offset,
    /// or `None` when there was nothing to rebase.
    pub fn rebase(frame: &mut Frame) -> Option<f64> {
        let min = frame
            .column(TS_COLUMN)?
            .filter_map(Value::as_f64)
            .filter(|ts| ts.is_finite())
            .fold(None, |acc: Option<f64>, ts| {
                Some(acc.map_or(ts, |m| m.min(ts)))
            })?;

        frame.map_column(TS_COLUMN, |v| match v {
            Value::Number(ts) => Value::Number(ts - min),
            other => other.clone(),
        });

        Some(min)
    }
}
