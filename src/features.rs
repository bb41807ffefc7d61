//! Compound field decomposition
//!
//! Scroll events log their pointer delta inside the `button` field as a
//! `(dx,dy)` descriptor (written as `delta(dx,dy)` by the capture listener).
//! This module splits that descriptor into numeric `delta_x_coord` /
//! `delta_y_coord` columns and reduces `button` to its leading word token.

use crate::error::ComputeError;
use crate::schema::{BUTTON_COLUMN, DELTA_X_COLUMN, DELTA_Y_COLUMN};
use crate::types::{Frame, Value};
use regex::Regex;
use std::sync::LazyLock;

/// `(signed-int,signed-int)` anywhere in the field
static DELTA_DESCRIPTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*([+-]?\d+)\s*,\s*([+-]?\d+)\s*\)").expect("valid regex")
});

/// Leading identifier-like token (`Button.left` -> `Button`)
static LEADING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"));

/// Extract `(dx, dy)` from a delta descriptor.
///
/// Text without the pattern, or with integers that do not fit, yields `None`.
pub fn parse_delta(text: &str) -> Option<(i64, i64)> {
    let caps = DELTA_DESCRIPTOR.captures(text)?;
    let dx = caps[1].parse::<i64>().ok()?;
    let dy = caps[2].parse::<i64>().ok()?;
    Some((dx, dy))
}

/// Leading word token of a button field, if it starts with one
pub fn leading_token(text: &str) -> Option<&str> {
    LEADING_TOKEN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Splits delta descriptors out of the `button` column
pub struct DeltaDecomposer;

impl DeltaDecomposer {
    /// Add/overwrite the delta columns and rewrite `button` to its leading token.
    ///
    /// A frame without a `button` column (for example one that was already
    /// encoded) only gets zero-filled delta columns where they are missing.
    pub fn decompose(frame: &mut Frame) -> Result<(), ComputeError> {
        let buttons: Option<Vec<Value>> = frame
            .column(BUTTON_COLUMN)
            .map(|column| column.cloned().collect());

        let Some(buttons) = buttons else {
            for name in [DELTA_X_COLUMN, DELTA_Y_COLUMN] {
                if !frame.has_column(name) {
                    let zeros = vec![Value::Number(0.0); frame.len()];
                    frame.upsert_column(name, zeros)?;
                }
            }
            return Ok(());
        };

        let mut delta_x = Vec::with_capacity(buttons.len());
        let mut delta_y = Vec::with_capacity(buttons.len());
        for button in &buttons {
            let (dx, dy) = button.as_str().and_then(parse_delta).unwrap_or((0, 0));
            delta_x.push(Value::Number(dx as f64));
            delta_y.push(Value::Number(dy as f64));
        }

        frame.upsert_column(DELTA_X_COLUMN, delta_x)?;
        frame.upsert_column(DELTA_Y_COLUMN, delta_y)?;
        frame.map_column(BUTTON_COLUMN, |v| match v.as_str().and_then(leading_token) {
            Some(token) => Value::from(token),
            None => Value::Null,
        });

        Ok(())
    }
}
