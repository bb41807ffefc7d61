//! Canonical output column schema
//!
//! The category vocabulary is closed and fixed ahead of time, so every wrangled
//! path carries the same columns in the same order whether or not a given
//! category value occurred in it.

use super::record::{ACTION_COLUMN, BUTTON_COLUMN, EVENT_COLUMN, TS_COLUMN, X_COLUMN, Y_COLUMN};
use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Horizontal delta extracted from a scroll descriptor
pub const DELTA_X_COLUMN: &str = "delta_x_coord";
/// Vertical delta extracted from a scroll descriptor
pub const DELTA_Y_COLUMN: &str = "delta_y_coord";

/// Categorical columns, in encoding order
pub const CATEGORICAL_COLUMNS: [&str; 3] = [BUTTON_COLUMN, ACTION_COLUMN, EVENT_COLUMN];

/// Indicator column name for a category value (`{column}_{value}`)
pub fn indicator_name(column: &str, value: &str) -> String {
    format!("{}_{}", column, value)
}

/// Recognized values for each categorical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryVocabulary {
    /// Leading button tokens (`Button.left` is reduced to `Button`)
    pub button: Vec<String>,
    pub action: Vec<String>,
    pub event: Vec<String>,
}

impl Default for CategoryVocabulary {
    fn default() -> Self {
        Self {
            button: vec!["Button".to_string()],
            action: vec!["press".to_string(), "released".to_string()],
            event: vec!["move".to_string(), "click".to_string(), "scroll".to_string()],
        }
    }
}

impl CategoryVocabulary {
    /// Values recognized for a categorical column (empty for unknown columns)
    pub fn values(&self, column: &str) -> &[String] {
        match column {
            BUTTON_COLUMN => &self.button,
            ACTION_COLUMN => &self.action,
            EVENT_COLUMN => &self.event,
            _ => &[],
        }
    }

    /// Reject empty or duplicated category values
    pub fn validate(&self) -> Result<(), ComputeError> {
        for column in CATEGORICAL_COLUMNS {
            let mut seen = HashSet::new();
            for value in self.values(column) {
                if value.trim().is_empty() {
                    return Err(ComputeError::ConfigError(format!(
                        "empty category value for column '{}'",
                        column
                    )));
                }
                if !seen.insert(value.as_str()) {
                    return Err(ComputeError::ConfigError(format!(
                        "duplicate category value '{}' for column '{}'",
                        value, column
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Fixed, ordered list of columns every wrangled path must contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalSchema {
    columns: Vec<String>,
}

impl Default for CanonicalSchema {
    fn default() -> Self {
        Self::from_vocabulary(&CategoryVocabulary::default())
    }
}

impl CanonicalSchema {
    /// Numeric columns that precede the indicators
    pub const NUMERIC_COLUMNS: [&'static str; 5] =
        [TS_COLUMN, X_COLUMN, Y_COLUMN, DELTA_X_COLUMN, DELTA_Y_COLUMN];

    /// Derive the schema: numeric columns, then one indicator per category value
    pub fn from_vocabulary(vocabulary: &CategoryVocabulary) -> Self {
        let mut columns: Vec<String> = Self::NUMERIC_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();

        for column in CATEGORICAL_COLUMNS {
            columns.extend(
                vocabulary
                    .values(column)
                    .iter()
                    .map(|value| indicator_name(column, value)),
            );
        }

        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}
