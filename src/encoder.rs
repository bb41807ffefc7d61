//! Categorical encoding and schema enforcement
//!
//! Encodes `button`, `action` and `event` into one-hot indicator columns over a
//! closed vocabulary, then reshapes the frame to the canonical column order.
//! Nothing is fitted per path: the vocabulary alone decides the indicator
//! columns, so every encoded path has the same leading columns.

use crate::config::WrangleConfig;
use crate::error::ComputeError;
use crate::schema::{indicator_name, CanonicalSchema, CategoryVocabulary, CATEGORICAL_COLUMNS};
use crate::types::{Frame, Value};

/// One-hot encoder over a fixed category vocabulary
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    vocabulary: CategoryVocabulary,
    schema: CanonicalSchema,
    missing_fill: f64,
}

impl Default for CategoricalEncoder {
    fn default() -> Self {
        Self::new(&WrangleConfig::default())
    }
}

impl CategoricalEncoder {
    /// Create an encoder for the given wrangling settings
    pub fn new(config: &WrangleConfig) -> Self {
        Self {
            vocabulary: config.vocabulary.clone(),
            schema: config.schema(),
            missing_fill: config.missing_fill,
        }
    }

    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    /// Replace each categorical column with its indicator columns.
    ///
    /// Values outside the vocabulary (and missing values) encode as an all-zero
    /// row. Categorical columns absent from the frame are skipped.
    pub fn encode(&self, frame: &mut Frame) -> Result<(), ComputeError> {
        for column in CATEGORICAL_COLUMNS {
            let Some(values) = frame.remove_column(column) else {
                continue;
            };

            for category in self.vocabulary.values(column) {
                let indicator: Vec<Value> = values
                    .iter()
                    .map(|v| {
                        let hit = v.as_str().is_some_and(|s| s == category);
                        Value::Number(if hit { 1.0 } else { 0.0 })
                    })
                    .collect();

                frame.upsert_column(&indicator_name(column, category), indicator)?;
            }
        }
        Ok(())
    }

    /// Reorder to the canonical schema, zero-filling absent canonical columns
    /// and replacing missing or non-finite cells (`NaN`, `inf`) in canonical
    /// columns with `missing_fill`.
    ///
    /// Non-canonical columns are kept after the canonical ones.
    pub fn enforce_schema(&self, frame: &Frame) -> Frame {
        let mut enforced = frame.reindex(self.schema.columns(), &Value::Number(0.0));

        let fill = self.missing_fill;
        for column in self.schema.columns() {
            enforced.map_column(column, |v| {
                if v.is_null() || v.as_f64().is_some_and(|n| !n.is_finite()) {
                    Value::Number(fill)
                } else {
                    v.clone()
                }
            });
        }

        enforced
    }
}
