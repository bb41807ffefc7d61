//! Per-path feature wrangling
//!
//! Runs, for every path in order: time rebasing → delta decomposition →
//! categorical encoding → schema enforcement.
//!
//! Wrangling is meant to be applied once. Running it again on an already
//! wrangled path does not fail (rebasing is a no-op, the categorical columns are
//! gone so nothing is re-encoded), but the result is not a supported input.

use crate::config::WrangleConfig;
use crate::encoder::CategoricalEncoder;
use crate::error::ComputeError;
use crate::features::DeltaDecomposer;
use crate::normalizer::TimeNormalizer;
use crate::schema::CanonicalSchema;
use crate::types::Frame;
use tracing::debug;

/// Normalizes and encodes gesture paths into the canonical schema
#[derive(Debug, Clone, Default)]
pub struct FeatureWrangler {
    encoder: CategoricalEncoder,
}

impl FeatureWrangler {
    /// Create a wrangler with explicit settings
    pub fn new(config: &WrangleConfig) -> Self {
        Self {
            encoder: CategoricalEncoder::new(config),
        }
    }

    /// Canonical columns every wrangled path starts with
    pub fn schema(&self) -> &CanonicalSchema {
        self.encoder.schema()
    }

    /// Wrangle every path, preserving count and order
    pub fn wrangle(&self, paths: Vec<Frame>) -> Result<Vec<Frame>, ComputeError> {
        paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let wrangled = self.wrangle_path(path)?;
                debug!(
                    "Wrangled path {} into {} rows x {} columns",
                    i,
                    wrangled.len(),
                    wrangled.width()
                );
                Ok(wrangled)
            })
            .collect()
    }

    /// Wrangle a single path
    pub fn wrangle_path(&self, mut path: Frame) -> Result<Frame, ComputeError> {
        TimeNormalizer::rebase(&mut path);
        DeltaDecomposer::decompose(&mut path)?;
        self.encoder.encode(&mut path)?;
        Ok(self.encoder.enforce_schema(&path))
    }
}
