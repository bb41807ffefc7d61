//! Pipeline configuration
//!
//! All settings that change wrangling behavior are passed explicitly to the
//! stage that needs them. Configuration files are JSON; every field has a
//! default, so a partial file only overrides what it names.

use crate::error::ComputeError;
use crate::schema::{CanonicalSchema, CategoryVocabulary};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default capture log extension
pub const DEFAULT_LOG_EXTENSION: &str = "csv";

/// Settings for the per-path wrangling stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrangleConfig {
    /// Closed category vocabulary used for one-hot encoding
    pub vocabulary: CategoryVocabulary,
    /// Replacement for missing cells in canonical columns
    pub missing_fill: f64,
}

impl Default for WrangleConfig {
    fn default() -> Self {
        Self {
            vocabulary: CategoryVocabulary::default(),
            missing_fill: 0.0,
        }
    }
}

impl WrangleConfig {
    /// Canonical output schema implied by the vocabulary
    pub fn schema(&self) -> CanonicalSchema {
        CanonicalSchema::from_vocabulary(&self.vocabulary)
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.missing_fill.is_finite() {
            return Err(ComputeError::ConfigError(format!(
                "missing_fill must be finite, got {}",
                self.missing_fill
            )));
        }
        self.vocabulary.validate()
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// File extension that marks a capture log (leading dot optional)
    pub log_extension: String,
    /// Wrangling settings
    pub wrangle: WrangleConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log_extension: DEFAULT_LOG_EXTENSION.to_string(),
            wrangle: WrangleConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ComputeError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Extension without its leading dot
    pub fn extension(&self) -> &str {
        self.log_extension.trim_start_matches('.')
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.extension().trim().is_empty() {
            return Err(ComputeError::ConfigError(
                "log_extension must not be empty".to_string(),
            ));
        }
        self.wrangle.validate()
    }
}
