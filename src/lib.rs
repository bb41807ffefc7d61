//! Pointer Flux - gesture tensors from pointer-device capture logs
//!
//! Flux turns raw move/click/scroll logs into fixed-schema numeric tensors
//! through a deterministic pipeline: capture loading → path segmentation →
//! time normalization → delta decomposition → categorical encoding →
//! tensorization.
//!
//! ## Modules
//!
//! - **Capture**: write capture logs and load them from a directory store
//! - **Pipeline**: segment, wrangle and tensorize one capture at a time
//! - **Model**: recurrent consumer of the path tensors

pub mod capture;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod features;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod segmenter;
pub mod store;
pub mod tensor;
pub mod types;
pub mod wrangler;

pub use capture::CaptureWriter;
pub use config::{PipelineConfig, WrangleConfig};
pub use dataset::CaptureDataset;
pub use error::ComputeError;
pub use pipeline::{capture_to_tensors, Pipeline, Stage, Transform};
pub use segmenter::PathSegmenter;
pub use store::RecordStore;
pub use tensor::Tensorizer;
pub use types::{Frame, Sample, Tensor, Value};
pub use wrangler::FeatureWrangler;

// Schema exports
pub use schema::{CanonicalSchema, CategoryVocabulary, RawRecord, RAW_COLUMNS};

/// Flux version reported by the CLI
pub const FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI output records
pub const PRODUCER_NAME: &str = "pointer-flux";
