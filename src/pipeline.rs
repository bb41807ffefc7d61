//! Pipeline orchestration
//!
//! A [`Pipeline`] is an ordered list of stages fixed at construction. Applying
//! it threads one [`Sample`] through every stage in list order:
//!
//! 1. [`PathSegmenter`] - raw capture frame → gesture paths
//! 2. [`FeatureWrangler`] - paths → canonical, fully numeric paths
//! 3. [`Tensorizer`] - paths → one tensor per path
//!
//! Stages are plain values behind the [`Transform`] trait; the standard stage
//! set is the closed [`Stage`] enum.

use crate::config::{PipelineConfig, WrangleConfig};
use crate::error::ComputeError;
use crate::segmenter::PathSegmenter;
use crate::store::read_capture;
use crate::tensor::Tensorizer;
use crate::types::{Sample, Tensor};
use crate::wrangler::FeatureWrangler;
use std::path::Path;

/// A single pipeline step
pub trait Transform {
    /// Stage name used in logs and mismatch errors
    fn name(&self) -> &'static str;

    fn transform(&self, sample: Sample) -> Result<Sample, ComputeError>;
}

/// The standard pipeline stages
#[derive(Debug, Clone)]
pub enum Stage {
    Segment(PathSegmenter),
    Wrangle(FeatureWrangler),
    Tensorize(Tensorizer),
}

impl Stage {
    fn expects(&self) -> &'static str {
        match self {
            Stage::Segment(_) => "frame",
            Stage::Wrangle(_) | Stage::Tensorize(_) => "paths",
        }
    }

    fn mismatch(&self, sample: &Sample) -> ComputeError {
        ComputeError::StageMismatch {
            stage: self.name(),
            expected: self.expects(),
            found: sample.kind(),
        }
    }
}

impl Transform for Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Segment(_) => "segment",
            Stage::Wrangle(_) => "wrangle",
            Stage::Tensorize(_) => "tensorize",
        }
    }

    fn transform(&self, sample: Sample) -> Result<Sample, ComputeError> {
        match (self, sample) {
            (Stage::Segment(segmenter), Sample::Frame(frame)) => {
                segmenter.segment(&frame).map(Sample::Paths)
            }
            (Stage::Wrangle(wrangler), Sample::Paths(paths)) => {
                wrangler.wrangle(paths).map(Sample::Paths)
            }
            (Stage::Tensorize(tensorizer), Sample::Paths(paths)) => {
                tensorizer.tensorize(&paths).map(Sample::Tensors)
            }
            (stage, other) => Err(stage.mismatch(&other)),
        }
    }
}

impl From<PathSegmenter> for Stage {
    fn from(s: PathSegmenter) -> Self {
        Stage::Segment(s)
    }
}

impl From<FeatureWrangler> for Stage {
    fn from(w: FeatureWrangler) -> Self {
        Stage::Wrangle(w)
    }
}

impl From<Tensorizer> for Stage {
    fn from(t: Tensorizer) -> Self {
        Stage::Tensorize(t)
    }
}

/// Ordered composition of stages
#[derive(Debug, Clone)]
pub struct Pipeline<T: Transform = Stage> {
    stages: Vec<T>,
}

impl<T: Transform> Default for Pipeline<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Transform> Pipeline<T> {
    /// Create a pipeline; stage order is fixed from here on
    pub fn new(stages: Vec<T>) -> Self {
        Self { stages }
    }

    /// Pipeline with no stages; `apply` returns its input unchanged
    pub fn identity() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stages(&self) -> &[T] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Thread `sample` through every stage in order.
    ///
    /// The first failing stage aborts the run and its error is returned as is.
    pub fn apply(&self, sample: Sample) -> Result<Sample, ComputeError> {
        self.stages
            .iter()
            .try_fold(sample, |sample, stage| stage.transform(sample))
    }
}

impl Pipeline<Stage> {
    /// Segment → wrangle → tensorize
    pub fn standard(config: &WrangleConfig) -> Self {
        Self::new(vec![
            PathSegmenter::new().into(),
            FeatureWrangler::new(config).into(),
            Tensorizer::new().into(),
        ])
    }
}

/// Run the standard pipeline over a single capture file.
///
/// # Example
/// ```ignore
/// let tensors = capture_to_tensors("captures/session.csv", &PipelineConfig::default())?;
/// ```
pub fn capture_to_tensors(
    path: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<Vec<Tensor>, ComputeError> {
    config.validate()?;
    let frame = read_capture(path)?;
    let output = Pipeline::standard(&config.wrangle).apply(Sample::Frame(frame))?;
    let found = output.kind();
    output.into_tensors().ok_or(ComputeError::StageMismatch {
        stage: "pipeline",
        expected: "tensors",
        found,
    })
}
