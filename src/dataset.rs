//! Dataset facade over a record store and a pipeline
//!
//! Every item is one capture file: load → apply the pipeline → tensors.
//! Items are independent, so a failing file surfaces its own error without
//! affecting the others.

use crate::config::PipelineConfig;
use crate::error::ComputeError;
use crate::pipeline::{Pipeline, Stage, Transform};
use crate::store::RecordStore;
use crate::types::{Sample, Tensor};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Indexed access to pipeline output, one item per capture file
#[derive(Debug, Clone)]
pub struct CaptureDataset<T: Transform = Stage> {
    store: RecordStore,
    pipeline: Pipeline<T>,
}

impl CaptureDataset<Stage> {
    /// Open `dir` with the standard pipeline built from `config`
    pub fn from_config(
        dir: impl AsRef<Path>,
        config: &PipelineConfig,
    ) -> Result<Self, ComputeError> {
        config.validate()?;
        let store = RecordStore::open_with_extension(dir, config.extension())?;
        Ok(Self::new(store, Pipeline::standard(&config.wrangle)))
    }
}

impl<T: Transform> CaptureDataset<T> {
    pub fn new(store: RecordStore, pipeline: Pipeline<T>) -> Self {
        Self { store, pipeline }
    }

    /// Number of capture files
    pub fn len(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn pipeline(&self) -> &Pipeline<T> {
        &self.pipeline
    }

    /// Load file `index` and run it through the pipeline
    pub fn get(&self, index: usize) -> Result<Sample, ComputeError> {
        let frame = self.store.get(index)?;
        debug!(
            "Applying {} stages to {}",
            self.pipeline.len(),
            self.store.file_path(index)?.display()
        );
        self.pipeline.apply(Sample::Frame(frame))
    }

    /// Like [`get`](Self::get), requiring the pipeline to end in tensors
    pub fn tensors(&self, index: usize) -> Result<Vec<Tensor>, ComputeError> {
        let sample = self.get(index)?;
        let found = sample.kind();
        sample.into_tensors().ok_or(ComputeError::StageMismatch {
            stage: "dataset",
            expected: "tensors",
            found,
        })
    }

    /// Every file in store order with its own result
    pub fn iter(&self) -> impl Iterator<Item = (PathBuf, Result<Vec<Tensor>, ComputeError>)> + '_ {
        self.store
            .files()
            .iter()
            .enumerate()
            .map(move |(index, path)| (path.clone(), self.tensors(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CanonicalSchema;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const GOOD: &str = "ts,event,x,y,button,action\n\
        1.0,move,0,0,,\n\
        1.1,click,0,0,Button.left,press\n\
        1.2,click,0,0,Button.left,released\n\
        1.3,move,5,5,,\n\
        1.4,click,5,5,Button.left,released\n\
        1.5,move,6,6,,\n\
        1.6,click,6,6,Button.left,released\n";

    const ONE_RELEASE: &str = "ts,event,x,y,button,action\n\
        1.0,move,0,0,,\n\
        1.1,click,0,0,Button.left,released\n";

    fn dataset_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a_good.csv"), GOOD).unwrap();
        fs::write(dir.path().join("b_short.csv"), ONE_RELEASE).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        dir
    }

    #[test]
    fn test_from_config_standard_pipeline() {
        let dir = dataset_dir();
        let dataset = CaptureDataset::from_config(dir.path(), &PipelineConfig::default()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.pipeline().len(), 3);

        let tensors = dataset.tensors(0).unwrap();
        assert_eq!(tensors.len(), 2);
        assert_eq!(tensors[0].shape(), &[5, CanonicalSchema::default().width()]);
    }

    #[test]
    fn test_failing_file_does_not_block_others() {
        let dir = dataset_dir();
        let dataset = CaptureDataset::from_config(dir.path(), &PipelineConfig::default()).unwrap();

        let results: Vec<_> = dataset.iter().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(ComputeError::SegmentationError(_))
        ));
        assert!(results[1].0.ends_with("b_short.csv"));
    }

    #[test]
    fn test_identity_pipeline_returns_raw_frame() {
        let dir = dataset_dir();
        let store = RecordStore::open(dir.path()).unwrap();
        let dataset: CaptureDataset = CaptureDataset::new(store, Pipeline::identity());

        let sample = dataset.get(0).unwrap();
        assert_eq!(sample.kind(), "frame");
        assert!(matches!(
            dataset.tensors(0),
            Err(ComputeError::StageMismatch { found: "frame", .. })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let dir = dataset_dir();
        let dataset = CaptureDataset::from_config(dir.path(), &PipelineConfig::default()).unwrap();
        assert!(matches!(
            dataset.get(7),
            Err(ComputeError::IndexError { index: 7, len: 2 })
        ));
    }
}
