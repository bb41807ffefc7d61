//! Capture record store
//!
//! Enumerates the capture logs in one directory and loads a single file into a
//! [`Frame`] on demand. Nothing is cached: every `get` re-reads the file and the
//! handle is closed before returning.

use crate::error::ComputeError;
use crate::schema::{validate_header, RawRecord, RAW_COLUMNS};
use crate::types::Frame;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory-backed store of capture files
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl RecordStore {
    /// Open a directory, treating every `*.csv` file as a capture log
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ComputeError> {
        Self::open_with_extension(dir, crate::config::DEFAULT_LOG_EXTENSION)
    }

    /// Open a directory with a custom log extension (leading dot optional).
    ///
    /// Subdirectories are not searched. Files are ordered by name so indexes
    /// are stable between runs.
    pub fn open_with_extension(
        dir: impl AsRef<Path>,
        extension: &str,
    ) -> Result<Self, ComputeError> {
        let dir = dir.as_ref().to_path_buf();
        let suffix = format!(".{}", extension.trim_start_matches('.'));

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let eligible = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(&suffix));
            if eligible {
                files.push(entry.path());
            }
        }
        files.sort();

        info!(
            "Opened record store {} with {} capture files",
            dir.display(),
            files.len()
        );

        Ok(Self { dir, files })
    }

    /// Number of eligible capture files
    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Path of the file at `index`
    pub fn file_path(&self, index: usize) -> Result<&Path, ComputeError> {
        self.files
            .get(index)
            .map(PathBuf::as_path)
            .ok_or(ComputeError::IndexError {
                index,
                len: self.files.len(),
            })
    }

    /// Load the raw record table of file `index`
    pub fn get(&self, index: usize) -> Result<Frame, ComputeError> {
        let path = self.file_path(index)?;
        read_capture(path)
    }
}

/// Read one capture file into a frame with [`RAW_COLUMNS`] in file-contract order
pub fn read_capture(path: impl AsRef<Path>) -> Result<Frame, ComputeError> {
    let path = path.as_ref();
    let file = fs::File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    validate_header(headers.iter())
        .map_err(|e| ComputeError::SchemaError(format!("{}: {}", path.display(), e)))?;

    let mut frame = Frame::new(RAW_COLUMNS);
    for result in reader.deserialize::<RawRecord>() {
        let record = result.map_err(|e| csv_error(path, e))?;
        frame.push_row(record.to_row())?;
    }

    debug!("Read {} records from {}", frame.len(), path.display());
    Ok(frame)
}

fn csv_error(path: &Path, e: csv::Error) -> ComputeError {
    let line = e
        .position()
        .map(|p| p.line().to_string())
        .unwrap_or_else(|| "?".to_string());
    let message = format!("{} line {}: {}", path.display(), line, e);

    // Anything other than an I/O failure means the log itself is malformed
    match e.into_kind() {
        csv::ErrorKind::Io(io) => ComputeError::Io(io),
        _ => ComputeError::SchemaError(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use std::fs;

    const SAMPLE: &str = "ts,event,x,y,button,action\n\
        100.0,move,10,20,,\n\
        100.5,click,10,20,Button.left,press\n\
        101.0,click,10,20,Button.left,released\n";

    #[test]
    fn test_enumerates_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), SAMPLE).unwrap();
        fs::write(dir.path().join("a.csv"), SAMPLE).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let store = RecordStore::open(dir.path()).unwrap();
        assert_eq!(store.count(), 2);
        assert!(store.file_path(0).unwrap().ends_with("a.csv"));
        assert!(store.file_path(1).unwrap().ends_with("b.csv"));
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.log"), SAMPLE).unwrap();
        fs::write(dir.path().join("two.csv"), SAMPLE).unwrap();

        let store = RecordStore::open_with_extension(dir.path(), ".log").unwrap();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_get_loads_frame() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), SAMPLE).unwrap();

        let store = RecordStore::open(dir.path()).unwrap();
        let frame = store.get(0).unwrap();

        assert_eq!(frame.len(), 3);
        assert_eq!(frame.columns(), &RAW_COLUMNS.map(String::from));
        assert_eq!(frame.value(0, "button"), Some(&Value::Null));
        assert_eq!(frame.value(2, "action"), Some(&Value::from("released")));
        assert_eq!(frame.value(1, "x"), Some(&Value::Number(10.0)));
    }

    #[test]
    fn test_get_rereads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        fs::write(&path, SAMPLE).unwrap();

        let store = RecordStore::open(dir.path()).unwrap();
        assert_eq!(store.get(0).unwrap().len(), 3);

        fs::write(&path, "ts,event,x,y,button,action\n1.0,move,0,0,,\n").unwrap();
        assert_eq!(store.get(0).unwrap().len(), 1);
    }

    #[test]
    fn test_out_of_range_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        assert!(store.is_empty());
        assert!(matches!(
            store.get(0),
            Err(ComputeError::IndexError { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_spaced_header_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spaced.csv");
        fs::write(
            &path,
            "ts, event, x, y, button, action\n1.0,scroll,5,6,\"delta(0,-1)\",\n",
        )
        .unwrap();

        let frame = read_capture(&path).unwrap();
        assert_eq!(frame.value(0, "button"), Some(&Value::from("delta(0,-1)")));
        assert_eq!(frame.value(0, "event"), Some(&Value::from("scroll")));
    }

    #[test]
    fn test_wrong_columns_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "ts,event,x,y\n1.0,move,0,0\n").unwrap();

        let result = read_capture(&path);
        assert!(matches!(result, Err(ComputeError::SchemaError(_))));
    }

    #[test]
    fn test_malformed_row_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "ts,event,x,y,button,action\nnot-a-time,move,0,0,,\n").unwrap();

        let err = read_capture(&path).unwrap_err();
        assert!(matches!(err, ComputeError::SchemaError(ref m) if m.contains("line 2")));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let result = RecordStore::open("/definitely/not/a/real/dir");
        assert!(matches!(result, Err(ComputeError::Io(_))));
    }
}
