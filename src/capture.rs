//! Capture log writer
//!
//! The writing half of the capture listener: an input hook calls the `on_*`
//! methods and every accepted event becomes one CSV row in the format
//! [`read_capture`](crate::store::read_capture) loads. Hooking the OS input
//! devices is left to the caller.

use crate::error::ComputeError;
use crate::schema::{Action, EventKind, RawRecord, RAW_COLUMNS};
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Minimum spacing between recorded move events, in seconds
pub const DEFAULT_MOVE_INTERVAL: f64 = 0.1;

/// Slack for float timestamp subtraction; Unix-epoch seconds only resolve
/// to about a microsecond, so `t + 0.1 - t` can land just below `0.1`
const MOVE_INTERVAL_EPSILON: f64 = 1e-6;

/// Current Unix time in float seconds
pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Streams pointer events into a capture log
pub struct CaptureWriter<W: Write> {
    writer: csv::Writer<W>,
    move_interval: f64,
    last_move: Option<f64>,
    records: usize,
}

impl CaptureWriter<File> {
    /// Create (or truncate) a capture file at `path`
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ComputeError> {
        let file = File::create(path.as_ref())?;
        debug!("Capturing to {}", path.as_ref().display());
        Self::new(file)
    }

    /// Create a uniquely named `capture-<uuid>.<extension>` file in `dir`
    pub fn create_in(
        dir: impl AsRef<Path>,
        extension: &str,
    ) -> Result<(Self, PathBuf), ComputeError> {
        let name = format!(
            "capture-{}.{}",
            Uuid::new_v4(),
            extension.trim_start_matches('.')
        );
        let path = dir.as_ref().join(name);
        let writer = Self::create(&path)?;
        Ok((writer, path))
    }
}

impl<W: Write> CaptureWriter<W> {
    /// Wrap a sink and write the header row
    pub fn new(sink: W) -> Result<Self, ComputeError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        writer.write_record(RAW_COLUMNS).map_err(csv_write_error)?;

        Ok(Self {
            writer,
            move_interval: DEFAULT_MOVE_INTERVAL,
            last_move: None,
            records: 0,
        })
    }

    /// Override the move throttle (seconds, non-negative)
    pub fn with_move_interval(mut self, seconds: f64) -> Self {
        self.move_interval = seconds.max(0.0);
        self
    }

    /// Number of records written so far (header excluded)
    pub fn records(&self) -> usize {
        self.records
    }

    /// Record a pointer move unless one was written less than the move
    /// interval ago. A move exactly one interval later is written.
    /// Returns whether the row was written.
    pub fn on_move(&mut self, ts: f64, x: f64, y: f64) -> Result<bool, ComputeError> {
        if let Some(last) = self.last_move {
            if ts - last < self.move_interval - MOVE_INTERVAL_EPSILON {
                return Ok(false);
            }
        }

        self.write_record(&RawRecord {
            ts,
            event: EventKind::Move,
            x,
            y,
            button: None,
            action: None,
        })?;
        self.last_move = Some(ts);
        Ok(true)
    }

    /// Record a button press (`pressed = true`) or release
    pub fn on_click(
        &mut self,
        ts: f64,
        x: f64,
        y: f64,
        button: &str,
        pressed: bool,
    ) -> Result<(), ComputeError> {
        self.write_record(&RawRecord {
            ts,
            event: EventKind::Click,
            x,
            y,
            button: Some(button.to_string()),
            action: Some(if pressed { Action::Press } else { Action::Released }),
        })
    }

    /// Record a scroll step as a `delta(dx,dy)` descriptor
    pub fn on_scroll(
        &mut self,
        ts: f64,
        x: f64,
        y: f64,
        dx: i64,
        dy: i64,
    ) -> Result<(), ComputeError> {
        self.write_record(&RawRecord {
            ts,
            event: EventKind::Scroll,
            x,
            y,
            button: Some(format!("delta({},{})", dx, dy)),
            action: None,
        })
    }

    pub fn write_record(&mut self, record: &RawRecord) -> Result<(), ComputeError> {
        self.writer.serialize(record).map_err(csv_write_error)?;
        self.records += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ComputeError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying sink
    pub fn into_inner(self) -> Result<W, ComputeError> {
        self.writer
            .into_inner()
            .map_err(|e| ComputeError::Io(e.into_error()))
    }
}

fn csv_write_error(e: csv::Error) -> ComputeError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => ComputeError::Io(io),
        other => ComputeError::SchemaError(format!("cannot write capture record: {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::read_capture;
    use crate::types::Value;
    use pretty_assertions::assert_eq;

    fn written(writer: CaptureWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_written_on_construction() {
        let writer = CaptureWriter::new(Vec::new()).unwrap();
        assert_eq!(written(writer), "ts,event,x,y,button,action\n");
    }

    #[test]
    fn test_moves_are_throttled() {
        let mut writer = CaptureWriter::new(Vec::new()).unwrap();

        assert!(writer.on_move(10.0, 1.0, 1.0).unwrap());
        assert!(!writer.on_move(10.05, 2.0, 2.0).unwrap());
        assert!(writer.on_move(10.1, 3.0, 3.0).unwrap());
        // Throttle measures from the last written move, not the last attempt
        assert!(!writer.on_move(10.15, 4.0, 4.0).unwrap());
        assert!(writer.on_move(10.25, 5.0, 5.0).unwrap());

        assert_eq!(writer.records(), 3);
    }

    #[test]
    fn test_move_one_interval_later_is_written() {
        let mut writer = CaptureWriter::new(Vec::new()).unwrap();
        let t0 = 1_700_000_000.2;

        assert!(writer.on_move(t0, 0.0, 0.0).unwrap());
        // t0 + 0.1 - t0 rounds below 0.1 at this magnitude
        assert!(writer.on_move(t0 + 0.1, 1.0, 1.0).unwrap());
        assert!(writer.on_move(t0 + 0.2, 2.0, 2.0).unwrap());
        assert!(!writer.on_move(t0 + 0.25, 3.0, 3.0).unwrap());
    }

    #[test]
    fn test_clicks_and_scrolls_are_never_throttled() {
        let mut writer = CaptureWriter::new(Vec::new())
            .unwrap()
            .with_move_interval(1.0);

        writer.on_move(0.0, 0.0, 0.0).unwrap();
        writer.on_click(0.01, 0.0, 0.0, "Button.left", true).unwrap();
        writer.on_scroll(0.02, 0.0, 0.0, 0, -1).unwrap();
        writer.on_click(0.03, 0.0, 0.0, "Button.left", false).unwrap();

        let text = written(writer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].ends_with("Button.left,press"));
        assert!(lines[3].contains("\"delta(0,-1)\""));
        assert!(lines[4].ends_with("Button.left,released"));
    }

    #[test]
    fn test_written_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, path) = CaptureWriter::create_in(dir.path(), ".csv").unwrap();

        writer.on_move(100.0, 10.0, 20.0).unwrap();
        writer.on_scroll(100.2, 10.0, 20.0, 3, -7).unwrap();
        writer.on_click(100.4, 11.0, 21.0, "Button.right", false).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("capture-"));
        assert!(name.ends_with(".csv"));

        let frame = read_capture(&path).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.value(1, "button"), Some(&Value::from("delta(3,-7)")));
        assert_eq!(frame.value(0, "action"), Some(&Value::Null));
        assert_eq!(frame.value(2, "action"), Some(&Value::from("released")));
        assert_eq!(frame.value(2, "x"), Some(&Value::Number(11.0)));
    }

    #[test]
    fn test_now_timestamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(now_timestamp() > 1_577_836_800.0);
    }
}
