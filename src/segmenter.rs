//! Gesture path segmentation
//!
//! Splits one capture's raw records into ordered gesture paths at `released`
//! action boundaries.

use crate::error::ComputeError;
use crate::schema::{Action, ACTION_COLUMN};
use crate::types::Frame;
use tracing::debug;

/// Splits a capture frame into gesture paths.
///
/// With release rows `r_0 < r_1 < … < r_{k-1}` the output is `k - 1` paths:
///
/// - the first path is rows `[0, r_1]`, i.e. it runs through the *second*
///   release and so always absorbs two releases' worth of rows;
/// - every following path is `(r_i, r_{i+1}]` for `i = 1 .. k-2`.
///
/// Rows after the last release are dropped as an incomplete gesture. The
/// first-path rule is kept for compatibility with existing training data and is
/// not merged into the general case.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSegmenter;

impl PathSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Segment a capture into paths
    pub fn segment(&self, frame: &Frame) -> Result<Vec<Frame>, ComputeError> {
        let releases = release_indices(frame)?;

        if releases.len() < 2 {
            return Err(ComputeError::SegmentationError(format!(
                "need at least 2 release events to segment, found {}",
                releases.len()
            )));
        }

        let mut paths = Vec::with_capacity(releases.len() - 1);
        paths.push(frame.slice(0, releases[1] + 1));

        for pair in releases[1..].windows(2) {
            paths.push(frame.slice(pair[0] + 1, pair[1] + 1));
        }

        let trailing = frame.len() - (releases[releases.len() - 1] + 1);
        debug!(
            "Segmented {} records into {} paths ({} trailing records dropped)",
            frame.len(),
            paths.len(),
            trailing
        );

        Ok(paths)
    }
}

/// Row positions whose action is `released`
pub fn release_indices(frame: &Frame) -> Result<Vec<usize>, ComputeError> {
    let column = frame.column(ACTION_COLUMN).ok_or_else(|| {
        ComputeError::SchemaError(format!(
            "cannot segment without an '{}' column",
            ACTION_COLUMN
        ))
    })?;

    Ok(column
        .enumerate()
        .filter(|(_, v)| {
            v.as_str()
                .is_some_and(|s| Action::from(s.to_string()).is_release())
        })
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RAW_COLUMNS;
    use crate::types::Value;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Build a raw frame whose timestamps equal the row index
    fn frame_with_actions(actions: &[Option<&str>]) -> Frame {
        let rows = actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                vec![
                    Value::Number(i as f64),
                    Value::from("move"),
                    Value::Number(0.0),
                    Value::Number(0.0),
                    Value::Null,
                    Value::from(action.map(str::to_string)),
                ]
            })
            .collect();
        Frame::from_rows(RAW_COLUMNS, rows).unwrap()
    }

    fn timestamps(frame: &Frame) -> Vec<f64> {
        frame
            .column("ts")
            .unwrap()
            .filter_map(Value::as_f64)
            .collect()
    }

    #[test]
    fn test_seven_row_scenario() {
        let frame = frame_with_actions(&[
            None,
            None,
            Some("released"),
            None,
            Some("released"),
            None,
            Some("released"),
        ]);

        let paths = PathSegmenter::new().segment(&frame).unwrap();

        assert_eq!(paths.len(), 2);
        assert_eq!(timestamps(&paths[0]), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(timestamps(&paths[1]), vec![5.0, 6.0]);
    }

    #[test]
    fn test_trailing_rows_dropped() {
        let frame = frame_with_actions(&[
            Some("press"),
            Some("released"),
            Some("press"),
            Some("released"),
            None,
            None,
        ]);

        let paths = PathSegmenter::new().segment(&frame).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(timestamps(&paths[0]), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_fewer_than_two_releases_fails() {
        let none = frame_with_actions(&[None, Some("press"), None]);
        let one = frame_with_actions(&[None, Some("released"), None]);

        for frame in [none, one] {
            let result = PathSegmenter::new().segment(&frame);
            assert!(matches!(result, Err(ComputeError::SegmentationError(_))));
        }
    }

    #[test]
    fn test_missing_action_column_is_schema_error() {
        let frame = Frame::new(["ts", "x"]);
        let result = PathSegmenter::new().segment(&frame);
        assert!(matches!(result, Err(ComputeError::SchemaError(_))));
    }

    #[test]
    fn test_only_exact_release_action_is_a_boundary() {
        let frame = frame_with_actions(&[
            Some("release"),
            Some("released"),
            Some("press"),
            Some("Released"),
            Some("released"),
        ]);

        assert_eq!(release_indices(&frame).unwrap(), vec![1, 4]);
    }

    #[test]
    fn test_adjacent_releases_yield_single_row_paths() {
        let frame = frame_with_actions(&[
            Some("released"),
            Some("released"),
            Some("released"),
            Some("released"),
        ]);

        let paths = PathSegmenter::new().segment(&frame).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(timestamps(&paths[0]), vec![0.0, 1.0]);
        assert_eq!(timestamps(&paths[1]), vec![2.0]);
        assert_eq!(timestamps(&paths[2]), vec![3.0]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_path_count_and_first_span(
            flags in proptest::collection::vec(any::<bool>(), 0..60),
        ) {
            let actions: Vec<Option<&str>> = flags
                .iter()
                .map(|&released| if released { Some("released") } else { None })
                .collect();
            let frame = frame_with_actions(&actions);
            let releases = release_indices(&frame).unwrap();
            let result = PathSegmenter::new().segment(&frame);

            if releases.len() < 2 {
                prop_assert!(result.is_err());
            } else {
                let paths = result.unwrap();
                prop_assert_eq!(paths.len(), releases.len() - 1);
                prop_assert_eq!(paths[0].len(), releases[1] + 1);

                // Paths tile rows 0..=r_last exactly once, in order
                let covered: Vec<f64> = paths.iter().flat_map(timestamps).collect();
                let expected: Vec<f64> = (0..=releases[releases.len() - 1])
                    .map(|i| i as f64)
                    .collect();
                prop_assert_eq!(covered, expected);
            }
        }
    }
}
