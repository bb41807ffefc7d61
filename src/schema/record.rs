//! Raw capture record definition
//!
//! One row of a capture log, exactly as the capture listener writes it:
//!
//! ```text
//! ts,event,x,y,button,action
//! 1700000000.125,move,512,300,,
//! 1700000000.250,click,512,300,Button.left,press
//! 1700000000.400,scroll,512,300,delta(0,-1),
//! ```

use crate::error::ComputeError;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Timestamp column (float Unix seconds)
pub const TS_COLUMN: &str = "ts";
/// Event kind column
pub const EVENT_COLUMN: &str = "event";
pub const X_COLUMN: &str = "x";
pub const Y_COLUMN: &str = "y";
/// Button name or delta descriptor column
pub const BUTTON_COLUMN: &str = "button";
/// Press/release column
pub const ACTION_COLUMN: &str = "action";

/// Header of every capture file, in file order
pub const RAW_COLUMNS: [&str; 6] = [
    TS_COLUMN,
    EVENT_COLUMN,
    X_COLUMN,
    Y_COLUMN,
    BUTTON_COLUMN,
    ACTION_COLUMN,
];

/// Kind of pointer event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Move,
    Click,
    Scroll,
    /// Kept verbatim so encoding can ignore it instead of failing the load
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Move => "move",
            EventKind::Click => "click",
            EventKind::Scroll => "scroll",
            EventKind::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "move" => EventKind::Move,
            "click" => EventKind::Click,
            "scroll" => EventKind::Scroll,
            _ => EventKind::Other(s),
        }
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Button action recorded with click events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Press,
    Released,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Press => "press",
            Action::Released => "released",
            Action::Other(name) => name.as_str(),
        }
    }

    /// Whether this action closes a gesture path
    pub fn is_release(&self) -> bool {
        matches!(self, Action::Released)
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        match s.as_str() {
            "press" => Action::Press,
            "released" => Action::Released,
            _ => Action::Other(s),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

/// One logged pointer event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Capture time (Unix seconds)
    pub ts: f64,
    /// Event kind
    pub event: EventKind,
    /// Pointer x coordinate
    pub x: f64,
    /// Pointer y coordinate
    pub y: f64,
    /// Button name (`Button.left`), delta descriptor (`delta(0,-1)`) or empty
    pub button: Option<String>,
    /// `press`, `released` or empty
    pub action: Option<Action>,
}

impl RawRecord {
    /// Cells in [`RAW_COLUMNS`] order
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Number(self.ts),
            Value::Text(self.event.as_str().to_string()),
            Value::Number(self.x),
            Value::Number(self.y),
            Value::from(self.button.clone()),
            Value::from(self.action.as_ref().map(|a| a.as_str().to_string())),
        ]
    }
}

/// Check that a capture header carries exactly the raw column set
pub fn validate_header<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<(), ComputeError> {
    let found: BTreeSet<&str> = headers.into_iter().map(str::trim).collect();
    let expected: BTreeSet<&str> = RAW_COLUMNS.iter().copied().collect();

    if found == expected {
        return Ok(());
    }

    let missing: Vec<&str> = expected.difference(&found).copied().collect();
    let unexpected: Vec<&str> = found.difference(&expected).copied().collect();
    Err(ComputeError::SchemaError(format!(
        "capture header must be {:?}; missing {:?}, unexpected {:?}",
        RAW_COLUMNS, missing, unexpected
    )))
}
