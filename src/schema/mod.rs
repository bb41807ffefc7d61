//! Capture log schema
//!
//! This module defines the data-source contract for pointer capture files
//! (`ts, event, x, y, button, action`) and the canonical output column schema
//! every wrangled path is reshaped into.

mod columns;
mod record;

pub use columns::*;
pub use record::*;
