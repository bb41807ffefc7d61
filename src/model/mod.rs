//! Sequence models consuming path tensors
//!
//! Forward passes only: there is no training loop here. Weights come from a
//! seeded initializer or from the caller.

mod gru;

pub use gru::Gru;
