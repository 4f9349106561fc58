//! neuromine-common: Shared errors, confidence labels and the HTTP client
//! used across all Neuromine crates.

pub mod error;
pub mod confidence;
pub mod sandbox;

pub use confidence::ConfidenceLabel;
pub use error::{NeuromineError, Result};
