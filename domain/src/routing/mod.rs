//! Pre-router classification.

pub mod fast_path;

pub use fast_path::{FastPathClassifier, FastPathOutcome};
