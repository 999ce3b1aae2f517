//! Quality gate for choosing the finalization tier.

pub mod gate;

pub use gate::{Assessment, QualityGate, QualityScore, QualityThresholds, Tier};
