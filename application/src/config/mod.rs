//! Application-level configuration.
//!
//! - [`EngineParams`] — timeouts, retry policy, breaker tuning and thresholds

pub mod engine_params;

pub use engine_params::{EngineParams, FinalizeParams, RouterParams, ToolParams};
