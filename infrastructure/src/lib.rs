//! Infrastructure layer for steward
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backends;
pub mod config;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use backends::build_backend;
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileConfig, build_risk_registry,
};
pub use logging::JsonlAuditSink;
pub use tools::{ToolRegistry, builtin_registry};
