//! Tool domain module
//!
//! How the engine describes, classifies and tracks tool invocations.
//!
//! ```text
//! PlannedCall ──resolve──▶ ToolCall ──firewall──▶ ClearedCall ──execute──▶ ToolResult
//!                            │
//!                            └─ risk: RiskRegistry::classify(name)
//! ```
//!
//! # Risk tags
//!
//! Risk is registry metadata, never a property the tool or the model
//! declares about itself:
//!
//! | Risk | Examples | Confirmation |
//! |------|----------|--------------|
//! | **Safe** | `calendar.list_events`, `fs.read_file` | no |
//! | **Moderate** | `calendar.create_event`, `fs.write_file`, anything unregistered | when `confirm_moderate` |
//! | **Destructive** | `calendar.delete_event`, `mail.send_email`, `terminal.*` | always |
//!
//! # Key Types
//!
//! - [`RiskRegistry`] — exact and wildcard name → risk mapping
//! - [`ToolCall`] — runtime call with id, risk, status and retry count
//! - [`ToolResult`] / [`ToolError`] — result envelope with a `retryable` flag
//! - [`CircuitBreaker`] — per-dependency failure isolation state
//! - [`ToolValidator`] — parameter validation against a [`ToolDefinition`]

pub mod breaker;
pub mod entities;
pub mod registry;
pub mod traits;
pub mod value_objects;

pub use breaker::{Admission, BreakerPolicy, BreakerState, CircuitBreaker};
pub use entities::{
    CallStatus, RiskLevel, ToolCall, ToolCallId, ToolDefinition, ToolParameter, tool_class,
};
pub use registry::RiskRegistry;
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ErrorKind, ToolError, ToolResult, ToolResultMetadata};
