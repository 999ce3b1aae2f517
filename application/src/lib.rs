//! Application layer for steward
//!
//! This crate contains the turn orchestrator, its use cases, port
//! definitions and engine parameters. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod state;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{EngineParams, FinalizeParams, RouterParams, ToolParams};
pub use ports::{
    audit_sink::{AuditEvent, AuditSink, NoAuditSink},
    generation::{BackendError, GenerationBackend, GenerationRequest, UnavailableBackend},
    tool_catalog::{Tool, ToolCatalog},
};
pub use state::{CircuitBreakers, SharedRiskRegistry};
pub use use_cases::execute_tool::ToolExecutionEngine;
pub use use_cases::finalize::{FinalizationDispatcher, Finalized, RejectReason};
pub use use_cases::handle_turn::{Orchestrator, OrchestratorDeps, ReplyKind, TurnError, TurnOutcome};
pub use use_cases::route_intent::{IntentRouter, RoutedPlan};
