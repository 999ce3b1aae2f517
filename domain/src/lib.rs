//! Domain layer for steward
//!
//! This crate contains the core decision logic of the request orchestration
//! engine. It performs no I/O: every function is deterministic given its
//! inputs (time is always passed in).
//!
//! # Core Concepts
//!
//! ## Plan
//!
//! Every utterance becomes a [`Plan`]: a route, an intent, slots and an
//! ordered tool plan. Backend output is untrusted text and only becomes a
//! plan through [`validate_plan_output`], which repairs what it can and
//! degrades to the `unknown` sentinel otherwise.
//!
//! ## Confirmation firewall
//!
//! ```text
//! effective = declared OR risk == destructive OR (risk == moderate AND confirm_moderate)
//! ```
//!
//! The only executable form of a call is a [`ClearedCall`], which can only be
//! obtained from [`ConfirmationFirewall::gate`] or by approving a
//! [`ConfirmationRequest`].
//!
//! ## Quality gate
//!
//! `score = 0.35·complexity + 0.45·writing_need + 0.20·residual_risk`
//! picks the finalization [`Tier`]: quality, fast or draft.

pub mod confirmation;
pub mod core;
pub mod finalize;
pub mod plan;
pub mod prompt;
pub mod quality;
pub mod routing;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use confirmation::{
    ClearedCall, ConfirmationAnswer, ConfirmationFirewall, ConfirmationPolicy, ConfirmationRequest, Decision,
    FirewallVerdict, Gate, MenuAnswer, parse_confirmation_answer, parse_menu_answer,
};
pub use core::error::DomainError;
pub use finalize::{GroundingCheck, check_grounding, failure_notices, render_draft};
pub use plan::{Plan, PlanSource, PlannedCall, RepairReport, Route, ValidatedPlan, validate_plan_output};
pub use prompt::{FinalizePromptTemplate, RouterContext, RouterPromptTemplate};
pub use quality::{Assessment, QualityGate, QualityScore, QualityThresholds, Tier};
pub use routing::{FastPathClassifier, FastPathOutcome};
pub use session::{
    DialogSummary, MenuOption, OrchestratorPhase, PendingConfirmation, PendingMenu, PlanContinuation,
    SNAPSHOT_VERSION, SessionId, SessionSnapshot, SessionState, SummaryBudget, Turn,
};
pub use tool::{
    Admission, BreakerPolicy, BreakerState, CallStatus, CircuitBreaker, DefaultToolValidator, ErrorKind,
    RiskLevel, RiskRegistry, ToolCall, ToolCallId, ToolDefinition, ToolError, ToolParameter, ToolResult,
    ToolResultMetadata, ToolValidator,
};
