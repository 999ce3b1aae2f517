//! Type definitions for the turn handler.

use crate::ports::generation::GenerationBackend;
use crate::ports::audit_sink::AuditSink;
use crate::ports::tool_catalog::ToolCatalog;
use crate::state::{CircuitBreakers, SharedRiskRegistry};
use std::sync::Arc;
use steward_domain::plan::Route;
use steward_domain::quality::Tier;
use steward_domain::session::OrchestratorPhase;
use steward_domain::tool::ToolCall;
use steward_domain::DomainError;
use thiserror::Error;

/// Errors from the turn handler.
///
/// Ordinary failures (backend down, tool errors, malformed output) never
/// surface here; they are folded into the reply. Only broken session
/// invariants and snapshot problems do.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Session invariant violated: {0}")]
    Domain(#[from] DomainError),

    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

/// What kind of reply the turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Final answer for the request
    Answer,
    /// A tool call is waiting for yes / no / edit
    ConfirmationPrompt,
    /// The previous answer was ambiguous; same question again
    Reprompt,
    /// A numbered disambiguation menu
    MenuPrompt,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Answer => "answer",
            ReplyKind::ConfirmationPrompt => "confirmation_prompt",
            ReplyKind::Reprompt => "reprompt",
            ReplyKind::MenuPrompt => "menu_prompt",
        }
    }

    /// The session is waiting on the user after this reply
    pub fn awaits_user(&self) -> bool {
        !matches!(self, ReplyKind::Answer)
    }
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub kind: ReplyKind,
    /// Phase the session rests in after the turn
    pub phase: OrchestratorPhase,
    pub turn: u64,
    pub route: Option<Route>,
    pub intent: Option<String>,
    /// Finalization tier actually used (answers only)
    pub tier: Option<Tier>,
    /// Calls of the current plan resolved so far, in plan order
    pub calls: Vec<ToolCall>,
}

/// Collaborators of the orchestrator.
pub struct OrchestratorDeps {
    pub fast_backend: Arc<dyn GenerationBackend>,
    pub quality_backend: Arc<dyn GenerationBackend>,
    pub catalog: Arc<dyn ToolCatalog>,
    pub audit: Arc<dyn AuditSink>,
    pub risk: Arc<SharedRiskRegistry>,
    pub breakers: Arc<CircuitBreakers>,
}
