//! Session domain entities

use super::summary::DialogSummary;
use crate::confirmation::ConfirmationRequest;
use crate::core::error::DomainError;
use crate::plan::Plan;
use crate::tool::{ToolCall, ToolCallId};
use serde::{Deserialize, Serialize};

/// Conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of the per-session orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorPhase {
    Idle,
    AwaitingClassification,
    AwaitingConfirmation,
    AwaitingMenuChoice,
    Executing,
    Finalizing,
}

impl OrchestratorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestratorPhase::Idle => "idle",
            OrchestratorPhase::AwaitingClassification => "awaiting_classification",
            OrchestratorPhase::AwaitingConfirmation => "awaiting_confirmation",
            OrchestratorPhase::AwaitingMenuChoice => "awaiting_menu_choice",
            OrchestratorPhase::Executing => "executing",
            OrchestratorPhase::Finalizing => "finalizing",
        }
    }
}

impl std::fmt::Display for OrchestratorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a plan stopped when it hit a confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanContinuation {
    pub plan: Plan,
    /// Utterance that produced the plan
    pub utterance: String,
    /// Calls after the halted one, in plan order
    pub remaining: Vec<ToolCall>,
    /// Calls already resolved this plan, in plan order
    pub finished: Vec<ToolCall>,
}

/// The outstanding confirmation plus how to resume the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub request: ConfirmationRequest,
    pub continuation: PlanContinuation,
}

/// One entry of a disambiguation menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuOption {
    pub label: String,
    pub plan: Plan,
}

/// A numbered menu waiting for a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMenu {
    pub prompt: String,
    pub options: Vec<MenuOption>,
    pub utterance: String,
}

impl PendingMenu {
    pub fn new(options: Vec<MenuOption>, utterance: impl Into<String>) -> Self {
        let mut prompt = String::from("Did you mean:");
        for (i, option) in options.iter().enumerate() {
            prompt.push_str(&format!("\n  {}. {}", i + 1, option.label));
        }
        prompt.push_str("\nReply with a number, or 0 to cancel.");
        Self {
            prompt,
            options,
            utterance: utterance.into(),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }
}

/// Per-conversation state owned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    pub phase: OrchestratorPhase,
    pending_confirmation: Option<PendingConfirmation>,
    pending_menu: Option<PendingMenu>,
    pub summary: DialogSummary,
    pub turn_count: u64,
    next_call_seq: u64,
}

impl SessionState {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            phase: OrchestratorPhase::Idle,
            pending_confirmation: None,
            pending_menu: None,
            summary: DialogSummary::default(),
            turn_count: 0,
            next_call_seq: 0,
        }
    }

    pub fn begin_turn(&mut self) -> u64 {
        self.turn_count += 1;
        self.turn_count
    }

    /// Allocate a session-unique call id.
    pub fn next_call_id(&mut self) -> ToolCallId {
        self.next_call_seq += 1;
        ToolCallId::new(format!("{}-c{}", self.id, self.next_call_seq))
    }

    // ==================== Pending confirmation ====================

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending_confirmation.as_ref()
    }

    pub fn pending_confirmation_mut(&mut self) -> Option<&mut PendingConfirmation> {
        self.pending_confirmation.as_mut()
    }

    /// Store the outstanding confirmation. Fails if one is already
    /// outstanding; a pending menu is dropped because confirmation wins.
    pub fn set_pending_confirmation(&mut self, pending: PendingConfirmation) -> Result<(), DomainError> {
        if self.pending_confirmation.is_some() {
            return Err(DomainError::ConfirmationOutstanding);
        }
        self.pending_menu = None;
        self.pending_confirmation = Some(pending);
        self.phase = OrchestratorPhase::AwaitingConfirmation;
        Ok(())
    }

    pub fn take_pending_confirmation(&mut self) -> Option<PendingConfirmation> {
        self.pending_confirmation.take()
    }

    // ==================== Pending menu ====================

    pub fn pending_menu(&self) -> Option<&PendingMenu> {
        self.pending_menu.as_ref()
    }

    pub fn set_pending_menu(&mut self, menu: PendingMenu) -> Result<(), DomainError> {
        if self.pending_confirmation.is_some() {
            return Err(DomainError::ConfirmationOutstanding);
        }
        self.pending_menu = Some(menu);
        self.phase = OrchestratorPhase::AwaitingMenuChoice;
        Ok(())
    }

    pub fn take_pending_menu(&mut self) -> Option<PendingMenu> {
        self.pending_menu.take()
    }

    /// Phase to rest in between turns.
    pub fn resting_phase(&self) -> OrchestratorPhase {
        if self.pending_confirmation.is_some() {
            OrchestratorPhase::AwaitingConfirmation
        } else if self.pending_menu.is_some() {
            OrchestratorPhase::AwaitingMenuChoice
        } else {
            OrchestratorPhase::Idle
        }
    }
}
