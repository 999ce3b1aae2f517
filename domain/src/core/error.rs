//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid risk level: {0}")]
    InvalidRiskLevel(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error("Invalid quality thresholds: {0}")]
    InvalidThresholds(String),

    #[error("A confirmation is already outstanding for this session")]
    ConfirmationOutstanding,

    #[error("Unsupported session snapshot version: {0}")]
    UnsupportedSnapshotVersion(u32),

    #[error("Session snapshot error: {0}")]
    Snapshot(String),
}

impl DomainError {
    /// Check if this error is a session invariant violation
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, DomainError::ConfirmationOutstanding)
    }
}
