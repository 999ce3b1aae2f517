//! Session domain.
//!
//! - [`entities::SessionState`] — pending confirmation / menu, phase, counters
//! - [`summary::DialogSummary`] — bounded, PII-filtered rolling summary
//! - [`turn::Turn`] — one received utterance
//! - [`snapshot::SessionSnapshot`] — versioned JSON form of the state

pub mod entities;
pub mod snapshot;
pub mod summary;
pub mod turn;

pub use entities::{
    MenuOption, OrchestratorPhase, PendingConfirmation, PendingMenu, PlanContinuation, SessionId,
    SessionState,
};
pub use snapshot::{SNAPSHOT_VERSION, SessionSnapshot};
pub use summary::{DialogSummary, SummaryBudget, redact_pii};
pub use turn::Turn;
