//! Use cases
//!
//! - [`route_intent`] — utterance to validated plan via the fast backend
//! - [`execute_tool`] — timeouts, retries and breakers around one call
//! - [`finalize`] — tiered reply generation with the grounding guard
//! - [`handle_turn`] — the per-session state machine tying them together

pub mod execute_tool;
pub mod finalize;
pub mod handle_turn;
pub mod route_intent;
