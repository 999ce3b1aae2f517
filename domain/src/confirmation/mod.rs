//! Confirmation domain
//!
//! - [`firewall`] — the OR rule and the [`ClearedCall`] token
//! - [`entities`] — [`ConfirmationRequest`] lifecycle (approve, deny, edit, expiry)
//! - [`answer`] — interpreting yes / no / edit and menu answers

pub mod answer;
pub mod entities;
pub mod firewall;

pub use answer::{ConfirmationAnswer, MenuAnswer, parse_confirmation_answer, parse_menu_answer};
pub use entities::{ConfirmationRequest, Decision, confirmation_prompt};
pub use firewall::{
    ClearedCall, ConfirmationFirewall, ConfirmationPolicy, FirewallVerdict, Gate, requires_confirmation,
};
