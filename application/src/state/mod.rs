//! Process-wide mutable state shared by all sessions.
//!
//! Limited to two structures: circuit breakers and the risk registry
//! snapshot. Everything else is per session.

pub mod breakers;
pub mod risk;

pub use breakers::CircuitBreakers;
pub use risk::SharedRiskRegistry;
