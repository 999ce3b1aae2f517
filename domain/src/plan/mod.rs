//! Plan domain
//!
//! A [`Plan`] is the structured decision derived from one utterance: a
//! [`Route`], an intent from that route's catalog, slots, and an ordered
//! list of [`PlannedCall`]s. Plans come from the fast path or from the
//! router backend; the latter always pass through
//! [`validate_plan_output`](parser::validate_plan_output) first and are
//! never mutated afterwards.

pub mod entities;
pub mod parser;

pub use entities::{Plan, PlanSource, PlannedCall, Route};
pub use parser::{RepairReport, ValidatedPlan, validate_plan_output};
