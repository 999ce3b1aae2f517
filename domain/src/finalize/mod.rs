//! Reply finalization helpers: draft templates and the grounding guard.

pub mod grounding;
pub mod template;

pub use grounding::{GroundingCheck, check_grounding, extract_entities};
pub use template::{failure_notices, render_draft};
