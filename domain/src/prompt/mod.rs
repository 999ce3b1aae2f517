//! Prompt domain
//!
//! Text templates for the two backend-facing stages: routing (plus its
//! repair pass) and reply finalization.

mod finalize;
mod router;

pub use finalize::FinalizePromptTemplate;
pub use router::{RouterContext, RouterPromptTemplate};
