//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — truncation, utterance normalization and fuzzy matching helpers

pub mod error;
pub mod string;
