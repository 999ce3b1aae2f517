//! Rolling dialog summary.
//!
//! Each finished turn contributes one PII-filtered line. The oldest lines
//! are evicted once either the entry budget or the character budget is
//! exceeded.

use crate::core::string::truncate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::LazyLock;

/// Email addresses
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex"));

/// Payment card numbers
static CARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").expect("valid card regex"));

/// Phone numbers (various formats)
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("valid phone regex")
});

/// Replace emails, card numbers and phone numbers with placeholders.
pub fn redact_pii(text: &str) -> String {
    let text = CARD_RE.replace_all(text, "[card]");
    let text = PHONE_RE.replace_all(&text, "[phone]");
    EMAIL_RE.replace_all(&text, "[email]").into_owned()
}

/// Summary size limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryBudget {
    pub max_entries: usize,
    pub max_chars: usize,
    /// Per-line limit
    pub max_digest_chars: usize,
}

impl Default for SummaryBudget {
    fn default() -> Self {
        Self {
            max_entries: 8,
            max_chars: 1200,
            max_digest_chars: 160,
        }
    }
}

/// Bounded, ordered list of turn digests (oldest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogSummary {
    entries: VecDeque<String>,
}

impl DialogSummary {
    /// Append a digest, redacting and bounding it, then evict to budget.
    pub fn push(&mut self, digest: &str, budget: &SummaryBudget) {
        let line = truncate(&redact_pii(&single_line(digest)), budget.max_digest_chars);
        if line.is_empty() {
            return;
        }
        self.entries.push_back(line);
        while self.entries.len() > budget.max_entries || (self.char_count() > budget.max_chars && self.entries.len() > 1) {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.entries.iter().map(|e| e.chars().count()).sum()
    }

    /// Text block for prompts.
    pub fn as_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
