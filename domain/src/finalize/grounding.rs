//! "No new facts" guard for generated replies.
//!
//! Extracts checkable entities from a reply (emails, URLs, times, numbers
//! of two or more digits, capitalized names not at a sentence start) and
//! requires each to appear, case-insensitively, in at least one source:
//! tool results, the dialog summary, or the current utterance.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)[^\s<>()]+").expect("valid url regex"));

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}(?::\d{2})?\s?(?:am|pm)\b|\b\d{1,2}:\d{2}\b").expect("valid time regex")
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2,}\b").expect("valid number regex"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)*\b").expect("valid name regex"));

/// Capitalized words that are not entities.
const NON_ENTITIES: &[&str] = &[
    "I", "OK", "Ok", "Okay", "Yes", "No", "Sure", "Hello", "Hi", "Hey", "Done", "Sorry", "Thanks",
    "Please", "Here", "There", "You", "Your", "The", "It", "This", "That", "AM", "PM",
];

/// Outcome of a grounding check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundingCheck {
    /// Entities found in the reply but in none of the sources
    pub ungrounded: Vec<String>,
}

impl GroundingCheck {
    pub fn is_grounded(&self) -> bool {
        self.ungrounded.is_empty()
    }
}

/// Extract the checkable entities of a text.
pub fn extract_entities(text: &str) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    let mut push = |e: &str| {
        let e = e.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"']);
        if !e.is_empty() && !entities.iter().any(|x| x == e) {
            entities.push(e.to_string());
        }
    };

    for m in EMAIL_RE.find_iter(text) {
        push(m.as_str());
    }
    for m in URL_RE.find_iter(text) {
        push(m.as_str());
    }
    for m in TIME_RE.find_iter(text) {
        push(m.as_str());
    }
    for m in NUMBER_RE.find_iter(text) {
        push(m.as_str());
    }
    for m in NAME_RE.find_iter(text) {
        let words: Vec<&str> = m
            .as_str()
            .split_whitespace()
            .filter(|w| !NON_ENTITIES.contains(w))
            .collect();
        let skip_first = at_sentence_start(text, m.start()) && m.as_str().starts_with(words.first().copied().unwrap_or(""));
        let kept = if skip_first { &words[1.min(words.len())..] } else { &words[..] };
        if !kept.is_empty() {
            push(&kept.join(" "));
        }
    }
    entities
}

fn at_sentence_start(text: &str, offset: usize) -> bool {
    let before = text[..offset].trim_end_matches([' ', '\t', '"', '\'', '*', '-']);
    before.is_empty() || before.ends_with(['.', '!', '?', ':', '\n'])
}

/// Check every entity of `reply` against the sources.
pub fn check_grounding(reply: &str, sources: &[&str]) -> GroundingCheck {
    let haystack: Vec<String> = sources.iter().map(|s| s.to_lowercase()).collect();
    let ungrounded = extract_entities(reply)
        .into_iter()
        .filter(|entity| {
            let needle = entity.to_lowercase();
            !haystack.iter().any(|source| source.contains(&needle))
        })
        .collect();
    GroundingCheck { ungrounded }
}
