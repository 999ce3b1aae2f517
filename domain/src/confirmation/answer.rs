//! Parsing of confirmation and menu answers.

use crate::core::string::{normalize_utterance, to_identifier};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Interpretation of an utterance received while a confirmation is pending.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationAnswer {
    Approve,
    Deny,
    /// Parameter changes; the call stays pending
    Edit(Map<String, Value>),
    Ambiguous,
}

/// Whole answers that approve.
const AFFIRMATIVE: &[&str] = &[
    "yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "confirm", "confirmed", "approve",
    "approved", "proceed", "go ahead", "do it", "please do", "yes please", "absolutely",
    "affirmative", "sounds good", "of course",
];

/// First words that may lead an approval ("yes, do it").
const AFFIRMATIVE_LEADS: &[&str] = &[
    "yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "confirm", "confirmed", "approve",
    "approved", "proceed", "absolutely",
];

/// The only words allowed after an affirmative lead.
const APPROVAL_FILLER: &[&str] = &[
    "please", "do", "it", "go", "ahead", "thanks", "thank", "you", "yes", "sure", "ok", "okay",
    "confirm", "proceed", "now",
];

const NEGATIVE: &[&str] = &[
    "no", "n", "nope", "nah", "cancel", "stop", "don't", "dont", "do not", "abort", "deny",
    "never mind", "nevermind", "no thanks", "negative", "skip", "forget it", "no way", "not now",
    "not yet",
];

/// First words that lead a denial ("nope not now", "not today").
const NEGATIVE_LEADS: &[&str] = &[
    "no", "n", "nope", "nah", "cancel", "stop", "don't", "dont", "abort", "deny", "negative", "skip",
    "not",
];

/// Words that make a leading yes/no ambiguous ("yes but…", "no wait, actually yes").
const HEDGES: &[&str] = &["but", "wait", "actually", "maybe", "unless", "except"];

/// Edit keys that name nothing ("set it to tomorrow").
const PRONOUN_KEYS: &[&str] = &["it", "that", "this", "them", "those", "these", "one"];

static CHANGE_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:change|set|make)\s+(?:the\s+)?([A-Za-z_][\w ]*?)\s+to\s+(.+?)\s*$")
        .expect("valid change-to regex")
});

static EDIT_PAIRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*edit\s+(.+)$").expect("valid edit regex"));

/// Classify an answer to a pending confirmation.
pub fn parse_confirmation_answer(raw: &str) -> ConfirmationAnswer {
    if let Some(edits) = parse_edit(raw) {
        return if edits.is_empty() {
            ConfirmationAnswer::Ambiguous
        } else {
            ConfirmationAnswer::Edit(edits)
        };
    }

    let text = normalize_utterance(raw);
    if text.is_empty() {
        return ConfirmationAnswer::Ambiguous;
    }
    if AFFIRMATIVE.contains(&text.as_str()) {
        return ConfirmationAnswer::Approve;
    }
    if NEGATIVE.contains(&text.as_str()) {
        return ConfirmationAnswer::Deny;
    }

    let words: Vec<&str> = text.split(' ').collect();
    let (first, rest) = match words.split_first() {
        Some((first, rest)) => (*first, rest),
        None => return ConfirmationAnswer::Ambiguous,
    };
    if AFFIRMATIVE_LEADS.contains(&first) && rest.iter().all(|w| APPROVAL_FILLER.contains(w)) {
        return ConfirmationAnswer::Approve;
    }
    if NEGATIVE_LEADS.contains(&first)
        && !rest
            .iter()
            .any(|w| HEDGES.contains(w) || AFFIRMATIVE_LEADS.contains(w))
    {
        return ConfirmationAnswer::Deny;
    }
    ConfirmationAnswer::Ambiguous
}

/// `Some` when the answer is phrased as an edit, even if nothing parsed.
fn parse_edit(raw: &str) -> Option<Map<String, Value>> {
    if let Some(caps) = EDIT_PAIRS.captures(raw) {
        let mut edits = Map::new();
        for pair in caps[1].split(',') {
            if let Some((key, value)) = pair.split_once('=') {
                let key = to_identifier(key);
                let value = value.trim();
                if is_param_key(&key) && !value.is_empty() {
                    edits.insert(key, parse_edit_value(value));
                }
            }
        }
        return Some(edits);
    }

    if let Some(caps) = CHANGE_TO.captures(raw) {
        let mut edits = Map::new();
        let key = to_identifier(&caps[1]);
        if is_param_key(&key) {
            edits.insert(key, parse_edit_value(&caps[2]));
        }
        return Some(edits);
    }

    None
}

fn is_param_key(key: &str) -> bool {
    !key.is_empty() && !PRONOUN_KEYS.contains(&key)
}

fn parse_edit_value(raw: &str) -> Value {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    match trimmed.to_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(trimmed.to_string()),
    }
}

/// Interpretation of an utterance received while a menu is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAnswer {
    /// Zero-based option index
    Choose(usize),
    Cancel,
    /// Not a menu answer; treat as a fresh utterance
    Unrecognized,
}

const MENU_CANCEL: &[&str] = &["0", "cancel", "none", "neither", "never mind", "nevermind", "no", "stop"];
const ORDINALS: &[&str] = &["first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth"];

/// Classify an answer to a numbered menu with the given option labels.
pub fn parse_menu_answer(raw: &str, labels: &[String]) -> MenuAnswer {
    let text = normalize_utterance(raw);
    if MENU_CANCEL.contains(&text.as_str()) {
        return MenuAnswer::Cancel;
    }

    let stripped = ["option ", "number ", "the ", "choice "]
        .iter()
        .fold(text.as_str(), |acc, prefix| acc.strip_prefix(prefix).unwrap_or(acc));
    let stripped = stripped.strip_suffix(" one").unwrap_or(stripped);

    let index = stripped
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .map(|n| n - 1)
        .or_else(|| ORDINALS.iter().position(|o| *o == stripped));
    if let Some(index) = index {
        return if index < labels.len() {
            MenuAnswer::Choose(index)
        } else {
            MenuAnswer::Unrecognized
        };
    }

    let normalized_labels: Vec<String> = labels.iter().map(|l| normalize_utterance(l)).collect();
    if let Some(index) = normalized_labels.iter().position(|l| *l == text) {
        return MenuAnswer::Choose(index);
    }
    if text.len() >= 3 {
        let matches: Vec<usize> = normalized_labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.starts_with(&text))
            .map(|(i, _)| i)
            .collect();
        if let [only] = matches[..] {
            return MenuAnswer::Choose(only);
        }
    }

    MenuAnswer::Unrecognized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmatives() {
        for text in ["yes", "Y", "Sure!", "go ahead", "ok", "yes, do it", "Yep please", "ok go ahead", "yes thanks"] {
            assert_eq!(parse_confirmation_answer(text), ConfirmationAnswer::Approve, "{}", text);
        }
    }

    #[test]
    fn test_negatives() {
        for text in ["no", "N", "cancel", "stop", "Don't", "no thanks", "nope not now", "not now", "Not yet", "not today"] {
            assert_eq!(parse_confirmation_answer(text), ConfirmationAnswer::Deny, "{}", text);
        }
    }

    #[test]
    fn test_ambiguous() {
        for text in [
            "maybe",
            "what's the weather",
            "yes but not now",
            "no wait yes",
            "",
            "hmm",
            "go away",
            "go back",
            "go",
            "correct",
            "correct me first",
            "ok what does that delete",
            "yes what file is that",
            "sure why",
            "okay is that the right one",
            "not sure",
        ] {
            assert_eq!(parse_confirmation_answer(text), ConfirmationAnswer::Ambiguous, "{:?}", text);
        }
    }

    #[test]
    fn test_edit_pairs_preserve_case() {
        let answer = parse_confirmation_answer("edit title=Team Sync, duration=30");
        let ConfirmationAnswer::Edit(edits) = answer else {
            panic!("expected edit");
        };
        assert_eq!(edits["title"], "Team Sync");
        assert_eq!(edits["duration"], 30);
    }

    #[test]
    fn test_change_to_phrase() {
        let ConfirmationAnswer::Edit(edits) = parse_confirmation_answer("change the start time to 3pm") else {
            panic!("expected edit");
        };
        assert_eq!(edits["start_time"], "3pm");
    }

    #[test]
    fn test_pronoun_keys_are_not_edits() {
        assert_eq!(parse_confirmation_answer("set it to tomorrow"), ConfirmationAnswer::Ambiguous);
        assert_eq!(parse_confirmation_answer("change that to 5pm"), ConfirmationAnswer::Ambiguous);
        assert_eq!(parse_confirmation_answer("edit it=tomorrow"), ConfirmationAnswer::Ambiguous);

        let ConfirmationAnswer::Edit(edits) = parse_confirmation_answer("edit it=x, title=Review") else {
            panic!("expected edit");
        };
        assert!(!edits.contains_key("it"));
        assert_eq!(edits["title"], "Review");
    }

    #[test]
    fn test_edit_without_pairs_is_ambiguous() {
        assert_eq!(parse_confirmation_answer("edit something"), ConfirmationAnswer::Ambiguous);
    }

    fn labels() -> Vec<String> {
        vec!["list events".to_string(), "read inbox".to_string()]
    }

    #[test]
    fn test_menu_numbers_and_ordinals() {
        assert_eq!(parse_menu_answer("2", &labels()), MenuAnswer::Choose(1));
        assert_eq!(parse_menu_answer("option 1", &labels()), MenuAnswer::Choose(0));
        assert_eq!(parse_menu_answer("the second one", &labels()), MenuAnswer::Choose(1));
        assert_eq!(parse_menu_answer("7", &labels()), MenuAnswer::Unrecognized);
    }

    #[test]
    fn test_menu_labels_and_cancel() {
        assert_eq!(parse_menu_answer("Read inbox", &labels()), MenuAnswer::Choose(1));
        assert_eq!(parse_menu_answer("list", &labels()), MenuAnswer::Choose(0));
        assert_eq!(parse_menu_answer("0", &labels()), MenuAnswer::Cancel);
        assert_eq!(parse_menu_answer("cancel", &labels()), MenuAnswer::Cancel);
        assert_eq!(
            parse_menu_answer("actually delete my 3pm meeting", &labels()),
            MenuAnswer::Unrecognized
        );
    }
}
