//! Fast-path classifier: keyword shortcuts that bypass the router.
//!
//! Only trivial utterances are handled here (greetings, farewells, thanks,
//! time/date/help questions). Anything longer than [`MAX_FAST_PATH_CHARS`]
//! is never matched, so the work per utterance is bounded. Fast-path plans
//! never carry tool calls and therefore never ask for confirmation.

use crate::plan::{Plan, PlanSource, Route};

/// Normalized utterances longer than this go straight to the router.
pub const MAX_FAST_PATH_CHARS: usize = 64;

/// Outcome of the fast-path check.
#[derive(Debug, Clone, PartialEq)]
pub enum FastPathOutcome {
    /// The utterance is fully handled by this plan
    Terminal(Plan),
    /// Ask the router; the hint is a low-confidence route guess
    Continue { hint: Option<Route> },
}

const GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "hiya", "howdy", "yo", "greetings", "good morning", "good afternoon",
    "good evening", "morning", "evening",
];

const FAREWELLS: &[&str] = &[
    "bye", "goodbye", "good bye", "bye bye", "see you", "see ya", "see you later", "good night",
    "later", "farewell", "cya",
];

const THANKS: &[&str] = &[
    "thanks", "thank you", "thx", "ty", "cheers", "thanks a lot", "thank you so much", "much appreciated",
];

/// Words allowed around a greeting/farewell/thanks without changing its meaning.
const FILLERS: &[&str] = &[
    "there", "steward", "buddy", "friend", "again", "all", "everyone", "so", "very", "much",
    "mate", "you", "too", "then", "for", "now", "oh", "ok", "okay", "please",
];

const TIME_QUERIES: &[&str] = &[
    "what time is it",
    "what's the time",
    "whats the time",
    "what is the time",
    "time please",
    "current time",
    "tell me the time",
    "do you have the time",
];

const DATE_QUERIES: &[&str] = &[
    "what's the date",
    "whats the date",
    "what is the date",
    "what day is it",
    "what day is today",
    "what's today's date",
    "what is today's date",
    "today's date",
    "current date",
    "what's the date today",
];

const HELP_QUERIES: &[&str] = &["help", "what can you do", "how do you work", "commands", "show help"];

/// Keyword → route hints for utterances the fast path does not finish.
const HINTS: &[(&str, Route)] = &[
    ("meeting", Route::Calendar),
    ("calendar", Route::Calendar),
    ("appointment", Route::Calendar),
    ("schedule", Route::Calendar),
    ("email", Route::Mail),
    ("mail", Route::Mail),
    ("inbox", Route::Mail),
    ("website", Route::Browser),
    ("browser", Route::Browser),
    ("google", Route::Browser),
    ("file", Route::Filesystem),
    ("folder", Route::Filesystem),
    ("directory", Route::Filesystem),
    ("terminal", Route::Terminal),
    ("command", Route::Terminal),
    ("shell", Route::Terminal),
];

/// Stateless keyword classifier.
#[derive(Debug, Clone, Default)]
pub struct FastPathClassifier;

impl FastPathClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a normalized utterance.
    pub fn classify(&self, normalized: &str) -> FastPathOutcome {
        let text = normalized.trim();
        if text.is_empty() || text.chars().count() > MAX_FAST_PATH_CHARS {
            return FastPathOutcome::Continue { hint: None };
        }

        if let Some(plan) = self.match_terminal(text) {
            return FastPathOutcome::Terminal(plan.with_source(PlanSource::FastPath));
        }

        FastPathOutcome::Continue {
            hint: route_hint(text),
        }
    }

    fn match_terminal(&self, text: &str) -> Option<Plan> {
        if TIME_QUERIES.contains(&text) {
            return Some(Plan::new(Route::System, "time_query"));
        }
        if DATE_QUERIES.contains(&text) {
            return Some(Plan::new(Route::System, "date_query"));
        }
        if HELP_QUERIES.contains(&text) {
            return Some(Plan::new(Route::System, "help"));
        }
        if matches_phrase_with_fillers(text, GREETINGS) {
            return Some(Plan::new(Route::Smalltalk, "greeting"));
        }
        if matches_phrase_with_fillers(text, FAREWELLS) {
            return Some(Plan::new(Route::Smalltalk, "farewell"));
        }
        if matches_phrase_with_fillers(text, THANKS) {
            return Some(Plan::new(Route::Smalltalk, "thanks"));
        }
        None
    }
}

/// True when `text` is one of `phrases`, optionally preceded or followed
/// only by filler words ("hey there", "thanks so much").
fn matches_phrase_with_fillers(text: &str, phrases: &[&str]) -> bool {
    let words: Vec<&str> = text.split(' ').collect();
    phrases.iter().any(|phrase| {
        let phrase_words: Vec<&str> = phrase.split(' ').collect();
        let n = phrase_words.len();
        if words.len() < n {
            return false;
        }
        (0..=words.len() - n).any(|start| {
            words[start..start + n] == phrase_words[..]
                && words[..start]
                    .iter()
                    .chain(&words[start + n..])
                    .all(|w| FILLERS.contains(w))
        })
    })
}

fn route_hint(text: &str) -> Option<Route> {
    text.split(' ').find_map(|word| {
        let stem = word.strip_suffix('s').unwrap_or(word);
        HINTS
            .iter()
            .find(|(keyword, _)| *keyword == word || *keyword == stem)
            .map(|(_, route)| *route)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(outcome: FastPathOutcome) -> Plan {
        match outcome {
            FastPathOutcome::Terminal(plan) => plan,
            other => panic!("expected terminal, got {:?}", other),
        }
    }

    #[test]
    fn test_greeting_with_filler() {
        let classifier = FastPathClassifier::new();
        let plan = terminal(classifier.classify("hey there"));
        assert_eq!(plan.route, Route::Smalltalk);
        assert_eq!(plan.intent, "greeting");
        assert_eq!(plan.source, PlanSource::FastPath);
        assert!(plan.tool_plan.is_empty());
        assert!(!plan.requires_confirmation);
    }

    #[test]
    fn test_farewell_and_thanks() {
        let classifier = FastPathClassifier::new();
        assert_eq!(terminal(classifier.classify("bye for now")).intent, "farewell");
        assert_eq!(terminal(classifier.classify("thank you so much")).intent, "thanks");
        assert_eq!(terminal(classifier.classify("ok thanks")).intent, "thanks");
    }

    #[test]
    fn test_system_queries() {
        let classifier = FastPathClassifier::new();
        let plan = terminal(classifier.classify("what time is it"));
        assert_eq!(plan.route, Route::System);
        assert_eq!(plan.intent, "time_query");
        assert_eq!(terminal(classifier.classify("what's the date")).intent, "date_query");
        assert_eq!(terminal(classifier.classify("help")).intent, "help");
    }

    #[test]
    fn test_greeting_with_request_continues() {
        let classifier = FastPathClassifier::new();
        assert_eq!(
            classifier.classify("hey delete my meeting tomorrow"),
            FastPathOutcome::Continue {
                hint: Some(Route::Calendar)
            }
        );
        assert_eq!(
            classifier.classify("check my emails"),
            FastPathOutcome::Continue { hint: Some(Route::Mail) }
        );
        assert_eq!(
            classifier.classify("tell me a story"),
            FastPathOutcome::Continue { hint: None }
        );
    }

    #[test]
    fn test_long_utterance_never_matched() {
        let classifier = FastPathClassifier::new();
        let long = format!("hello {}", "there ".repeat(20));
        assert_eq!(
            classifier.classify(long.trim()),
            FastPathOutcome::Continue { hint: None }
        );
        assert_eq!(classifier.classify(""), FastPathOutcome::Continue { hint: None });
    }

    #[test]
    fn test_fast_path_never_proposes_tools() {
        let classifier = FastPathClassifier::new();
        for text in ["hi", "goodbye", "thanks", "what time is it", "what day is it", "help"] {
            let plan = terminal(classifier.classify(text));
            assert!(plan.tool_plan.is_empty(), "{}", text);
            assert!(!plan.requires_confirmation, "{}", text);
        }
    }
}
