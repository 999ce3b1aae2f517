//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Normalize an utterance for matching.
///
/// Lowercases, folds typographic apostrophes, turns punctuation other than
/// apostrophes into spaces and collapses whitespace. Matching code never sees
/// the raw text, so `"Hey there!"` and `"hey   there"` compare equal.
pub fn normalize_utterance(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        let ch = match ch {
            '\u{2019}' | '\u{2018}' | '`' => '\'',
            c => c,
        };
        if ch.is_alphanumeric() || ch == '\'' {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Lowercase identifier form: spaces and hyphens become underscores.
pub fn to_identifier(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Split an identifier-ish string (`create_meeting`, `calendar.delete_event`)
/// into lowercase alphanumeric tokens.
pub fn identifier_tokens(raw: &str) -> Vec<String> {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = if ca == *cb { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes; cutting inside it must back up
        assert_eq!(truncate("éééééé", 6), "é...");
        assert_eq!(truncate("日本語テスト", 30), "日本語テスト");
    }

    #[test]
    fn test_normalize_utterance() {
        assert_eq!(normalize_utterance("  Hey there!  "), "hey there");
        assert_eq!(normalize_utterance("What’s the TIME?"), "what's the time");
        assert_eq!(normalize_utterance("yes,   do it."), "yes do it");
        assert_eq!(normalize_utterance("!!!"), "");
    }

    #[test]
    fn test_to_identifier() {
        assert_eq!(to_identifier(" Create Meeting "), "create_meeting");
        assert_eq!(to_identifier("send-email"), "send_email");
    }

    #[test]
    fn test_identifier_tokens() {
        assert_eq!(
            identifier_tokens("calendar.delete_event"),
            vec!["calendar", "delete", "event"]
        );
        assert!(identifier_tokens("__").is_empty());
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("calendar", "calendar"), 0);
        assert_eq!(edit_distance("calender", "calendar"), 1);
        assert_eq!(edit_distance("", "mail"), 4);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }
}
