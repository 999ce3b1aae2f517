//! Risk registry: tool name → risk tag.
//!
//! Entries are either exact names (`calendar.delete_event`) or prefix
//! wildcards (`mail.*`). Lookup prefers the exact entry, then the longest
//! matching wildcard. Names with no entry are `moderate`; nothing is ever
//! safe by omission.

use super::entities::RiskLevel;
use std::collections::HashMap;

/// Risk of a tool that has no registry entry.
pub const UNREGISTERED_RISK: RiskLevel = RiskLevel::Moderate;

/// Static mapping of tool names to risk tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskRegistry {
    exact: HashMap<String, RiskLevel>,
    /// `(prefix, risk)` with the trailing `*` removed, so `mail.*` is stored as `mail.`
    prefixes: Vec<(String, RiskLevel)>,
}

impl RiskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in tags for the known tool families.
    pub fn builtin_defaults() -> Self {
        Self::new()
            .with_entry("calendar.list_events", RiskLevel::Safe)
            .with_entry("calendar.create_event", RiskLevel::Moderate)
            .with_entry("calendar.update_event", RiskLevel::Moderate)
            .with_entry("calendar.delete_event", RiskLevel::Destructive)
            .with_entry("mail.read_inbox", RiskLevel::Safe)
            .with_entry("mail.compose_email", RiskLevel::Moderate)
            .with_entry("mail.send_email", RiskLevel::Destructive)
            .with_entry("mail.delete_email", RiskLevel::Destructive)
            .with_entry("browser.open_page", RiskLevel::Safe)
            .with_entry("browser.search_web", RiskLevel::Safe)
            .with_entry("fs.list_directory", RiskLevel::Safe)
            .with_entry("fs.read_file", RiskLevel::Safe)
            .with_entry("fs.write_file", RiskLevel::Moderate)
            .with_entry("fs.delete_file", RiskLevel::Destructive)
            .with_entry("terminal.*", RiskLevel::Destructive)
    }

    /// Add or replace an entry. A trailing `*` makes it a prefix wildcard.
    pub fn with_entry(mut self, pattern: impl Into<String>, risk: RiskLevel) -> Self {
        self.insert(pattern, risk);
        self
    }

    pub fn insert(&mut self, pattern: impl Into<String>, risk: RiskLevel) {
        let pattern = pattern.into().trim().to_lowercase();
        match pattern.strip_suffix('*') {
            Some(prefix) => {
                let prefix = prefix.to_string();
                self.prefixes.retain(|(p, _)| *p != prefix);
                self.prefixes.push((prefix, risk));
            }
            None => {
                self.exact.insert(pattern, risk);
            }
        }
    }

    /// Merge another registry on top of this one (its entries win).
    pub fn merge(mut self, other: RiskRegistry) -> Self {
        for (name, risk) in other.exact {
            self.exact.insert(name, risk);
        }
        for (prefix, risk) in other.prefixes {
            self.insert(format!("{}*", prefix), risk);
        }
        self
    }

    /// Classify a tool name. Pure and idempotent.
    pub fn classify(&self, tool_name: &str) -> RiskLevel {
        let name = tool_name.trim().to_lowercase();
        if let Some(risk) = self.exact.get(&name) {
            return *risk;
        }
        self.prefixes
            .iter()
            .filter(|(prefix, _)| name.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, risk)| *risk)
            .unwrap_or(UNREGISTERED_RISK)
    }

    pub fn is_registered(&self, tool_name: &str) -> bool {
        let name = tool_name.trim().to_lowercase();
        self.exact.contains_key(&name) || self.prefixes.iter().any(|(p, _)| name.starts_with(p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults() {
        let registry = RiskRegistry::builtin_defaults();
        assert_eq!(registry.classify("calendar.delete_event"), RiskLevel::Destructive);
        assert_eq!(registry.classify("calendar.list_events"), RiskLevel::Safe);
        assert_eq!(registry.classify("fs.write_file"), RiskLevel::Moderate);
        assert_eq!(registry.classify("terminal.run_command"), RiskLevel::Destructive);
        assert_eq!(registry.classify("mail.send_email"), RiskLevel::Destructive);
    }

    #[test]
    fn test_unregistered_is_moderate_never_safe() {
        let registry = RiskRegistry::builtin_defaults();
        assert_eq!(registry.classify("contacts.lookup"), RiskLevel::Moderate);
        assert_eq!(RiskRegistry::new().classify("anything"), RiskLevel::Moderate);
        assert!(!registry.is_registered("contacts.lookup"));
    }

    #[test]
    fn test_exact_beats_wildcard_and_longest_prefix_wins() {
        let registry = RiskRegistry::new()
            .with_entry("mail.*", RiskLevel::Destructive)
            .with_entry("mail.read.*", RiskLevel::Safe)
            .with_entry("mail.read_inbox", RiskLevel::Safe);

        assert_eq!(registry.classify("mail.read_inbox"), RiskLevel::Safe);
        assert_eq!(registry.classify("mail.read.archive"), RiskLevel::Safe);
        assert_eq!(registry.classify("mail.forward"), RiskLevel::Destructive);
    }

    #[test]
    fn test_classify_is_case_insensitive_and_idempotent() {
        let registry = RiskRegistry::builtin_defaults();
        let first = registry.classify(" Calendar.Delete_Event ");
        assert_eq!(first, RiskLevel::Destructive);
        assert_eq!(registry.classify(" Calendar.Delete_Event "), first);
    }

    #[test]
    fn test_merge_overrides() {
        let base = RiskRegistry::builtin_defaults();
        let overrides = RiskRegistry::new()
            .with_entry("fs.write_file", RiskLevel::Destructive)
            .with_entry("terminal.*", RiskLevel::Moderate);
        let merged = base.merge(overrides);

        assert_eq!(merged.classify("fs.write_file"), RiskLevel::Destructive);
        assert_eq!(merged.classify("terminal.run_command"), RiskLevel::Moderate);
        assert_eq!(merged.classify("fs.read_file"), RiskLevel::Safe);
    }
}
