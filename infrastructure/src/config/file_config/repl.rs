//! Front-end sections: `[repl]`, `[audit]`, `[logging]`

use super::tools::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Path to history file
    pub history_file: Option<String>,
    /// Enable colored terminal output
    pub color: bool,
    /// Session id used by the REPL
    pub session_id: String,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            color: true,
            session_id: "local".to_string(),
        }
    }
}

impl FileReplConfig {
    /// Configured history file, or `<data dir>/steward/history.txt`.
    pub fn history_path(&self) -> Option<PathBuf> {
        match self.history_file.as_deref() {
            Some(raw) => Some(expand_home(raw)),
            None => dirs::data_dir().map(|d| d.join("steward").join("history.txt")),
        }
    }
}

/// Raw audit trail configuration
///
/// ```toml
/// [audit]
/// enabled = true
/// path = "~/.local/share/steward/audit.jsonl"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    pub enabled: bool,
    pub path: Option<String>,
}

impl Default for FileAuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl FileAuditConfig {
    /// Configured path, or `<data dir>/steward/audit.jsonl`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match self.path.as_deref() {
            Some(raw) => Some(expand_home(raw)),
            None => dirs::data_dir().map(|d| d.join("steward").join("audit.jsonl")),
        }
    }
}

/// Raw diagnostic logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily rolling log files; console only when unset
    pub dir: Option<String>,
}

impl FileLoggingConfig {
    pub fn dir_path(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_home)
    }
}
