//! Tools configuration from TOML (`[tools]` and `[risk]` sections)
//!
//! Example configuration:
//!
//! ```toml
//! [tools]
//! root = "~/steward"          # sandbox for fs.* and terminal.* (default: cwd)
//! allow_commands = false       # register terminal.run_command
//! default_timeout_secs = 30
//! max_attempts = 3
//! base_backoff_ms = 200
//! max_backoff_ms = 5000
//!
//! [tools.class_timeouts]
//! terminal = 60
//! browser = 15
//!
//! [risk]
//! builtin_defaults = true      # start from the built-in tags
//! file = "risk.toml"           # optional, reloadable with /reload
//!
//! [risk.tools]
//! "browser.*" = "safe"
//! "fs.write_file" = "destructive"
//! ```

use super::super::validation::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use steward_application::ToolParams;

/// Raw tool execution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    pub root: Option<String>,
    pub allow_commands: bool,
    pub default_timeout_secs: u64,
    /// Tool class (`fs`, `terminal`, ...) → timeout in seconds
    pub class_timeouts: HashMap<String, u64>,
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        let params = ToolParams::default();
        Self {
            root: None,
            allow_commands: false,
            default_timeout_secs: params.default_timeout.as_secs(),
            class_timeouts: HashMap::new(),
            max_attempts: params.max_attempts,
            base_backoff_ms: params.base_backoff.as_millis() as u64,
            max_backoff_ms: params.max_backoff.as_millis() as u64,
        }
    }
}

impl FileToolsConfig {
    /// Sandbox root with `~` expanded. `None` means the working directory.
    pub fn root_path(&self) -> Option<PathBuf> {
        self.root.as_deref().map(expand_home)
    }

    pub fn to_tool_params(&self) -> (ToolParams, Vec<ConfigIssue>) {
        let defaults = ToolParams::default();
        let mut issues = Vec::new();

        let default_timeout = if self.default_timeout_secs == 0 {
            issues.push(zero_issue("tools.default_timeout_secs", defaults.default_timeout.as_secs()));
            defaults.default_timeout
        } else {
            Duration::from_secs(self.default_timeout_secs)
        };

        let mut class_timeouts = HashMap::new();
        for (class, secs) in &self.class_timeouts {
            if *secs == 0 {
                issues.push(zero_issue(&format!("tools.class_timeouts.{}", class), default_timeout.as_secs()));
            } else {
                class_timeouts.insert(class.clone(), Duration::from_secs(*secs));
            }
        }

        let max_attempts = if self.max_attempts == 0 {
            issues.push(zero_issue("tools.max_attempts", defaults.max_attempts as u64));
            defaults.max_attempts
        } else {
            self.max_attempts
        };

        (
            ToolParams {
                default_timeout,
                class_timeouts,
                max_attempts,
                base_backoff: Duration::from_millis(self.base_backoff_ms),
                max_backoff: Duration::from_millis(self.max_backoff_ms.max(self.base_backoff_ms)),
            },
            issues,
        )
    }
}

fn zero_issue(field: &str, fallback: u64) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::OutOfRange {
            field: field.to_string(),
            value: "0".to_string(),
        },
        format!("{} cannot be 0, using {}", field, fallback),
    )
}

/// Raw risk registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRiskConfig {
    pub builtin_defaults: bool,
    pub file: Option<String>,
    /// Pattern (exact name or `prefix.*`) → `safe` / `moderate` / `destructive`
    pub tools: BTreeMap<String, String>,
}

impl Default for FileRiskConfig {
    fn default() -> Self {
        Self {
            builtin_defaults: true,
            file: None,
            tools: BTreeMap::new(),
        }
    }
}

impl FileRiskConfig {
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.as_deref().map(expand_home)
    }

    /// Inline entries with an unknown risk level.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.tools
            .iter()
            .filter(|(_, level)| level.parse::<steward_domain::tool::RiskLevel>().is_err())
            .map(|(pattern, level)| {
                ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: format!("risk.tools.{}", pattern),
                        value: level.clone(),
                        valid_values: vec!["safe".into(), "moderate".into(), "destructive".into()],
                    },
                    format!("risk.tools.\"{}\": unknown risk level '{}'", pattern, level),
                )
            })
            .collect()
    }
}

/// Expand a leading `~/` to the home directory.
pub(crate) fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(raw), |home| home.join(rest)),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_timeouts_and_attempts() {
        let config: FileToolsConfig = toml::from_str(
            r#"
max_attempts = 0
[class_timeouts]
terminal = 60
browser = 0
"#,
        )
        .unwrap();

        let (params, issues) = config.to_tool_params();
        assert_eq!(params.timeout_for("terminal"), Duration::from_secs(60));
        assert_eq!(params.timeout_for("browser"), Duration::from_secs(30));
        assert_eq!(params.max_attempts, 3);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_invalid_inline_risk_level() {
        let mut config = FileRiskConfig::default();
        config.tools.insert("browser.*".into(), "safe".into());
        config.tools.insert("mail.send_email".into(), "scary".into());

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("scary"));
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/etc/steward"), PathBuf::from("/etc/steward"));
        assert_eq!(expand_home("risk.toml"), PathBuf::from("risk.toml"));
    }
}
