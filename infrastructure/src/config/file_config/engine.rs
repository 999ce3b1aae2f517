//! Engine tuning sections: `[router]`, `[policy]`, `[quality]`, `[breaker]`, `[summary]`
//!
//! Each `to_*` conversion returns the value to use together with the
//! issues found. Out-of-range values fall back to the default (warning)
//! unless no sensible fallback exists (error).

use super::super::validation::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use steward_application::RouterParams;
use steward_domain::confirmation::ConfirmationPolicy;
use steward_domain::quality::QualityThresholds;
use steward_domain::session::SummaryBudget;
use steward_domain::tool::BreakerPolicy;

fn out_of_range(field: &str, value: impl ToString, message: String) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
        },
        message,
    )
}

// ==================== [router] ====================

/// Raw router configuration
///
/// ```toml
/// [router]
/// timeout_secs = 8
/// max_tokens = 384
/// llm_repair = true        # one re-emit request when local repair fails
/// clarify_below = 0.5      # confidence under which alternatives become a menu
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRouterConfig {
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub llm_repair: bool,
    pub clarify_below: f64,
}

impl Default for FileRouterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            max_tokens: 384,
            llm_repair: true,
            clarify_below: 0.5,
        }
    }
}

impl FileRouterConfig {
    pub fn to_router_params(&self) -> (RouterParams, Vec<ConfigIssue>) {
        let defaults = RouterParams::default();
        let mut issues = Vec::new();

        let timeout = if self.timeout_secs == 0 {
            issues.push(out_of_range(
                "router.timeout_secs",
                self.timeout_secs,
                format!("router.timeout_secs cannot be 0, using {}", defaults.timeout.as_secs()),
            ));
            defaults.timeout
        } else {
            Duration::from_secs(self.timeout_secs)
        };

        (
            RouterParams {
                timeout,
                max_tokens: self.max_tokens.max(1),
                llm_repair: self.llm_repair,
            },
            issues,
        )
    }

    pub fn clarify_below(&self) -> (f64, Vec<ConfigIssue>) {
        if (0.0..=1.0).contains(&self.clarify_below) {
            (self.clarify_below, vec![])
        } else {
            let fallback = Self::default().clarify_below;
            let issue = out_of_range(
                "router.clarify_below",
                self.clarify_below,
                format!(
                    "router.clarify_below must be within [0, 1], got {}, using {}",
                    self.clarify_below, fallback
                ),
            );
            (fallback, vec![issue])
        }
    }
}

// ==================== [policy] ====================

/// Raw confirmation policy
///
/// ```toml
/// [policy]
/// confirm_moderate = false
/// max_reprompts = 1               # ambiguous answers before resolving to deny
/// confirmation_expiry_secs = 300
/// session_idle_secs = 3600        # drop sessions untouched this long
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePolicyConfig {
    pub confirm_moderate: bool,
    pub max_reprompts: u32,
    pub confirmation_expiry_secs: u64,
    pub session_idle_secs: u64,
}

impl Default for FilePolicyConfig {
    fn default() -> Self {
        let policy = ConfirmationPolicy::default();
        Self {
            confirm_moderate: policy.confirm_moderate,
            max_reprompts: policy.max_reprompts,
            confirmation_expiry_secs: policy.expiry_secs,
            session_idle_secs: 3600,
        }
    }
}

impl FilePolicyConfig {
    pub fn to_confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirm_moderate: self.confirm_moderate,
            max_reprompts: self.max_reprompts,
            expiry_secs: self.confirmation_expiry_secs,
        }
    }

    /// Idle time before a session is dropped. Zero is out of range.
    pub fn session_idle(&self) -> (Duration, Vec<ConfigIssue>) {
        if self.session_idle_secs == 0 {
            let issue = ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "policy.session_idle_secs".into(),
                    value: "0".into(),
                },
                "policy.session_idle_secs must be positive; using 3600",
            );
            return (Duration::from_secs(3600), vec![issue]);
        }
        (Duration::from_secs(self.session_idle_secs), vec![])
    }
}

// ==================== [quality] ====================

/// Raw quality gate and reply generation configuration
///
/// ```toml
/// [quality]
/// quality_threshold = 0.45   # score at or above → quality backend
/// fast_threshold = 0.20      # score at or above → fast backend, below → draft
/// reply_max_tokens = 512
/// reply_temperature = 0.3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQualityConfig {
    pub quality_threshold: f64,
    pub fast_threshold: f64,
    pub reply_max_tokens: u32,
    pub reply_temperature: f32,
}

impl Default for FileQualityConfig {
    fn default() -> Self {
        let thresholds = QualityThresholds::default();
        Self {
            quality_threshold: thresholds.quality,
            fast_threshold: thresholds.fast,
            reply_max_tokens: 512,
            reply_temperature: 0.3,
        }
    }
}

impl FileQualityConfig {
    /// Thresholds are an error when invalid: silently moving every reply to
    /// another tier is worse than refusing to start.
    pub fn to_thresholds(&self) -> (QualityThresholds, Vec<ConfigIssue>) {
        match QualityThresholds::new(self.quality_threshold, self.fast_threshold) {
            Ok(thresholds) => (thresholds, vec![]),
            Err(e) => {
                let code = if self.fast_threshold > self.quality_threshold {
                    ConfigIssueCode::InvertedThresholds
                } else {
                    ConfigIssueCode::OutOfRange {
                        field: "quality".into(),
                        value: format!("{}/{}", self.quality_threshold, self.fast_threshold),
                    }
                };
                (QualityThresholds::default(), vec![ConfigIssue::error(code, format!("quality: {}", e))])
            }
        }
    }

    pub fn reply_temperature(&self) -> (f32, Vec<ConfigIssue>) {
        if (0.0..=2.0).contains(&self.reply_temperature) {
            (self.reply_temperature, vec![])
        } else {
            let fallback = Self::default().reply_temperature;
            let issue = out_of_range(
                "quality.reply_temperature",
                self.reply_temperature,
                format!(
                    "quality.reply_temperature must be within [0, 2], got {}, using {}",
                    self.reply_temperature, fallback
                ),
            );
            (fallback, vec![issue])
        }
    }
}

// ==================== [breaker] ====================

/// Raw circuit breaker configuration
///
/// ```toml
/// [breaker]
/// failure_threshold = 3
/// cooldown_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for FileBreakerConfig {
    fn default() -> Self {
        let policy = BreakerPolicy::default();
        Self {
            failure_threshold: policy.failure_threshold,
            cooldown_secs: policy.cooldown.as_secs(),
        }
    }
}

impl FileBreakerConfig {
    pub fn to_policy(&self) -> (BreakerPolicy, Vec<ConfigIssue>) {
        let defaults = BreakerPolicy::default();
        let mut issues = Vec::new();

        let failure_threshold = if self.failure_threshold == 0 {
            issues.push(out_of_range(
                "breaker.failure_threshold",
                0,
                format!("breaker.failure_threshold cannot be 0, using {}", defaults.failure_threshold),
            ));
            defaults.failure_threshold
        } else {
            self.failure_threshold
        };

        (
            BreakerPolicy {
                failure_threshold,
                cooldown: Duration::from_secs(self.cooldown_secs),
            },
            issues,
        )
    }
}

// ==================== [summary] ====================

/// Raw dialog summary budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSummaryConfig {
    pub max_entries: usize,
    pub max_chars: usize,
    pub max_digest_chars: usize,
}

impl Default for FileSummaryConfig {
    fn default() -> Self {
        let budget = SummaryBudget::default();
        Self {
            max_entries: budget.max_entries,
            max_chars: budget.max_chars,
            max_digest_chars: budget.max_digest_chars,
        }
    }
}

impl FileSummaryConfig {
    pub fn to_budget(&self) -> SummaryBudget {
        SummaryBudget {
            max_entries: self.max_entries,
            max_chars: self.max_chars,
            max_digest_chars: self.max_digest_chars.max(16),
        }
    }
}
