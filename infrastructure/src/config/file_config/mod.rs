//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; conversion into engine types happens in
//! [`FileConfig::to_engine_params`], which also validates.

mod backends;
mod engine;
mod repl;
mod tools;

pub use backends::{FileBackendConfig, FileBackendsConfig};
pub use engine::{FileBreakerConfig, FilePolicyConfig, FileQualityConfig, FileRouterConfig, FileSummaryConfig};
pub use repl::{FileAuditConfig, FileLoggingConfig, FileReplConfig};
pub use tools::{FileRiskConfig, FileToolsConfig};

use super::validation::{ConfigIssue, ConfigIssueCode, ConfigValidationError};
use serde::{Deserialize, Serialize};
use steward_application::{EngineParams, FinalizeParams};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Fast and quality generation backends
    pub backends: FileBackendsConfig,
    /// Intent router settings
    pub router: FileRouterConfig,
    /// Confirmation policy
    pub policy: FilePolicyConfig,
    /// Quality gate thresholds and reply generation
    pub quality: FileQualityConfig,
    /// Circuit breakers
    pub breaker: FileBreakerConfig,
    /// Tool execution and sandbox
    pub tools: FileToolsConfig,
    /// Risk registry sources
    pub risk: FileRiskConfig,
    /// Dialog summary budget
    pub summary: FileSummaryConfig,
    /// Audit trail
    pub audit: FileAuditConfig,
    /// Diagnostic log files
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.build().1
    }

    /// Build engine parameters. Fails if any issue has `Error` severity;
    /// warnings are returned alongside the parameters.
    pub fn to_engine_params(&self) -> Result<(EngineParams, Vec<ConfigIssue>), ConfigValidationError> {
        let (params, issues) = self.build();
        if issues.iter().any(ConfigIssue::is_error) {
            return Err(ConfigValidationError::Invalid(
                issues.into_iter().filter(ConfigIssue::is_error).collect(),
            ));
        }
        Ok((params, issues))
    }

    fn build(&self) -> (EngineParams, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let (router, router_issues) = self.router.to_router_params();
        issues.extend(router_issues);
        let (clarify_below, clarify_issues) = self.router.clarify_below();
        issues.extend(clarify_issues);
        let (quality, quality_issues) = self.quality.to_thresholds();
        issues.extend(quality_issues);
        let (temperature, temperature_issues) = self.quality.reply_temperature();
        issues.extend(temperature_issues);
        let (breaker, breaker_issues) = self.breaker.to_policy();
        issues.extend(breaker_issues);
        let (tools, tool_issues) = self.tools.to_tool_params();
        issues.extend(tool_issues);
        let (session_idle, idle_issues) = self.policy.session_idle();
        issues.extend(idle_issues);
        issues.extend(self.risk.validate());
        issues.extend(self.backend_issues());

        let finalize = FinalizeParams {
            fast_timeout: backend_timeout(&self.backends.fast, FinalizeParams::default().fast_timeout),
            quality_timeout: backend_timeout(&self.backends.quality, FinalizeParams::default().quality_timeout),
            max_tokens: self.quality.reply_max_tokens.max(1),
            temperature,
        };

        let params = EngineParams::default()
            .with_router(router)
            .with_finalize(finalize)
            .with_tools(tools)
            .with_breaker(breaker)
            .with_confirmation(self.policy.to_confirmation_policy())
            .with_clarify_below(clarify_below)
            .with_quality(quality)
            .with_summary(self.summary.to_budget())
            .with_session_idle(session_idle);

        (params, issues)
    }

    /// A backend with a model or key but no URL was probably meant to be used.
    fn backend_issues(&self) -> Vec<ConfigIssue> {
        [("fast", &self.backends.fast), ("quality", &self.backends.quality)]
            .into_iter()
            .filter(|(_, b)| !b.is_configured() && (b.model.is_some() || b.api_key_env.is_some()))
            .map(|(name, _)| {
                ConfigIssue::warning(
                    ConfigIssueCode::MissingBackendUrl {
                        backend: name.to_string(),
                    },
                    format!("backends.{} has no url; the {} tier will be skipped", name, name),
                )
            })
            .collect()
    }
}

fn backend_timeout(backend: &FileBackendConfig, fallback: Duration) -> Duration {
    if backend.timeout_secs == 0 {
        fallback
    } else {
        Duration::from_secs(backend.timeout_secs)
    }
}
