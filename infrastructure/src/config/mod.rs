//! Configuration file loading for steward
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `STEWARD_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./steward.toml` or `./.steward.toml`
//! 4. Global: `$XDG_CONFIG_HOME/steward/config.toml`
//! 5. Default values
//!
//! The risk registry has its own, reloadable source; see [`risk_file`].

mod file_config;
mod loader;
pub mod risk_file;
mod validation;

pub use file_config::{
    FileAuditConfig, FileBackendConfig, FileBackendsConfig, FileBreakerConfig, FileConfig, FileLoggingConfig,
    FilePolicyConfig, FileQualityConfig, FileReplConfig, FileRiskConfig, FileRouterConfig, FileSummaryConfig,
    FileToolsConfig,
};
pub use loader::ConfigLoader;
pub use risk_file::{RiskFileError, build_risk_registry, load_risk_file};
pub use validation::{ConfigIssue, ConfigIssueCode, ConfigValidationError, Severity};
