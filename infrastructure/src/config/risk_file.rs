//! Risk registry loading.
//!
//! The registry is assembled from up to three layers, later layers winning:
//! built-in tags, the risk file, inline `[risk.tools]` entries. The file
//! uses the same shape as the inline table:
//!
//! ```toml
//! [tools]
//! "calendar.delete_event" = "destructive"
//! "browser.*" = "safe"
//! ```

use super::file_config::FileRiskConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use steward_domain::tool::{RiskLevel, RiskRegistry};
use thiserror::Error;
use tracing::{debug, info};

/// Risk registry could not be loaded.
#[derive(Debug, Error)]
pub enum RiskFileError {
    #[error("cannot read risk file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse risk file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown risk level '{level}' for {pattern}")]
    InvalidLevel { pattern: String, level: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RiskFile {
    tools: BTreeMap<String, String>,
}

/// Build a registry from `pattern → level` entries.
pub fn registry_from_table(table: &BTreeMap<String, String>) -> Result<RiskRegistry, RiskFileError> {
    let mut registry = RiskRegistry::new();
    for (pattern, level) in table {
        let risk: RiskLevel = level.parse().map_err(|_| RiskFileError::InvalidLevel {
            pattern: pattern.clone(),
            level: level.clone(),
        })?;
        registry.insert(pattern.as_str(), risk);
    }
    Ok(registry)
}

/// Load a standalone risk file.
pub fn load_risk_file(path: &Path) -> Result<RiskRegistry, RiskFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| RiskFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RiskFile = toml::from_str(&text).map_err(|source| RiskFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let registry = registry_from_table(&file.tools)?;
    debug!("Loaded {} risk entries from {}", registry.len(), path.display());
    Ok(registry)
}

/// Assemble the full registry described by a `[risk]` section.
///
/// Called at startup and again on reload; a failed reload leaves the
/// caller's current registry untouched.
pub fn build_risk_registry(config: &FileRiskConfig) -> Result<RiskRegistry, RiskFileError> {
    let mut registry = if config.builtin_defaults {
        RiskRegistry::builtin_defaults()
    } else {
        RiskRegistry::new()
    };

    if let Some(path) = config.file_path() {
        registry = registry.merge(load_risk_file(&path)?);
    }
    registry = registry.merge(registry_from_table(&config.tools)?);

    info!("Risk registry ready with {} entries", registry.len());
    Ok(registry)
}
