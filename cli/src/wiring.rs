//! Dependency injection: configuration to a ready [`Orchestrator`].

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use steward_application::{
    AuditSink, CircuitBreakers, NoAuditSink, Orchestrator, OrchestratorDeps, SharedRiskRegistry,
};
use steward_infrastructure::config::{ConfigIssue, ConfigLoader, FileConfig, Severity, build_risk_registry};
use steward_infrastructure::{JsonlAuditSink, build_backend, builtin_registry};
use tracing::info;

/// Where configuration comes from; kept so `/reload` reads the same files.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub explicit: Option<PathBuf>,
    pub files_enabled: bool,
}

impl ConfigSource {
    pub fn load(&self) -> Result<FileConfig> {
        if !self.files_enabled {
            return Ok(ConfigLoader::load_defaults());
        }
        ConfigLoader::load(self.explicit.as_deref()).context("Failed to load configuration")
    }
}

/// Print configuration warnings to stderr.
pub fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        let label = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!("config {}: {}", label, issue.message);
    }
}

/// Build the orchestrator and every adapter it needs.
pub fn build_orchestrator(config: &FileConfig) -> Result<Orchestrator> {
    let (params, issues) = config.to_engine_params()?;
    report_issues(&issues);

    let registry = build_risk_registry(&config.risk)?;
    let risk = Arc::new(SharedRiskRegistry::new(registry));

    let root = match config.tools.root_path() {
        Some(root) => root,
        None => std::env::current_dir().context("Cannot determine working directory")?,
    };
    let catalog = builtin_registry(&root, config.tools.allow_commands);
    info!("Tool root {} ({} tools)", root.display(), catalog.len());

    let audit: Arc<dyn AuditSink> = match config.audit.resolved_path().filter(|_| config.audit.enabled) {
        Some(path) => {
            let sink = JsonlAuditSink::open(&path)
                .with_context(|| format!("Cannot open audit log {}", path.display()))?;
            info!("Audit log: {}", path.display());
            Arc::new(sink)
        }
        None => Arc::new(NoAuditSink),
    };

    let deps = OrchestratorDeps {
        fast_backend: build_backend("fast", &config.backends.fast),
        quality_backend: build_backend("quality", &config.backends.quality),
        catalog: Arc::new(catalog),
        audit,
        risk,
        breakers: Arc::new(CircuitBreakers::new(params.breaker)),
    };
    Ok(Orchestrator::new(deps, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_domain::session::SessionId;

    fn quiet_config(root: &std::path::Path) -> FileConfig {
        let mut config = ConfigLoader::load_defaults();
        config.audit.enabled = false;
        config.tools.root = Some(root.display().to_string());
        config
    }

    #[tokio::test]
    async fn test_defaults_build_a_working_orchestrator() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = build_orchestrator(&quiet_config(dir.path())).unwrap();

        let outcome = orchestrator.handle_turn(&SessionId::new("t"), "hello").await.unwrap();
        assert!(!outcome.reply.is_empty());
    }

    #[test]
    fn test_invalid_thresholds_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quiet_config(dir.path());
        config.quality.quality_threshold = 0.1;
        config.quality.fast_threshold = 0.5;
        assert!(build_orchestrator(&config).is_err());
    }

    #[test]
    fn test_disabled_files_give_defaults() {
        let source = ConfigSource {
            explicit: Some(PathBuf::from("/does/not/exist.toml")),
            files_enabled: false,
        };
        assert_eq!(source.load().unwrap(), ConfigLoader::load_defaults());
    }
}
