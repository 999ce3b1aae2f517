//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use super::validation::ConfigValidationError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in order
const PROJECT_FILES: &[&str] = &["steward.toml", ".steward.toml"];

/// Environment variable prefix; `__` separates nesting levels
/// (`STEWARD_BACKENDS__FAST__URL`).
const ENV_PREFIX: &str = "STEWARD_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `STEWARD_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./steward.toml` or `./.steward.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/steward/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigValidationError> {
        // An explicit path must exist; a typo should not silently load defaults
        if let Some(path) = config_path
            && !path.is_file()
        {
            return Err(ConfigValidationError::MissingFile(path.to_path_buf()));
        }

        let figment = Self::file_layers(
            Self::global_config_path().filter(|p| p.exists()).as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(|e| Box::new(e).into())
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Defaults plus the given files, lowest priority first.
    fn file_layers(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        for path in [global, project, explicit].into_iter().flatten() {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("steward").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Describe the config file locations being used (for `--show-config`)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mark = |found: bool| if found { "FOUND" } else { "     " };
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [{}] Env:     {}*", mark(true), ENV_PREFIX));
        if let Some(path) = explicit {
            lines.push(format!("  [{}] Explicit: {}", mark(path.exists()), path.display()));
        }
        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [{}] Project: {}", mark(true), path.display())),
            None => lines.push(format!("  [{}] Project: ./steward.toml or ./.steward.toml", mark(false))),
        }
        if let Some(path) = Self::global_config_path() {
            lines.push(format!("  [{}] Global:  {}", mark(path.exists()), path.display()));
        }
        lines.push("  [FOUND] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_global_config_path_names_steward() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("steward/config.toml"));
        }
    }

    #[test]
    fn test_later_files_win() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("steward.toml");
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&global, "[breaker]\nfailure_threshold = 7\ncooldown_secs = 90\n").unwrap();
        std::fs::write(&project, "[breaker]\nfailure_threshold = 4\n").unwrap();
        std::fs::write(&explicit, "[policy]\nconfirm_moderate = true\n").unwrap();

        let config: FileConfig = ConfigLoader::file_layers(Some(&global), Some(&project), Some(&explicit))
            .extract()
            .unwrap();

        assert_eq!(config.breaker.failure_threshold, 4);
        assert_eq!(config.breaker.cooldown_secs, 90);
        assert!(config.policy.confirm_moderate);
        assert_eq!(config.router.timeout_secs, 8);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigValidationError::MissingFile(_))));
    }
}
