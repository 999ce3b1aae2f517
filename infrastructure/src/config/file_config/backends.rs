//! Generation backend configuration (`[backends.fast]`, `[backends.quality]`)

use serde::{Deserialize, Serialize};

/// One OpenAI-compatible completion endpoint.
///
/// # Example
///
/// ```toml
/// [backends.fast]
/// url = "http://127.0.0.1:8080"      # base URL; /v1/completions is appended
/// model = "qwen2.5-3b-instruct"
/// timeout_secs = 10
///
/// [backends.quality]
/// url = "https://api.example.com"
/// model = "large"
/// api_key_env = "STEWARD_QUALITY_KEY"  # name of the variable holding the key
/// timeout_secs = 30
/// ```
///
/// A backend without `url` is treated as unavailable, and replies fall
/// back one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    pub url: Option<String>,
    pub model: Option<String>,
    /// Environment variable holding the bearer token
    pub api_key_env: Option<String>,
    /// Reply generation timeout for this tier
    pub timeout_secs: u64,
}

impl FileBackendConfig {
    fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            url: None,
            model: None,
            api_key_env: None,
            timeout_secs,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|k| !k.is_empty())
    }
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self::with_timeout(10)
    }
}

/// Both backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendsConfig {
    pub fast: FileBackendConfig,
    pub quality: FileBackendConfig,
}

impl Default for FileBackendsConfig {
    fn default() -> Self {
        Self {
            fast: FileBackendConfig::with_timeout(10),
            quality: FileBackendConfig::with_timeout(30),
        }
    }
}
