//! Generation backend adapters.
//!
//! With the `http-backend` feature a configured `[backends.*]` section
//! becomes an [`HttpCompletionBackend`]. Anything else becomes an
//! [`UnavailableBackend`], so the engine keeps answering from the lower
//! tiers.

#[cfg(feature = "http-backend")]
mod http;

#[cfg(feature = "http-backend")]
pub use http::HttpCompletionBackend;

use crate::config::FileBackendConfig;
use std::sync::Arc;
use steward_application::ports::generation::{GenerationBackend, UnavailableBackend};
use tracing::{info, warn};

/// Build the backend described by one `[backends.*]` section.
pub fn build_backend(name: &str, config: &FileBackendConfig) -> Arc<dyn GenerationBackend> {
    let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) else {
        info!("Backend {} not configured", name);
        return Arc::new(UnavailableBackend::new(name));
    };
    connect(name, url, config)
}

#[cfg(feature = "http-backend")]
fn connect(name: &str, url: &str, config: &FileBackendConfig) -> Arc<dyn GenerationBackend> {
    let mut backend = HttpCompletionBackend::new(name, url);
    if let Some(model) = &config.model {
        backend = backend.with_model(model.clone());
    }
    if let Some(key) = config.api_key() {
        backend = backend.with_api_key(key);
    } else if let Some(var) = &config.api_key_env {
        warn!("Backend {}: {} is not set, sending no API key", name, var);
    }
    info!("Backend {} -> {}", name, backend.endpoint());
    Arc::new(backend)
}

#[cfg(not(feature = "http-backend"))]
fn connect(name: &str, url: &str, _config: &FileBackendConfig) -> Arc<dyn GenerationBackend> {
    warn!("Backend {} ({}) needs the http-backend feature; treating it as unavailable", name, url);
    Arc::new(UnavailableBackend::new(name))
}
