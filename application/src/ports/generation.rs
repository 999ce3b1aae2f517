//! Generation backend port
//!
//! Defines the interface for the two text-generation backends: a fast local
//! one (routing and fast replies) and a slower, higher-quality one.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during a completion call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Empty response")]
    EmptyResponse,
}

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens: 256,
            stop: Vec::new(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }
}

/// A text-generation backend.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Name used in logs and audit records
    fn name(&self) -> &str;

    async fn complete(&self, request: GenerationRequest) -> Result<String, BackendError>;
}

/// Backend that is never reachable. Used when a tier is not configured.
pub struct UnavailableBackend {
    name: String,
}

impl UnavailableBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl GenerationBackend for UnavailableBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _request: GenerationRequest) -> Result<String, BackendError> {
        Err(BackendError::Unavailable(format!("{} is not configured", self.name)))
    }
}
