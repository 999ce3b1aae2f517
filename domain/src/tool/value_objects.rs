//! Tool domain value objects — immutable result and error types
//!
//! Every execution produces a [`ToolResult`] envelope: a success payload or
//! a typed [`ToolError`]. The error's `retryable` flag drives the execution
//! engine's retry loop:
//!
//! | Kind | Retryable by default | Example |
//! |------|:---:|---------|
//! | `timeout` | yes | the collaborator did not answer in time |
//! | `unavailable` | yes | connection refused, 503 |
//! | `invalid_argument` | no | missing `path` |
//! | `not_found` | no | unknown tool or missing file |
//! | `permission_denied` | no | access denied |
//! | `circuit_open` | no | dependency breaker is open |
//! | `duplicate` | no | the same call id is already running |
//! | `failed` | no | any other runtime failure |

use super::entities::ToolCallId;
use serde::{Deserialize, Serialize};

/// Failure category of a tool execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    PermissionDenied,
    Timeout,
    Unavailable,
    CircuitOpen,
    Duplicate,
    Failed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::CircuitOpen => "circuit_open",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Failed => "failed",
        }
    }

    fn retryable_by_default(&self) -> bool {
        matches!(self, ErrorKind::Timeout | ErrorKind::Unavailable)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed failure of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    /// Diagnostic message (logged, never shown to the user verbatim)
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            retryable: kind.retryable_by_default(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    // Common error constructors
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, format!("Not found: {}", resource.into()))
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::PermissionDenied,
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, format!("Timed out: {}", operation.into()))
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn circuit_open(dependency: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::CircuitOpen,
            format!("Circuit open for dependency: {}", dependency.into()),
        )
    }

    pub fn duplicate(call_id: &ToolCallId) -> Self {
        Self::new(
            ErrorKind::Duplicate,
            format!("Call {} is already in flight", call_id),
        )
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Failed, message)
    }

    /// One plain sentence explaining the failure, safe to show the user.
    pub fn user_reason(&self) -> &'static str {
        match self.kind {
            ErrorKind::InvalidArgument => "some required details were missing or invalid",
            ErrorKind::NotFound => "what it needed could not be found",
            ErrorKind::PermissionDenied => "permission was denied",
            ErrorKind::Timeout => "the service took too long to respond",
            ErrorKind::Unavailable => "the service is unavailable right now",
            ErrorKind::CircuitOpen => "the service has been failing and is paused for a moment",
            ErrorKind::Duplicate => "the same action was already running",
            ErrorKind::Failed => "something went wrong while running it",
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Structured metadata about a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Wall time across all attempts
    pub duration_ms: u64,
    /// Attempts made (0 when failing fast)
    pub attempts: u32,
}

/// Result envelope of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: ToolCallId,
    pub tool_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    #[serde(default)]
    pub metadata: ToolResultMetadata,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(
        call_id: ToolCallId,
        tool_name: impl Into<String>,
        output: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            call_id,
            tool_name: tool_name.into(),
            output: Some(output),
            error: None,
            metadata: ToolResultMetadata::default(),
        }
    }

    /// Create a failed result
    pub fn failure(call_id: ToolCallId, tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            call_id,
            tool_name: tool_name.into(),
            output: None,
            error: Some(error),
            metadata: ToolResultMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, duration_ms: u64, attempts: u32) -> Self {
        self.metadata = ToolResultMetadata {
            duration_ms,
            attempts,
        };
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Output rendered as compact JSON (empty for failures).
    pub fn output_text(&self) -> String {
        self.output
            .as_ref()
            .and_then(|map| serde_json::to_string(map).ok())
            .unwrap_or_default()
    }
}
