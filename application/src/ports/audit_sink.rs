//! Port for the audit trail.
//!
//! Separate from `tracing` diagnostics: every firewall decision and tool
//! execution produces one machine-readable record, appended in order of
//! occurrence.

use serde_json::Value;

/// A structured audit event.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Event type identifier (`firewall_decision`, `tool_execution`, ...)
    pub event_type: &'static str,
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self { event_type, payload }
    }
}

/// Append-only audit sink.
///
/// `record` is synchronous and infallible so auditing never blocks a turn;
/// adapters swallow their own I/O errors.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditSink;

impl AuditSink for NoAuditSink {
    fn record(&self, _event: AuditEvent) {}
}
