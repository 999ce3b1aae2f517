//! Logging infrastructure — the audit trail.
//!
//! Provides [`JsonlAuditSink`], an append-only JSONL writer that implements
//! the [`AuditSink`](steward_application::AuditSink) port. Diagnostic logs
//! go through `tracing` and are configured by the binary.

mod jsonl_audit_sink;

pub use jsonl_audit_sink::JsonlAuditSink;
