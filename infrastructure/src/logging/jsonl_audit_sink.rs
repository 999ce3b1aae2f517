//! Append-only JSONL audit trail.
//!
//! Each [`AuditEvent`] becomes one JSON line carrying `type`, an RFC 3339
//! `timestamp` and a process-local `seq`, merged with the event payload.
//! Lines are written in the order `record` is called.

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use steward_application::ports::audit_sink::{AuditEvent, AuditSink};
use tracing::warn;

struct Inner {
    writer: BufWriter<File>,
    seq: u64,
}

/// JSONL audit sink.
///
/// Existing files are appended to, never truncated. Thread-safe via a
/// single mutex, which also fixes the order of `seq`.
pub struct JsonlAuditSink {
    inner: Mutex<Inner>,
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open (or create) the audit file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn build_record(event: AuditEvent, seq: u64) -> Value {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    match event.payload {
        Value::Object(mut map) => {
            map.insert("type".into(), Value::String(event.event_type.to_string()));
            map.insert("timestamp".into(), Value::String(timestamp));
            map.insert("seq".into(), Value::from(seq));
            Value::Object(map)
        }
        other => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "seq": seq,
            "data": other,
        }),
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: AuditEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        inner.seq += 1;
        let record = build_record(event, inner.seq);

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        // Flushed per record: the trail must survive a crash mid-session
        if let Err(e) = writeln!(inner.writer, "{}", line).and_then(|_| inner.writer.flush()) {
            warn!("Could not write audit record to {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlAuditSink {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = inner.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_records_are_ordered_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("steward.audit.jsonl");
        let sink = JsonlAuditSink::open(&path).unwrap();

        sink.record(AuditEvent::new(
            "firewall_decision",
            json!({"tool": "fs.delete_file", "decision": "pending"}),
        ));
        sink.record(AuditEvent::new(
            "tool_execution",
            json!({"tool": "fs.delete_file", "success": true, "attempts": 1}),
        ));
        drop(sink);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "firewall_decision");
        assert_eq!(records[0]["decision"], "pending");
        assert_eq!(records[0]["seq"], 1);
        assert_eq!(records[1]["type"], "tool_execution");
        assert_eq!(records[1]["attempts"], 1);
        assert_eq!(records[1]["seq"], 2);
        for record in &records {
            let ts = record["timestamp"].as_str().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        }
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        JsonlAuditSink::open(&path)
            .unwrap()
            .record(AuditEvent::new("first", json!({})));
        JsonlAuditSink::open(&path)
            .unwrap()
            .record(AuditEvent::new("second", json!({})));

        let types: Vec<String> = read_lines(&path)
            .iter()
            .map(|r| r["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(types, vec!["first", "second"]);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = JsonlAuditSink::open(&path).unwrap();

        sink.record(AuditEvent::new("note", json!("just a string")));
        drop(sink);

        let records = read_lines(&path);
        assert_eq!(records[0]["data"], "just a string");
    }
}
