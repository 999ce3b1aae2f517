//! Tool execution engine.
//!
//! Runs cleared calls against the tool catalog.
//!
//! # Attempt loop
//!
//! ```text
//! ClearedCall
//!   │ in-flight check ──dup──▶ duplicate (no attempt)
//!   │ catalog lookup ──miss──▶ not_found (terminal)
//!   │ param validation ─bad──▶ invalid_argument (terminal)
//!   ▼
//! ┌─▶ backoff ─▶ breaker.try_acquire ──rejected──▶ circuit_open
//! │                   │
//! │              timeout(class) ▶ tool.execute
//! │                   │
//! └── retryable && attempts left ◀── error
//! ```
//!
//! Breaker accounting: a retryable failure (timeout, unavailable) counts
//! against the dependency; success or a terminal failure means the
//! dependency answered and resets it.

use crate::config::ToolParams;
use crate::ports::audit_sink::{AuditEvent, AuditSink};
use crate::ports::tool_catalog::ToolCatalog;
use crate::state::CircuitBreakers;
use futures::future::join_all;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use steward_domain::confirmation::{ClearedCall, FirewallVerdict};
use steward_domain::tool::{
    Admission, DefaultToolValidator, ToolCall, ToolCallId, ToolError, ToolResult, ToolValidator,
};
use tracing::{debug, info, warn};

/// Executes cleared tool calls with timeout, retry and circuit breaking.
pub struct ToolExecutionEngine {
    catalog: Arc<dyn ToolCatalog>,
    breakers: Arc<CircuitBreakers>,
    audit: Arc<dyn AuditSink>,
    validator: DefaultToolValidator,
    params: ToolParams,
    in_flight: Mutex<HashSet<ToolCallId>>,
}

/// Removes a call id from the in-flight set when the attempt loop ends.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<ToolCallId>>,
    id: ToolCallId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.id);
    }
}

impl ToolExecutionEngine {
    pub fn new(
        catalog: Arc<dyn ToolCatalog>,
        breakers: Arc<CircuitBreakers>,
        audit: Arc<dyn AuditSink>,
        params: ToolParams,
    ) -> Self {
        Self {
            catalog,
            breakers,
            audit,
            validator: DefaultToolValidator::default(),
            params,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn ToolCatalog> {
        &self.catalog
    }

    fn claim(&self, id: &ToolCallId) -> Option<InFlightGuard<'_>> {
        let mut set = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !set.insert(id.clone()) {
            return None;
        }
        Some(InFlightGuard {
            set: &self.in_flight,
            id: id.clone(),
        })
    }

    /// Execute one cleared call and return it with its outcome recorded.
    pub async fn execute(&self, cleared: ClearedCall) -> ToolCall {
        assert!(
            !cleared.violates_policy(),
            "confirmation firewall bypassed for tool call {}",
            cleared.call().id
        );
        let verdict = cleared.verdict();
        let approved = cleared.approved();
        let mut call = cleared.into_call();

        let Some(_guard) = self.claim(&call.id) else {
            warn!("Tool call {} is already in flight", call.id);
            let result = ToolResult::failure(call.id.clone(), &call.name, ToolError::duplicate(&call.id));
            self.finish(&mut call, result, verdict, approved);
            return call;
        };

        let started = Instant::now();
        let (outcome, attempts) = self.run_attempts(&call).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = match outcome {
            Ok(output) => ToolResult::success(call.id.clone(), &call.name, output),
            Err(error) => ToolResult::failure(call.id.clone(), &call.name, error),
        }
        .with_metadata(duration_ms, attempts);

        self.finish(&mut call, result, verdict, approved);
        call
    }

    /// Execute several cleared calls concurrently; results keep input order.
    pub async fn execute_all(&self, calls: Vec<ClearedCall>) -> Vec<ToolCall> {
        join_all(calls.into_iter().map(|c| self.execute(c))).await
    }

    async fn run_attempts(
        &self,
        call: &ToolCall,
    ) -> (Result<serde_json::Map<String, serde_json::Value>, ToolError>, u32) {
        let Some(tool) = self.catalog.get(&call.name) else {
            return (Err(ToolError::not_found(format!("tool {}", call.name))), 0);
        };
        if let Err(e) = self.validator.validate(call, tool.definition()) {
            return (Err(e), 0);
        }

        let dependency = call.dependency().to_string();
        let timeout = self.params.timeout_for(&dependency);
        let max_attempts = self.params.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            let attempt = attempts + 1;
            let backoff = self.params.backoff_before(attempt);
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }

            if self.breakers.try_acquire(&dependency, Instant::now()) == Admission::Rejected {
                debug!("Breaker open for {}, failing {} fast", dependency, call.name);
                return (Err(ToolError::circuit_open(&dependency)), attempts);
            }

            attempts = attempt;
            debug!("Executing {} (attempt {}/{})", call.name, attempt, max_attempts);
            let result = match tokio::time::timeout(timeout, tool.execute(call.params.clone())).await {
                Ok(result) => result,
                Err(_) => Err(ToolError::timeout(format!("{} after {:?}", call.name, timeout))),
            };

            match result {
                Ok(output) => {
                    self.breakers.record_success(&dependency);
                    return (Ok(output), attempts);
                }
                Err(error) if error.retryable => {
                    if self.breakers.record_failure(&dependency, Instant::now()) {
                        warn!("Circuit breaker opened for {}", dependency);
                    }
                    if attempt >= max_attempts {
                        return (Err(error), attempts);
                    }
                    warn!("{} failed ({}), retrying", call.name, error);
                }
                Err(error) => {
                    self.breakers.record_success(&dependency);
                    return (Err(error), attempts);
                }
            }
        }
    }

    fn finish(&self, call: &mut ToolCall, result: ToolResult, verdict: FirewallVerdict, approved: bool) {
        match result.error() {
            None => info!(
                "Tool {} ok in {}ms ({} attempt(s))",
                call.name, result.metadata.duration_ms, result.metadata.attempts
            ),
            Some(e) => warn!("Tool {} failed: {}", call.name, e),
        }

        self.audit.record(AuditEvent::new(
            "tool_execution",
            json!({
                "call_id": call.id.as_str(),
                "tool": call.name,
                "risk": call.risk.as_str(),
                "declared": verdict.declared,
                "effective": verdict.effective,
                "approved": approved,
                "success": result.is_success(),
                "error_kind": result.error().map(|e| e.kind.as_str()),
                "retryable": result.error().map(|e| e.retryable),
                "attempts": result.metadata.attempts,
                "duration_ms": result.metadata.duration_ms,
            }),
        ));

        call.complete(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, FakeTool, RecordingAuditSink, output};
    use chrono::Utc;
    use std::time::Duration;
    use steward_domain::confirmation::{ConfirmationFirewall, Gate};
    use steward_domain::tool::{BreakerPolicy, CallStatus, ErrorKind, RiskLevel};

    fn engine(
        tools: Vec<Arc<FakeTool>>,
        params: ToolParams,
        breaker: BreakerPolicy,
    ) -> (ToolExecutionEngine, Arc<RecordingAuditSink>) {
        let catalog = tools.into_iter().fold(FakeCatalog::new(), |c, t| c.with(t));
        let audit = Arc::new(RecordingAuditSink::default());
        let engine = ToolExecutionEngine::new(
            Arc::new(catalog),
            Arc::new(CircuitBreakers::new(breaker)),
            audit.clone(),
            params,
        );
        (engine, audit)
    }

    fn fast_params(max_attempts: u32, timeout_ms: u64) -> ToolParams {
        ToolParams {
            default_timeout: Duration::from_millis(timeout_ms),
            max_attempts,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            ..Default::default()
        }
    }

    fn cleared(id: &str, name: &str) -> ClearedCall {
        let call = ToolCall::new(ToolCallId::new(id), name, RiskLevel::Safe);
        match ConfirmationFirewall::default().gate(call, false, Utc::now()) {
            Gate::Cleared(cleared) => cleared,
            Gate::NeedsConfirmation(_) => panic!("safe call should clear"),
        }
    }

    #[tokio::test]
    async fn test_success_records_metadata_and_audit() {
        let tool = Arc::new(FakeTool::new("calendar.list_events").respond(Ok(output("count", 2))));
        let (engine, audit) = engine(vec![tool.clone()], fast_params(3, 100), BreakerPolicy::default());

        let call = engine.execute(cleared("c1", "calendar.list_events")).await;

        assert_eq!(call.status, CallStatus::Ok);
        assert_eq!(call.retry_count, 0);
        assert_eq!(tool.invocations(), 1);
        let events = audit.of_type("tool_execution");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["tool"], "calendar.list_events");
        assert_eq!(events[0].payload["attempts"], 1);
        assert_eq!(events[0].payload["declared"], false);
        assert_eq!(events[0].payload["effective"], false);
        assert_eq!(events[0].payload["approved"], false);
    }

    #[tokio::test]
    async fn test_approved_call_audit_carries_verdict() {
        let tool = Arc::new(FakeTool::new("calendar.delete_event").respond(Ok(output("deleted", true))));
        let (engine, audit) = engine(vec![tool], fast_params(1, 100), BreakerPolicy::default());
        let call = ToolCall::new(ToolCallId::new("d1"), "calendar.delete_event", RiskLevel::Destructive);
        let request = match ConfirmationFirewall::default().gate(call, true, Utc::now()) {
            Gate::NeedsConfirmation(request) => request,
            Gate::Cleared(_) => panic!("destructive call should need confirmation"),
        };

        engine.execute(request.approve()).await;

        let events = audit.of_type("tool_execution");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["risk"], "destructive");
        assert_eq!(events[0].payload["declared"], true);
        assert_eq!(events[0].payload["effective"], true);
        assert_eq!(events[0].payload["approved"], true);
        assert!(events[0].payload["duration_ms"].is_u64());
    }

    #[tokio::test]
    async fn test_retryable_failure_is_retried() {
        let tool = Arc::new(
            FakeTool::new("mail.read_inbox")
                .respond(Err(ToolError::unavailable("503")))
                .respond(Ok(output("messages", 0))),
        );
        let (engine, _) = engine(vec![tool.clone()], fast_params(3, 100), BreakerPolicy::default());

        let call = engine.execute(cleared("c1", "mail.read_inbox")).await;

        assert_eq!(call.status, CallStatus::Ok);
        assert_eq!(call.retry_count, 1);
        assert_eq!(tool.invocations(), 2);
    }

    #[tokio::test]
    async fn test_terminal_failure_is_not_retried() {
        let tool = Arc::new(FakeTool::new("fs.read_file").always(Err(ToolError::not_found("notes.txt"))));
        let (engine, _) = engine(vec![tool.clone()], fast_params(3, 100), BreakerPolicy::default());

        let call = engine.execute(cleared("c1", "fs.read_file")).await;

        assert_eq!(call.status, CallStatus::Error);
        assert_eq!(tool.invocations(), 1);
        let error = call.outcome.as_ref().and_then(|r| r.error()).unwrap();
        assert_eq!(error.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let (engine, _) = engine(vec![], fast_params(3, 100), BreakerPolicy::default());
        let call = engine.execute(cleared("c1", "weather.forecast")).await;

        let result = call.outcome.as_ref().unwrap();
        assert_eq!(result.error().unwrap().kind, ErrorKind::NotFound);
        assert_eq!(result.metadata.attempts, 0);
    }

    #[tokio::test]
    async fn test_missing_required_param_is_invalid_argument() {
        let tool = Arc::new(FakeTool::new("fs.read_file").with_required("path"));
        let (engine, _) = engine(vec![tool.clone()], fast_params(3, 100), BreakerPolicy::default());

        let call = engine.execute(cleared("c1", "fs.read_file")).await;

        assert_eq!(
            call.outcome.as_ref().unwrap().error().unwrap().kind,
            ErrorKind::InvalidArgument
        );
        assert_eq!(tool.invocations(), 0);
    }

    #[tokio::test]
    async fn test_breaker_opens_and_fails_fast() {
        // timeouts on every call; the fourth is rejected without invoking the tool
        let tool = Arc::new(FakeTool::new("calendar.list_events").with_delay(Duration::from_millis(200)));
        let (engine, audit) = engine(
            vec![tool.clone()],
            fast_params(1, 20),
            BreakerPolicy {
                failure_threshold: 3,
                cooldown: Duration::from_secs(60),
            },
        );

        for i in 0..3 {
            let call = engine.execute(cleared(&format!("c{}", i), "calendar.list_events")).await;
            assert_eq!(call.outcome.unwrap().error().unwrap().kind, ErrorKind::Timeout);
        }
        let fourth = engine.execute(cleared("c3", "calendar.list_events")).await;

        assert_eq!(fourth.outcome.unwrap().error().unwrap().kind, ErrorKind::CircuitOpen);
        assert_eq!(tool.invocations(), 3);
        assert_eq!(audit.of_type("tool_execution").len(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_call_id_runs_once() {
        let tool = Arc::new(FakeTool::new("fs.list_directory").with_delay(Duration::from_millis(50)));
        let (engine, _) = engine(vec![tool.clone()], fast_params(1, 500), BreakerPolicy::default());

        let results = engine
            .execute_all(vec![cleared("same", "fs.list_directory"), cleared("same", "fs.list_directory")])
            .await;

        assert_eq!(tool.invocations(), 1);
        let kinds: Vec<Option<ErrorKind>> = results
            .iter()
            .map(|c| c.outcome.as_ref().and_then(|r| r.error()).map(|e| e.kind))
            .collect();
        assert!(kinds.contains(&None));
        assert!(kinds.contains(&Some(ErrorKind::Duplicate)));
    }

    #[tokio::test]
    async fn test_execute_all_preserves_order() {
        let slow = Arc::new(FakeTool::new("browser.open_page").with_delay(Duration::from_millis(40)));
        let quick = Arc::new(FakeTool::new("browser.search_web"));
        let (engine, _) = engine(vec![slow, quick], fast_params(1, 500), BreakerPolicy::default());

        let results = engine
            .execute_all(vec![cleared("a", "browser.open_page"), cleared("b", "browser.search_web")])
            .await;

        let names: Vec<&str> = results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["browser.open_page", "browser.search_web"]);
    }
}
