//! Intent router use case.
//!
//! One temperature-zero call to the fast backend, validated into a [`Plan`].
//! Failures never propagate: timeouts, backend errors and unparseable
//! output all degrade to the `unknown` sentinel.
//!
//! ```text
//! classify prompt ──▶ fast backend ──▶ validate_plan_output
//!                          │ error/timeout        │ unrecoverable
//!                          ▼                      ▼ (llm_repair)
//!                    Plan::unknown()       repair prompt ──▶ validate again
//!                                                 │ still unrecoverable
//!                                                 ▼
//!                                           Plan::unknown()
//! ```

use crate::config::RouterParams;
use crate::ports::generation::{BackendError, GenerationBackend, GenerationRequest};
use std::sync::Arc;
use steward_domain::plan::{Plan, RepairReport, validate_plan_output};
use steward_domain::prompt::{RouterContext, RouterPromptTemplate};
use steward_domain::tool::ToolDefinition;
use tracing::{debug, warn};

/// Router output.
#[derive(Debug, Clone)]
pub struct RoutedPlan {
    pub plan: Plan,
    pub report: RepairReport,
    /// The secondary repair call produced the plan
    pub backend_repaired: bool,
}

impl RoutedPlan {
    fn sentinel() -> Self {
        Self {
            plan: Plan::unknown(),
            report: RepairReport::default(),
            backend_repaired: false,
        }
    }
}

/// Calls the fast backend to classify an utterance.
pub struct IntentRouter {
    backend: Arc<dyn GenerationBackend>,
    params: RouterParams,
}

impl IntentRouter {
    pub fn new(backend: Arc<dyn GenerationBackend>, params: RouterParams) -> Self {
        Self { backend, params }
    }

    pub async fn route(
        &self,
        utterance: &str,
        tools: &[ToolDefinition],
        context: &RouterContext<'_>,
    ) -> RoutedPlan {
        let prompt = RouterPromptTemplate::classify(utterance, tools, context);
        let raw = match self.call(prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Router backend {} failed: {}", self.backend.name(), e);
                return RoutedPlan::sentinel();
            }
        };

        let validated = validate_plan_output(&raw);
        log_report(&validated.report);

        if !validated.report.unrecoverable || !self.params.llm_repair {
            return RoutedPlan {
                plan: validated.plan,
                report: validated.report,
                backend_repaired: false,
            };
        }

        debug!("Router output unparseable, requesting repair");
        match self.call(RouterPromptTemplate::repair(&raw)).await {
            Ok(repaired) => {
                let second = validate_plan_output(&repaired);
                log_report(&second.report);
                if second.report.unrecoverable {
                    warn!("Router repair pass failed, falling back to unknown");
                    RoutedPlan {
                        plan: Plan::unknown(),
                        report: second.report,
                        backend_repaired: false,
                    }
                } else {
                    RoutedPlan {
                        plan: second.plan,
                        report: second.report,
                        backend_repaired: true,
                    }
                }
            }
            Err(e) => {
                warn!("Router repair call failed: {}", e);
                RoutedPlan {
                    plan: validated.plan,
                    report: validated.report,
                    backend_repaired: false,
                }
            }
        }
    }

    async fn call(&self, prompt: String) -> Result<String, BackendError> {
        let request = GenerationRequest::new(prompt)
            .with_temperature(0.0)
            .with_max_tokens(self.params.max_tokens);
        match tokio::time::timeout(self.params.timeout, self.backend.complete(request)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(BackendError::EmptyResponse),
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }
}

fn log_report(report: &RepairReport) {
    if report.is_clean() {
        return;
    }
    for repair in &report.repairs {
        debug!("Plan repair: {}", repair);
    }
    if report.fallback_used {
        debug!("Plan repair: used fence/brace extraction fallback");
    }
    if report.unrecoverable {
        warn!("Router output could not be parsed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use std::time::Duration;
    use steward_domain::plan::{PlanSource, Route};

    fn router(backend: Arc<ScriptedBackend>, llm_repair: bool) -> IntentRouter {
        IntentRouter::new(
            backend,
            RouterParams {
                timeout: Duration::from_millis(200),
                max_tokens: 128,
                llm_repair,
            },
        )
    }

    #[tokio::test]
    async fn test_routes_valid_output() {
        let backend = Arc::new(ScriptedBackend::new("fast").reply(
            r#"{"route": "calendar", "intent": "list_events", "tool_plan": ["calendar.list_events"], "confidence": 0.9}"#,
        ));
        let routed = router(backend.clone(), true)
            .route("what's on today", &[], &RouterContext::default())
            .await;

        assert_eq!(routed.plan.route, Route::Calendar);
        assert_eq!(routed.plan.tool_names(), vec!["calendar.list_events"]);
        assert!(routed.report.is_clean());
        assert_eq!(backend.requests()[0].temperature, 0.0);
    }

    #[tokio::test]
    async fn test_backend_failure_gives_sentinel() {
        let backend = Arc::new(ScriptedBackend::new("fast").fail(BackendError::Unavailable("down".into())));
        let routed = router(backend, true)
            .route("anything", &[], &RouterContext::default())
            .await;

        assert!(routed.plan.is_unknown());
        assert_eq!(routed.plan.confidence, 0.0);
        assert_eq!(routed.plan.source, PlanSource::Fallback);
    }

    #[tokio::test]
    async fn test_timeout_gives_sentinel() {
        let backend = Arc::new(ScriptedBackend::new("fast").delay(Duration::from_secs(5)).reply("{}"));
        let routed = router(backend, true)
            .route("anything", &[], &RouterContext::default())
            .await;
        assert!(routed.plan.is_unknown());
    }

    #[tokio::test]
    async fn test_repair_pass_recovers() {
        let backend = Arc::new(
            ScriptedBackend::new("fast")
                .reply("route is mail, intent read_inbox")
                .reply(r#"{"route": "mail", "intent": "read_inbox"}"#),
        );
        let routed = router(backend.clone(), true)
            .route("check mail", &[], &RouterContext::default())
            .await;

        assert_eq!(routed.plan.route, Route::Mail);
        assert!(routed.backend_repaired);
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_repair_disabled_gives_unknown() {
        let backend = Arc::new(ScriptedBackend::new("fast").reply("not json at all"));
        let routed = router(backend.clone(), false)
            .route("check mail", &[], &RouterContext::default())
            .await;

        assert!(routed.plan.is_unknown());
        assert!(routed.report.unrecoverable);
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_fixtures_never_fail() {
        let fixtures = [
            "",
            "null",
            "[]",
            "{",
            "```json\n{\"route\": \"calendar\"\n```",
            r#"{"route": 42, "intent": null, "tool_plan": {"weird": true}, "confidence": "lots"}"#,
            r#"{"alternatives": "x", "slots": [1, 2]}"#,
        ];
        for fixture in fixtures {
            let backend = Arc::new(ScriptedBackend::new("fast").reply(fixture).reply("still broken"));
            let routed = router(backend, true)
                .route("x", &[], &RouterContext::default())
                .await;
            assert!((0.0..=1.0).contains(&routed.plan.confidence));
            assert!(routed.plan.route.has_intent(&routed.plan.intent));
        }
    }
}
