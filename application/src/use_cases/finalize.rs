//! Finalization dispatcher.
//!
//! Produces the turn's reply at the tier chosen by the quality gate,
//! falling back one tier at a time:
//!
//! | Tier | Generator | Rejected when |
//! |------|-----------|---------------|
//! | quality | quality backend | unavailable, timeout, empty, structured, ungrounded |
//! | fast | fast backend | same |
//! | draft | [`render_draft`] template | never |
//!
//! A generated reply passes the "no new facts" guard only if every entity
//! it mentions appears in the utterance, the dialog summary or the turn's
//! tool data. Failed, denied and skipped calls are appended as plain
//! sentences so a generated reply cannot hide them.

use crate::config::FinalizeParams;
use crate::ports::generation::{BackendError, GenerationBackend, GenerationRequest};
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use steward_domain::finalize::{check_grounding, failure_notices, render_draft};
use steward_domain::plan::Plan;
use steward_domain::prompt::FinalizePromptTemplate;
use steward_domain::quality::Tier;
use steward_domain::tool::ToolCall;
use tracing::{debug, info, warn};

/// Everything the reply may be built from.
#[derive(Debug, Clone, Copy)]
pub struct FinalizeInput<'a> {
    pub utterance: &'a str,
    pub plan: &'a Plan,
    pub calls: &'a [ToolCall],
    pub summary: &'a str,
    /// Local wall-clock time, for time and date answers
    pub now: NaiveDateTime,
}

/// Why a tier's output was not used.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    Backend(BackendError),
    /// Output looked like JSON or code instead of prose
    Structured,
    Ungrounded(Vec<String>),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Backend(e) => write!(f, "{}", e),
            RejectReason::Structured => write!(f, "structured output"),
            RejectReason::Ungrounded(entities) => write!(f, "ungrounded: {}", entities.join(", ")),
        }
    }
}

/// The reply and how it was produced.
#[derive(Debug, Clone)]
pub struct Finalized {
    pub reply: String,
    pub requested: Tier,
    pub used: Tier,
    pub rejected: Vec<(Tier, RejectReason)>,
}

/// Tiered reply generation.
pub struct FinalizationDispatcher {
    fast: Arc<dyn GenerationBackend>,
    quality: Arc<dyn GenerationBackend>,
    params: FinalizeParams,
}

impl FinalizationDispatcher {
    pub fn new(
        fast: Arc<dyn GenerationBackend>,
        quality: Arc<dyn GenerationBackend>,
        params: FinalizeParams,
    ) -> Self {
        Self { fast, quality, params }
    }

    /// Produce a reply starting at `tier`. Never returns an empty reply.
    pub async fn finalize(&self, tier: Tier, input: FinalizeInput<'_>) -> Finalized {
        let mut rejected = Vec::new();
        let mut current = Some(tier);

        while let Some(attempt) = current {
            let (backend, timeout) = match attempt {
                Tier::Quality => (&self.quality, self.params.quality_timeout),
                Tier::Fast => (&self.fast, self.params.fast_timeout),
                Tier::Draft => break,
            };

            match self.generate(backend.as_ref(), timeout, &input).await {
                Ok(reply) => {
                    info!("Reply finalized at {} tier via {}", attempt, backend.name());
                    return Finalized {
                        reply: with_failure_notices(reply, input.calls),
                        requested: tier,
                        used: attempt,
                        rejected,
                    };
                }
                Err(reason) => {
                    warn!("{} tier rejected: {}", attempt, reason);
                    rejected.push((attempt, reason));
                    current = attempt.fallback();
                }
            }
        }

        debug!("Reply finalized from draft template");
        Finalized {
            reply: render_draft(input.plan, input.calls, input.now),
            requested: tier,
            used: Tier::Draft,
            rejected,
        }
    }

    async fn generate(
        &self,
        backend: &dyn GenerationBackend,
        timeout: Duration,
        input: &FinalizeInput<'_>,
    ) -> Result<String, RejectReason> {
        let prompt = FinalizePromptTemplate::reply(input.utterance, input.plan, input.calls, input.summary);
        let request = GenerationRequest::new(prompt)
            .with_temperature(self.params.temperature)
            .with_max_tokens(self.params.max_tokens);

        let text = match tokio::time::timeout(timeout, backend.complete(request)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(RejectReason::Backend(e)),
            Err(_) => return Err(RejectReason::Backend(BackendError::Timeout)),
        };

        let reply = text.trim();
        if reply.is_empty() {
            return Err(RejectReason::Backend(BackendError::EmptyResponse));
        }
        if looks_structured(reply) {
            return Err(RejectReason::Structured);
        }

        let sources = grounding_sources(input);
        let source_refs: Vec<&str> = sources.iter().map(|s| s.as_str()).collect();
        let check = check_grounding(reply, &source_refs);
        if !check.is_grounded() {
            return Err(RejectReason::Ungrounded(check.ungrounded));
        }

        Ok(reply.to_string())
    }
}

fn looks_structured(reply: &str) -> bool {
    reply.starts_with('{') || reply.starts_with('[') || reply.contains("```")
}

/// Text a reply may draw entities from. Slots and call params are router
/// output, so they do not count.
fn grounding_sources(input: &FinalizeInput<'_>) -> Vec<String> {
    let mut sources = vec![input.utterance.to_string(), input.summary.to_string()];
    sources.extend(
        input
            .calls
            .iter()
            .filter_map(|call| call.outcome.as_ref())
            .map(|result| result.output_text()),
    );
    sources
}

fn with_failure_notices(reply: String, calls: &[ToolCall]) -> String {
    let notices: Vec<String> = failure_notices(calls)
        .into_iter()
        .filter(|n| !reply.contains(n.as_str()))
        .collect();
    if notices.is_empty() {
        reply
    } else {
        format!("{}\n{}", reply, notices.join("\n"))
    }
}
