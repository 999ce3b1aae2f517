//! Running a plan: resolve, gate, execute, finalize.
//!
//! Calls run in plan order. A run of adjacent `independent` calls forms one
//! batch and executes concurrently; every other call is its own batch. When
//! the firewall halts a call, the calls cleared before it in the batch still
//! run, and everything from the halted call on is kept in the continuation.

use super::types::{ReplyKind, TurnError, TurnOutcome};
use super::{Orchestrator, with_notices};
use chrono::{Local, Utc};
use steward_domain::confirmation::{ConfirmationRequest, Gate};
use steward_domain::plan::Plan;
use steward_domain::session::{OrchestratorPhase, PendingConfirmation, PlanContinuation, SessionState, Turn};
use steward_domain::tool::ToolCall;
use tracing::{debug, info};

use crate::use_cases::finalize::FinalizeInput;

impl Orchestrator {
    /// Resolve a fresh plan into calls and run it.
    pub(super) async fn run_plan(
        &self,
        state: &mut SessionState,
        turn: &Turn,
        utterance: &str,
        plan: Plan,
        notices: Vec<String>,
    ) -> Result<TurnOutcome, TurnError> {
        let registry = self.risk.snapshot();
        let catalog = self.engine.catalog();
        let calls: Vec<ToolCall> = plan
            .tool_plan
            .iter()
            .map(|planned| {
                let name = catalog.resolve(&planned.tool, plan.route);
                let risk = registry.classify(&name);
                ToolCall::from_planned(state.next_call_id(), planned, name, risk)
            })
            .collect();

        let continuation = PlanContinuation {
            plan,
            utterance: utterance.to_string(),
            remaining: calls,
            finished: Vec::new(),
        };
        self.continue_plan(state, turn, continuation, notices).await
    }

    /// Run the remaining calls of a plan until it completes or halts.
    pub(super) async fn continue_plan(
        &self,
        state: &mut SessionState,
        turn: &Turn,
        mut continuation: PlanContinuation,
        notices: Vec<String>,
    ) -> Result<TurnOutcome, TurnError> {
        state.phase = OrchestratorPhase::Executing;
        let declared = continuation.plan.requires_confirmation;

        while !continuation.remaining.is_empty() {
            let len = batch_len(&continuation.remaining);
            let batch: Vec<ToolCall> = continuation.remaining.drain(..len).collect();

            let mut cleared = Vec::new();
            let mut halted: Option<ConfirmationRequest> = None;
            let mut held_back: Vec<ToolCall> = Vec::new();

            for call in batch {
                if halted.is_some() {
                    held_back.push(call);
                    continue;
                }
                match self.firewall.gate(call, declared, Utc::now()) {
                    Gate::Cleared(c) => {
                        self.audit_firewall(c.call(), c.verdict(), "cleared");
                        cleared.push(c);
                    }
                    Gate::NeedsConfirmation(request) => {
                        self.audit_firewall(&request.call, request.verdict, "pending");
                        halted = Some(request);
                    }
                }
            }

            if !cleared.is_empty() {
                debug!("Executing batch of {} call(s)", cleared.len());
                let executed = self.engine.execute_all(cleared).await;
                continuation.finished.extend(executed);
            }

            if let Some(request) = halted {
                info!("Halting on {} for confirmation", request.call.name);
                held_back.append(&mut continuation.remaining);
                continuation.remaining = held_back;

                let prompt = request.prompt.clone();
                let plan = continuation.plan.clone();
                let finished = continuation.finished.clone();
                state.set_pending_confirmation(PendingConfirmation { request, continuation })?;

                let reply = with_notices(notices, prompt);
                let mut outcome = self.close_turn(state, turn, Some(&plan), finished, reply, None);
                outcome.kind = ReplyKind::ConfirmationPrompt;
                return Ok(outcome);
            }
        }

        let PlanContinuation {
            plan,
            utterance,
            finished,
            ..
        } = continuation;
        self.finalize_plan(state, turn, &utterance, plan, finished, notices).await
    }

    /// Score the turn, produce the reply and close the turn.
    pub(super) async fn finalize_plan(
        &self,
        state: &mut SessionState,
        turn: &Turn,
        utterance: &str,
        plan: Plan,
        calls: Vec<ToolCall>,
        notices: Vec<String>,
    ) -> Result<TurnOutcome, TurnError> {
        state.phase = OrchestratorPhase::Finalizing;
        let assessment = self.quality_gate.assess(&plan, &calls);
        debug!(
            "Quality score {:.3} (c={:.2} w={:.2} r={:.2}) -> {}",
            assessment.score.score,
            assessment.score.complexity,
            assessment.score.writing,
            assessment.score.risk,
            assessment.tier
        );

        let summary = state.summary.as_text();
        let finalized = self
            .finalizer
            .finalize(
                assessment.tier,
                FinalizeInput {
                    utterance,
                    plan: &plan,
                    calls: &calls,
                    summary: &summary,
                    now: Local::now().naive_local(),
                },
            )
            .await;

        let reply = with_notices(notices, finalized.reply);
        Ok(self.close_turn(state, turn, Some(&plan), calls, reply, Some(finalized.used)))
    }
}

/// Size of the next batch: a run of adjacent independent calls, or one call.
fn batch_len(remaining: &[ToolCall]) -> usize {
    let independent = remaining.iter().take_while(|c| c.independent).count();
    independent.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use steward_domain::tool::{RiskLevel, ToolCallId};

    fn call(name: &str, independent: bool) -> ToolCall {
        let mut call = ToolCall::new(ToolCallId::new(name), name, RiskLevel::Safe);
        call.independent = independent;
        call
    }

    #[test]
    fn test_batch_len() {
        assert_eq!(batch_len(&[call("a", false), call("b", true)]), 1);
        assert_eq!(batch_len(&[call("a", true), call("b", true), call("c", false)]), 2);
        assert_eq!(batch_len(&[call("a", true)]), 1);
    }
}
