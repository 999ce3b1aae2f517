//! Answering a pending confirmation.

use super::types::{ReplyKind, TurnError, TurnOutcome};
use super::Orchestrator;
use steward_domain::confirmation::{ConfirmationAnswer, parse_confirmation_answer};
use steward_domain::session::{PendingConfirmation, PlanContinuation, SessionState, Turn};
use steward_domain::tool::ToolCall;
use tracing::{debug, info};

const REPROMPT_PREFIX: &str = "Sorry, I need a clear answer.";

impl Orchestrator {
    /// Resolve the pending confirmation with the user's answer. The router
    /// is never consulted here.
    pub(super) async fn answer_confirmation(
        &self,
        state: &mut SessionState,
        turn: &Turn,
        mut pending: PendingConfirmation,
    ) -> Result<TurnOutcome, TurnError> {
        match parse_confirmation_answer(turn.raw()) {
            ConfirmationAnswer::Approve => {
                info!("Confirmed {}", pending.request.call.name);
                let PendingConfirmation { request, mut continuation } = pending;
                self.audit_firewall(&request.call, request.verdict, "approved");
                let executed = self.engine.execute(request.approve()).await;
                continuation.finished.push(executed);
                self.continue_plan(state, turn, continuation, Vec::new()).await
            }
            ConfirmationAnswer::Deny => {
                info!("Denied {}", pending.request.call.name);
                self.deny_pending(state, turn, pending, "denied").await
            }
            ConfirmationAnswer::Edit(edits) => {
                debug!("Editing {} ({} field(s))", pending.request.call.name, edits.len());
                pending.request.apply_edit(edits);
                self.audit_firewall(&pending.request.call, pending.request.verdict, "edited");
                let prompt = pending.request.prompt.clone();
                let plan = pending.continuation.plan.clone();
                state.set_pending_confirmation(pending)?;
                Ok(self.prompt_turn(state, turn, Some(&plan), prompt, ReplyKind::ConfirmationPrompt, Vec::new()))
            }
            ConfirmationAnswer::Ambiguous => {
                if pending
                    .request
                    .register_ambiguous(self.params.confirmation.max_reprompts)
                {
                    info!("Second ambiguous answer, denying {}", pending.request.call.name);
                    return self.deny_pending(state, turn, pending, "denied_ambiguous").await;
                }
                let prompt = format!("{} {}", REPROMPT_PREFIX, pending.request.prompt);
                let plan = pending.continuation.plan.clone();
                state.set_pending_confirmation(pending)?;
                Ok(self.prompt_turn(state, turn, Some(&plan), prompt, ReplyKind::Reprompt, Vec::new()))
            }
        }
    }

    /// Deny the halted call, skip the rest of its plan and finalize.
    async fn deny_pending(
        &self,
        state: &mut SessionState,
        turn: &Turn,
        pending: PendingConfirmation,
        decision: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let PendingConfirmation { request, continuation } = pending;
        self.audit_firewall(&request.call, request.verdict, decision);
        let denied = request.deny();
        let PlanContinuation {
            plan,
            utterance,
            finished,
            ..
        } = skip_remaining(continuation, denied);
        self.finalize_plan(state, turn, &utterance, plan, finished, Vec::new()).await
    }

    /// Resolve an expired confirmation as denied. Returns the notice for the user.
    pub(super) fn expire_confirmation(&self, pending: PendingConfirmation) -> String {
        let PendingConfirmation { request, continuation } = pending;
        info!("Confirmation for {} expired", request.call.name);
        self.audit_firewall(&request.call, request.verdict, "expired");
        let name = request.call.name.clone();
        let skipped = skip_remaining(continuation, request.deny());
        debug!("Dropped {} call(s) of the expired plan", skipped.finished.len());
        format!("The earlier request to run {} expired, so I didn't run it.", name)
    }
}

/// Append the denied call and mark every remaining call skipped.
fn skip_remaining(mut continuation: PlanContinuation, denied: ToolCall) -> PlanContinuation {
    continuation.finished.push(denied);
    for mut call in continuation.remaining.drain(..) {
        call.skip();
        continuation.finished.push(call);
    }
    continuation
}
