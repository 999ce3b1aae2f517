//! Turn handler: the per-session orchestrator state machine.
//!
//! Every utterance is routed by what the session is waiting for:
//!
//! | Pending | Utterance is read as | Router called? |
//! |---------|----------------------|----------------|
//! | confirmation (live) | yes / no / edit / ambiguous | never |
//! | confirmation (expired) | denied + notice, then a fresh request | yes |
//! | menu | number / label / cancel, else a fresh request | only if fresh |
//! | nothing | fresh request | unless the fast path answers |
//!
//! ```text
//! idle ─▶ awaiting_classification ─▶ executing ─▶ finalizing ─▶ idle
//!                  │                    │  ▲
//!                  ▼                    ▼  │ approve
//!         awaiting_menu_choice   awaiting_confirmation
//! ```
//!
//! Turns of one session run strictly one after another (one async mutex
//! per session); different sessions run in parallel.

mod confirmation;
mod execution;
mod types;

pub use types::{OrchestratorDeps, ReplyKind, TurnError, TurnOutcome};

use crate::config::EngineParams;
use crate::ports::audit_sink::{AuditEvent, AuditSink};
use crate::state::SharedRiskRegistry;
use crate::use_cases::execute_tool::ToolExecutionEngine;
use crate::use_cases::finalize::FinalizationDispatcher;
use crate::use_cases::route_intent::IntentRouter;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use steward_domain::confirmation::{ConfirmationFirewall, FirewallVerdict, MenuAnswer, parse_menu_answer};
use steward_domain::plan::Plan;
use steward_domain::prompt::RouterContext;
use steward_domain::quality::{QualityGate, Tier};
use steward_domain::routing::{FastPathClassifier, FastPathOutcome};
use steward_domain::session::{
    MenuOption, OrchestratorPhase, PendingMenu, SessionId, SessionSnapshot, SessionState, Turn,
};
use steward_domain::tool::{RiskRegistry, ToolCall};
use tracing::{debug, info};

/// Most options a disambiguation menu shows.
const MAX_MENU_OPTIONS: usize = 4;

type SessionHandle = Arc<tokio::sync::Mutex<SessionState>>;

struct SessionEntry {
    handle: SessionHandle,
    last_used: Instant,
}

impl SessionEntry {
    fn new(state: SessionState) -> Self {
        Self {
            handle: Arc::new(tokio::sync::Mutex::new(state)),
            last_used: Instant::now(),
        }
    }

    /// Idle long enough and no turn holds the handle.
    fn is_stale(&self, now: Instant, idle: Duration) -> bool {
        now.duration_since(self.last_used) >= idle && Arc::strong_count(&self.handle) == 1
    }
}

/// Drives turns for any number of sessions.
pub struct Orchestrator {
    pub(super) router: IntentRouter,
    pub(super) engine: ToolExecutionEngine,
    pub(super) finalizer: FinalizationDispatcher,
    pub(super) fast_path: FastPathClassifier,
    pub(super) firewall: ConfirmationFirewall,
    pub(super) quality_gate: QualityGate,
    pub(super) risk: Arc<SharedRiskRegistry>,
    pub(super) audit: Arc<dyn AuditSink>,
    pub(super) params: EngineParams,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl Orchestrator {
    pub fn new(deps: OrchestratorDeps, params: EngineParams) -> Self {
        let router = IntentRouter::new(deps.fast_backend.clone(), params.router.clone());
        let engine = ToolExecutionEngine::new(
            deps.catalog,
            deps.breakers,
            deps.audit.clone(),
            params.tools.clone(),
        );
        let finalizer = FinalizationDispatcher::new(
            deps.fast_backend,
            deps.quality_backend,
            params.finalize.clone(),
        );

        Self {
            router,
            engine,
            finalizer,
            fast_path: FastPathClassifier::new(),
            firewall: ConfirmationFirewall::new(params.confirmation.clone()),
            quality_gate: QualityGate::new(params.quality),
            risk: deps.risk,
            audit: deps.audit,
            params,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    // ==================== Sessions ====================

    fn session(&self, id: &SessionId) -> SessionHandle {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        if !sessions.contains_key(id) {
            let idle = self.params.session_idle;
            sessions.retain(|_, entry| !entry.is_stale(now, idle));
        }
        let entry = sessions
            .entry(id.clone())
            .or_insert_with(|| SessionEntry::new(SessionState::new(id.clone())));
        entry.last_used = now;
        entry.handle.clone()
    }

    fn existing_session(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .map(|entry| entry.handle.clone())
    }

    /// Capture a session's state for an external store.
    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, TurnError> {
        let handle = self
            .existing_session(id)
            .ok_or_else(|| TurnError::UnknownSession(id.to_string()))?;
        let state = handle.lock().await;
        Ok(SessionSnapshot::capture(&state, Utc::now()))
    }

    /// Install a previously captured session, replacing any live one.
    pub fn restore(&self, snapshot: SessionSnapshot) {
        let state = snapshot.state;
        info!("Restoring session {} at turn {}", state.id, state.turn_count);
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(state.id.clone(), SessionEntry::new(state));
    }

    pub fn end_session(&self, id: &SessionId) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id)
            .is_some()
    }

    /// Drop sessions idle for at least `session_idle` that no turn is using.
    /// Also runs whenever a new session is opened.
    pub fn evict_idle(&self) -> usize {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = sessions.len();
        let now = Instant::now();
        let idle = self.params.session_idle;
        sessions.retain(|_, entry| !entry.is_stale(now, idle));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Swap the risk registry. Turns already running keep their snapshot.
    pub fn reload_risk_registry(&self, registry: RiskRegistry) {
        self.risk.replace(registry);
    }

    // ==================== Turn ====================

    /// Handle one utterance for a session.
    pub async fn handle_turn(&self, session_id: &SessionId, utterance: &str) -> Result<TurnOutcome, TurnError> {
        let handle = self.session(session_id);
        let mut state = handle.lock().await;
        let turn_number = state.begin_turn();
        let turn = Turn::new(session_id.clone(), utterance, Utc::now());
        info!("Turn {} for session {}", turn_number, session_id);

        let mut notices = Vec::new();

        if let Some(pending) = state.take_pending_confirmation() {
            if pending.request.is_expired(turn.timestamp()) {
                notices.push(self.expire_confirmation(pending));
            } else {
                return self.answer_confirmation(&mut state, &turn, pending).await;
            }
        }

        if let Some(menu) = state.take_pending_menu() {
            match parse_menu_answer(turn.raw(), &menu.labels()) {
                MenuAnswer::Choose(index) => {
                    if let Some(option) = menu.options.into_iter().nth(index) {
                        debug!("Menu choice {}: {}", index + 1, option.label);
                        return self.run_plan(&mut state, &turn, &menu.utterance, option.plan, notices).await;
                    }
                }
                MenuAnswer::Cancel => {
                    let reply = "Okay, never mind.".to_string();
                    return Ok(self.close_turn(&mut state, &turn, None, Vec::new(), reply, None));
                }
                MenuAnswer::Unrecognized => debug!("Menu dropped; treating as a fresh request"),
            }
        }

        let plan = self.classify(&mut state, &turn).await;

        if let Some(menu) = self.menu_for(&plan, turn.raw()) {
            state.set_pending_menu(menu.clone())?;
            return Ok(self.prompt_turn(&mut state, &turn, Some(&plan), menu.prompt, ReplyKind::MenuPrompt, notices));
        }

        self.run_plan(&mut state, &turn, turn.raw(), plan, notices).await
    }

    async fn classify(&self, state: &mut SessionState, turn: &Turn) -> Plan {
        state.phase = OrchestratorPhase::AwaitingClassification;
        let hint = match self.fast_path.classify(turn.normalized()) {
            FastPathOutcome::Terminal(plan) => {
                debug!("Fast path answered: {}/{}", plan.route, plan.intent);
                return plan;
            }
            FastPathOutcome::Continue { hint } => hint,
        };

        let summary = state.summary.as_text();
        let context = RouterContext {
            summary: &summary,
            turn_number: state.turn_count,
            hint,
        };
        let tools = self.engine.catalog().definitions();
        let routed = self.router.route(turn.raw(), &tools, &context).await;
        info!(
            "Routed to {}/{} (confidence {:.2})",
            routed.plan.route, routed.plan.intent, routed.plan.confidence
        );
        routed.plan
    }

    /// A menu when the top plan is unsure and the router offered alternatives.
    fn menu_for(&self, plan: &Plan, utterance: &str) -> Option<PendingMenu> {
        if plan.confidence >= self.params.clarify_below || plan.alternatives.is_empty() {
            return None;
        }

        let mut options: Vec<MenuOption> = Vec::new();
        let top = (!plan.is_unknown()).then(|| Plan {
            alternatives: Vec::new(),
            ..plan.clone()
        });
        for candidate in top.into_iter().chain(plan.alternatives.iter().cloned()) {
            let duplicate = options
                .iter()
                .any(|o| o.plan.route == candidate.route && o.plan.intent == candidate.intent);
            if candidate.is_unknown() || duplicate {
                continue;
            }
            options.push(MenuOption {
                label: candidate.label(),
                plan: candidate,
            });
        }
        options.truncate(MAX_MENU_OPTIONS);

        (options.len() >= 2).then(|| PendingMenu::new(options, utterance))
    }

    // ==================== Turn completion ====================

    /// Finish a turn whose reply asks the user something.
    pub(super) fn prompt_turn(
        &self,
        state: &mut SessionState,
        turn: &Turn,
        plan: Option<&Plan>,
        prompt: String,
        kind: ReplyKind,
        notices: Vec<String>,
    ) -> TurnOutcome {
        let reply = with_notices(notices, prompt);
        let mut outcome = self.close_turn(state, turn, plan, Vec::new(), reply, None);
        outcome.kind = kind;
        outcome
    }

    /// Push the digest, settle the phase and build the outcome.
    pub(super) fn close_turn(
        &self,
        state: &mut SessionState,
        turn: &Turn,
        plan: Option<&Plan>,
        calls: Vec<ToolCall>,
        reply: String,
        tier: Option<Tier>,
    ) -> TurnOutcome {
        let digest = turn.digest(plan, &calls, &reply);
        state.summary.push(&digest, &self.params.summary);
        state.phase = state.resting_phase();
        debug!("Session {} resting in {}", state.id, state.phase);

        TurnOutcome {
            reply,
            kind: ReplyKind::Answer,
            phase: state.phase,
            turn: state.turn_count,
            route: plan.map(|p| p.route),
            intent: plan.map(|p| p.intent.clone()),
            tier,
            calls,
        }
    }

    pub(super) fn audit_firewall(&self, call: &ToolCall, verdict: FirewallVerdict, decision: &str) {
        self.audit.record(AuditEvent::new(
            "firewall_decision",
            json!({
                "call_id": call.id.as_str(),
                "tool": call.name,
                "risk": verdict.risk.as_str(),
                "declared": verdict.declared,
                "effective": verdict.effective,
                "decision": decision,
            }),
        ));
    }
}

pub(super) fn with_notices(notices: Vec<String>, reply: String) -> String {
    if notices.is_empty() {
        reply
    } else {
        format!("{}\n{}", notices.join("\n"), reply)
    }
}
