//! Confirmation request entity.

use super::firewall::{ClearedCall, FirewallVerdict};
use crate::tool::{CallStatus, RiskLevel, ToolCall};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decision on a confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pending,
    Approved,
    Denied,
    /// Denied because nobody answered in time
    Expired,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Pending => "pending",
            Decision::Approved => "approved",
            Decision::Denied => "denied",
            Decision::Expired => "expired",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A halted tool call waiting for the user's explicit decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub prompt: String,
    pub call: ToolCall,
    pub verdict: FirewallVerdict,
    pub decision: Decision,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Ambiguous answers received so far
    pub reprompts: u32,
}

impl ConfirmationRequest {
    pub(crate) fn new(
        call: ToolCall,
        verdict: FirewallVerdict,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            prompt: confirmation_prompt(&call),
            call,
            verdict,
            decision: Decision::Pending,
            created_at,
            expires_at,
            reprompts: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Approve the call; the only path from a confirmation to execution.
    pub fn approve(mut self) -> ClearedCall {
        self.call.status = CallStatus::Confirmed;
        ClearedCall::new(self.call, self.verdict, true)
    }

    /// Deny the call.
    pub fn deny(mut self) -> ToolCall {
        self.call.deny();
        self.call
    }

    /// Merge edited parameters into the pending call and refresh the prompt.
    /// The risk tag is unchanged, so confirmation is still required.
    pub fn apply_edit(&mut self, edits: serde_json::Map<String, serde_json::Value>) {
        for (key, value) in edits {
            self.call.params.insert(key, value);
        }
        self.prompt = confirmation_prompt(&self.call);
    }

    /// Count an ambiguous answer. Returns true when the limit is exceeded
    /// and the request must resolve to deny.
    pub fn register_ambiguous(&mut self, max_reprompts: u32) -> bool {
        self.reprompts += 1;
        self.reprompts > max_reprompts
    }
}

/// Single unambiguous question for a call.
pub fn confirmation_prompt(call: &ToolCall) -> String {
    let warning = match call.risk {
        RiskLevel::Destructive => " This cannot be undone.",
        _ => "",
    };
    if call.params.is_empty() {
        format!("Should I run {}?{} (yes / no)", call.name, warning)
    } else {
        format!(
            "Should I run {} with {}?{} (yes / no / edit key=value)",
            call.name,
            call.params_display(),
            warning
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::firewall::{ConfirmationFirewall, Gate};
    use crate::tool::ToolCallId;

    fn pending(now: DateTime<Utc>) -> ConfirmationRequest {
        let call = ToolCall::new(ToolCallId::new("c1"), "calendar.delete_event", RiskLevel::Destructive)
            .with_param("id", "evt-1");
        match ConfirmationFirewall::default().gate(call, false, now) {
            Gate::NeedsConfirmation(request) => request,
            Gate::Cleared(_) => panic!("expected confirmation"),
        }
    }

    #[test]
    fn test_prompt_is_single_question() {
        let request = pending(Utc::now());
        assert_eq!(
            request.prompt,
            "Should I run calendar.delete_event with id=evt-1? This cannot be undone. (yes / no / edit key=value)"
        );
        assert_eq!(request.prompt.matches('?').count(), 1);
    }

    #[test]
    fn test_apply_edit_refreshes_prompt_keeps_risk() {
        let mut request = pending(Utc::now());
        let mut edits = serde_json::Map::new();
        edits.insert("id".into(), "evt-2".into());
        request.apply_edit(edits);

        assert_eq!(request.call.get_string("id"), Some("evt-2"));
        assert!(request.prompt.contains("id=evt-2"));
        assert_eq!(request.call.risk, RiskLevel::Destructive);
        assert!(request.verdict.effective);
    }

    #[test]
    fn test_ambiguous_limit() {
        let mut request = pending(Utc::now());
        assert!(!request.register_ambiguous(1));
        assert!(request.register_ambiguous(1));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let request = pending(now);
        assert!(!request.is_expired(now));
        assert!(request.is_expired(request.expires_at));
    }

    #[test]
    fn test_deny_marks_call() {
        let call = pending(Utc::now()).deny();
        assert_eq!(call.status, CallStatus::Denied);
    }
}
