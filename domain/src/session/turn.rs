//! A single user turn.

use super::entities::SessionId;
use crate::core::string::normalize_utterance;
use crate::plan::Plan;
use crate::tool::ToolCall;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One utterance as received. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    session_id: SessionId,
    raw: String,
    normalized: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(session_id: SessionId, raw: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let raw = raw.into();
        Self {
            normalized: normalize_utterance(&raw),
            session_id,
            raw,
            timestamp,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// One-line digest for the rolling summary (redaction and bounding
    /// happen when it is pushed).
    pub fn digest(&self, plan: Option<&Plan>, calls: &[ToolCall], reply: &str) -> String {
        let mut digest = format!("user: {}", self.raw.trim());
        if let Some(plan) = plan {
            digest.push_str(&format!(" | {}/{}", plan.route, plan.intent));
        }
        if !calls.is_empty() {
            let tools = calls
                .iter()
                .map(|c| format!("{} {}", c.name, c.status))
                .collect::<Vec<_>>()
                .join(", ");
            digest.push_str(&format!(" | tools: {}", tools));
        }
        digest.push_str(&format!(" | reply: {}", reply.trim()));
        digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Route;
    use crate::tool::{CallStatus, RiskLevel, ToolCallId};

    #[test]
    fn test_turn_normalizes() {
        let turn = Turn::new(SessionId::new("s1"), "  Hey THERE! ", Utc::now());
        assert_eq!(turn.raw(), "  Hey THERE! ");
        assert_eq!(turn.normalized(), "hey there");
    }

    #[test]
    fn test_digest() {
        let turn = Turn::new(SessionId::new("s1"), "delete the standup", Utc::now());
        let plan = Plan::new(Route::Calendar, "delete_event");
        let mut call = ToolCall::new(ToolCallId::new("c1"), "calendar.delete_event", RiskLevel::Destructive);
        call.status = CallStatus::Denied;

        let digest = turn.digest(Some(&plan), &[call], "Okay, I didn't run it.");
        assert_eq!(
            digest,
            "user: delete the standup | calendar/delete_event | tools: calendar.delete_event denied | reply: Okay, I didn't run it."
        );
    }
}
