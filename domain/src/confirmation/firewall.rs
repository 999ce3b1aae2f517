//! Confirmation firewall.
//!
//! The binding confirmation rule is an OR over independent signals:
//!
//! ```text
//! effective = declared
//!          OR risk == destructive
//!          OR (risk == moderate AND policy.confirm_moderate)
//! ```
//!
//! A model that forgets to declare confirmation can only make the engine
//! more careful, never less. The only way to obtain a [`ClearedCall`], the
//! sole input the execution engine accepts, is through
//! [`ConfirmationFirewall::gate`] or [`ConfirmationRequest::approve`].

use super::entities::ConfirmationRequest;
use crate::tool::{RiskLevel, ToolCall};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Confirmation policy values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationPolicy {
    /// Also confirm `moderate` tools
    pub confirm_moderate: bool,
    /// Ambiguous answers tolerated before resolving to deny
    pub max_reprompts: u32,
    /// Seconds before a pending confirmation expires
    pub expiry_secs: u64,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirm_moderate: false,
            max_reprompts: 1,
            expiry_secs: 300,
        }
    }
}

/// Declared vs. effective confirmation for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallVerdict {
    pub risk: RiskLevel,
    pub declared: bool,
    pub effective: bool,
}

/// The OR rule.
pub fn requires_confirmation(risk: RiskLevel, declared: bool, policy: &ConfirmationPolicy) -> bool {
    declared
        || risk == RiskLevel::Destructive
        || (risk == RiskLevel::Moderate && policy.confirm_moderate)
}

/// A call the firewall has let through. Cannot be built outside this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearedCall {
    call: ToolCall,
    verdict: FirewallVerdict,
    approved: bool,
}

impl ClearedCall {
    pub(crate) fn new(call: ToolCall, verdict: FirewallVerdict, approved: bool) -> Self {
        Self {
            call,
            verdict,
            approved,
        }
    }

    pub fn call(&self) -> &ToolCall {
        &self.call
    }

    pub fn verdict(&self) -> FirewallVerdict {
        self.verdict
    }

    /// Cleared through explicit user approval
    pub fn approved(&self) -> bool {
        self.approved
    }

    /// Confirmation was required but never given. Unreachable through the
    /// public API; the execution engine treats it as fatal.
    pub fn violates_policy(&self) -> bool {
        self.verdict.effective && !self.approved
    }

    pub fn into_call(self) -> ToolCall {
        self.call
    }
}

/// Firewall decision for one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Cleared(ClearedCall),
    NeedsConfirmation(ConfirmationRequest),
}

/// Applies the OR rule and produces cleared calls or confirmation requests.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationFirewall {
    policy: ConfirmationPolicy,
}

impl ConfirmationFirewall {
    pub fn new(policy: ConfirmationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ConfirmationPolicy {
        &self.policy
    }

    pub fn verdict(&self, risk: RiskLevel, declared: bool) -> FirewallVerdict {
        FirewallVerdict {
            risk,
            declared,
            effective: requires_confirmation(risk, declared, &self.policy),
        }
    }

    /// Gate a call. `declared` is the plan's advisory flag.
    pub fn gate(&self, call: ToolCall, declared: bool, now: DateTime<Utc>) -> Gate {
        let verdict = self.verdict(call.risk, declared);
        if verdict.effective {
            let ttl = i64::try_from(self.policy.expiry_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX);
            let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
            Gate::NeedsConfirmation(ConfirmationRequest::new(call, verdict, now, expires_at))
        } else {
            Gate::Cleared(ClearedCall::new(call, verdict, false))
        }
    }
}
