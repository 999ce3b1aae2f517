//! Tool domain entities

use super::value_objects::ToolResult;
use crate::core::error::DomainError;
use crate::plan::PlannedCall;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Risk tag of a tool, assigned by the risk registry rather than the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Read-only (e.g. `calendar.list_events`, `fs.read_file`)
    Safe,
    /// Creates or changes state that is easy to undo (e.g. `calendar.create_event`)
    Moderate,
    /// Deletes, sends, or runs arbitrary commands
    Destructive,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Destructive => "destructive",
        }
    }

    /// Residual-risk contribution used by the quality gate.
    pub fn weight(&self) -> f64 {
        match self {
            RiskLevel::Safe => 0.0,
            RiskLevel::Moderate => 0.5,
            RiskLevel::Destructive => 1.0,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" => Ok(RiskLevel::Safe),
            "moderate" => Ok(RiskLevel::Moderate),
            "destructive" => Ok(RiskLevel::Destructive),
            other => Err(DomainError::InvalidRiskLevel(other.to_string())),
        }
    }
}

/// Session-scoped identifier of a tool call (`s1-c3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToolCallId(String);

impl ToolCallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToolCallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Execution status of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Pending,
    Confirmed,
    Denied,
    Ok,
    Error,
    /// Not reached because an earlier call in the plan was denied
    Skipped,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Pending => "pending",
            CallStatus::Confirmed => "confirmed",
            CallStatus::Denied => "denied",
            CallStatus::Ok => "ok",
            CallStatus::Error => "error",
            CallStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::Denied | CallStatus::Ok | CallStatus::Error | CallStatus::Skipped
        )
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runtime tool call built from a [`PlannedCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: ToolCallId,
    /// Resolved tool name (`calendar.delete_event`)
    pub name: String,
    pub params: serde_json::Map<String, serde_json::Value>,
    pub risk: RiskLevel,
    pub status: CallStatus,
    pub retry_count: u32,
    pub independent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ToolResult>,
}

impl ToolCall {
    pub fn new(id: ToolCallId, name: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            id,
            name: name.into(),
            params: serde_json::Map::new(),
            risk,
            status: CallStatus::Pending,
            retry_count: 0,
            independent: false,
            outcome: None,
        }
    }

    /// Build from a plan entry whose name has already been resolved.
    pub fn from_planned(id: ToolCallId, planned: &PlannedCall, resolved_name: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            params: planned.params.clone(),
            independent: planned.independent,
            ..Self::new(id, resolved_name, risk)
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// External dependency this call hits: the name prefix before the first `.`.
    pub fn dependency(&self) -> &str {
        tool_class(&self.name)
    }

    /// Record an execution outcome.
    pub fn complete(&mut self, result: ToolResult) {
        self.status = if result.is_success() {
            CallStatus::Ok
        } else {
            CallStatus::Error
        };
        self.retry_count = result.metadata.attempts.saturating_sub(1);
        self.outcome = Some(result);
    }

    pub fn deny(&mut self) {
        self.status = CallStatus::Denied;
    }

    pub fn skip(&mut self) {
        self.status = CallStatus::Skipped;
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }

    /// Parameters rendered as `k=v` pairs for prompts and digests.
    pub fn params_display(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Tool class of a name: the prefix before the first `.`, or the whole name.
pub fn tool_class(name: &str) -> &str {
    name.split_once('.').map_or(name, |(class, _)| class)
}

/// Definition of a registered tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Fully qualified name (e.g., "fs.read_file")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Type hint (e.g., "string", "path", "number")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn class(&self) -> &str {
        tool_class(&self.name)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::value_objects::{ToolError, ToolResult};

    #[test]
    fn test_risk_level_order_and_weight() {
        assert!(RiskLevel::Safe < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::Destructive);
        assert_eq!(RiskLevel::Destructive.weight(), 1.0);
        assert_eq!(" Destructive ".parse::<RiskLevel>().unwrap(), RiskLevel::Destructive);
        assert!("critical".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("fs.read_file", "Read file contents")
            .with_parameter(ToolParameter::new("path", "File path to read", true).with_type("path"));

        assert_eq!(tool.class(), "fs");
        assert_eq!(tool.parameters.len(), 1);
        assert_eq!(tool.parameters[0].param_type, "path");
    }

    #[test]
    fn test_from_planned_and_dependency() {
        let planned = PlannedCall::new("delete_event").with_param("id", "evt-1").independent();
        let call = ToolCall::from_planned(
            ToolCallId::new("s-c1"),
            &planned,
            "calendar.delete_event",
            RiskLevel::Destructive,
        );

        assert_eq!(call.dependency(), "calendar");
        assert_eq!(call.get_string("id"), Some("evt-1"));
        assert!(call.independent);
        assert_eq!(call.status, CallStatus::Pending);
        assert_eq!(tool_class("standalone"), "standalone");
    }

    #[test]
    fn test_complete_sets_status_and_retries() {
        let mut call = ToolCall::new(ToolCallId::new("c1"), "mail.read_inbox", RiskLevel::Safe);
        let mut result = ToolResult::failure(call.id.clone(), &call.name, ToolError::timeout("mail.read_inbox"));
        result.metadata.attempts = 3;
        call.complete(result);

        assert_eq!(call.status, CallStatus::Error);
        assert_eq!(call.retry_count, 2);
        assert!(call.status.is_terminal());
    }

    #[test]
    fn test_params_display() {
        let call = ToolCall::new(ToolCallId::new("c1"), "calendar.delete_event", RiskLevel::Destructive)
            .with_param("id", "evt-1")
            .with_param("notify", true);
        assert_eq!(call.params_display(), "id=evt-1, notify=true");
    }
}
