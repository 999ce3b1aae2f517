//! Plan entities: the structured decision derived from one utterance.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Top-level route of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Calendar,
    Mail,
    Browser,
    Filesystem,
    Terminal,
    Smalltalk,
    System,
    Unknown,
}

impl Route {
    /// Every route, in prompt order.
    pub const ALL: [Route; 8] = [
        Route::Calendar,
        Route::Mail,
        Route::Browser,
        Route::Filesystem,
        Route::Terminal,
        Route::Smalltalk,
        Route::System,
        Route::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Calendar => "calendar",
            Route::Mail => "mail",
            Route::Browser => "browser",
            Route::Filesystem => "filesystem",
            Route::Terminal => "terminal",
            Route::Smalltalk => "smalltalk",
            Route::System => "system",
            Route::Unknown => "unknown",
        }
    }

    /// Intent catalog for this route. The first entry is the default intent.
    pub fn intents(&self) -> &'static [&'static str] {
        match self {
            Route::Calendar => &["list_events", "create_event", "update_event", "delete_event"],
            Route::Mail => &["read_inbox", "compose_email", "send_email", "delete_email"],
            Route::Browser => &["open_page", "search_web"],
            Route::Filesystem => &["list_directory", "read_file", "write_file", "delete_file"],
            Route::Terminal => &["run_command"],
            Route::Smalltalk => &["chitchat", "greeting", "farewell", "thanks"],
            Route::System => &["help", "time_query", "date_query"],
            Route::Unknown => &["unknown"],
        }
    }

    pub fn default_intent(&self) -> &'static str {
        self.intents()[0]
    }

    pub fn has_intent(&self, intent: &str) -> bool {
        self.intents().contains(&intent)
    }

    /// Tool-name prefix used by this route's tools, if it has any.
    pub fn tool_prefix(&self) -> Option<&'static str> {
        match self {
            Route::Calendar => Some("calendar"),
            Route::Mail => Some("mail"),
            Route::Browser => Some("browser"),
            Route::Filesystem => Some("fs"),
            Route::Terminal => Some("terminal"),
            Route::Smalltalk | Route::System | Route::Unknown => None,
        }
    }

    /// Find the route owning a tool-name prefix (`fs` → filesystem).
    pub fn from_tool_prefix(prefix: &str) -> Option<Route> {
        Route::ALL
            .into_iter()
            .find(|r| r.tool_prefix() == Some(prefix))
    }

    /// Find the route whose catalog contains the intent.
    pub fn owning_intent(intent: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.has_intent(intent))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Route {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::InvalidRoute(s.to_string()))
    }
}

/// Where a plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    FastPath,
    Router,
    /// Sentinel produced when the router or validator gave up
    Fallback,
}

/// One immutable entry of a plan's tool list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCall {
    pub tool: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    /// May run concurrently with adjacent independent calls
    #[serde(default)]
    pub independent: bool,
}

impl PlannedCall {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            params: serde_json::Map::new(),
            independent: false,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn independent(mut self) -> Self {
        self.independent = true;
        self
    }
}

/// The structured decision for a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub route: Route,
    pub intent: String,
    #[serde(default)]
    pub slots: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub tool_plan: Vec<PlannedCall>,
    /// Advisory only; the confirmation firewall owns the binding decision
    #[serde(default)]
    pub requires_confirmation: bool,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Plan>,
    pub source: PlanSource,
}

impl Plan {
    pub fn new(route: Route, intent: impl Into<String>) -> Self {
        Self {
            route,
            intent: intent.into(),
            slots: BTreeMap::new(),
            tool_plan: Vec::new(),
            requires_confirmation: false,
            confidence: 1.0,
            alternatives: Vec::new(),
            source: PlanSource::Router,
        }
    }

    /// The sentinel plan: `unknown` route, zero confidence, no tools.
    pub fn unknown() -> Self {
        Self {
            confidence: 0.0,
            source: PlanSource::Fallback,
            ..Self::new(Route::Unknown, "unknown")
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_slot(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }

    pub fn with_call(mut self, call: PlannedCall) -> Self {
        self.tool_plan.push(call);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_declared_confirmation(mut self, declared: bool) -> Self {
        self.requires_confirmation = declared;
        self
    }

    pub fn with_source(mut self, source: PlanSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_alternative(mut self, alternative: Plan) -> Self {
        self.alternatives.push(alternative);
        self
    }

    // ==================== Queries ====================

    pub fn is_unknown(&self) -> bool {
        self.route == Route::Unknown
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_plan.iter().map(|c| c.tool.as_str()).collect()
    }

    /// Short human label, used for menu options.
    pub fn label(&self) -> String {
        let intent = self.intent.replace('_', " ");
        match self.slots.values().find_map(|v| v.as_str()) {
            Some(detail) => format!("{} ({})", intent, detail),
            None => intent,
        }
    }
}
