//! Structured output validation and repair.
//!
//! Turns the router backend's text into a typed [`Plan`]. The parser never
//! fails: shape errors are repaired deterministically, and text that cannot
//! be parsed at all degrades to [`Plan::unknown`].
//!
//! ```text
//! raw text ──parse──▶ JSON object ──coerce──▶ Plan
//!    │ fail                                    ▲
//!    ▼                                         │
//! strip fences + first balanced {…} ──parse────┘
//!    │ fail
//!    ▼
//! Plan::unknown()  (report.unrecoverable = true)
//! ```
//!
//! | Field | Repairs |
//! |-------|---------|
//! | `route` | exact → intent owner → synonym token → edit distance ≤ 2 → inferred from intent / tools |
//! | `intent` | exact → edit distance ≤ 2 → verb inference → tool suffix → route default |
//! | `tool_plan` | string, comma list, object, list of strings or objects |
//! | `confidence` | string numbers, percentages, clamped to `[0, 1]`, missing → 0.5 |
//! | `requires_confirmation` | string / numeric booleans |
//!
//! Every repair is recorded in the [`RepairReport`] so callers can log it.

use super::entities::{Plan, PlanSource, PlannedCall, Route};
use crate::core::string::{edit_distance, identifier_tokens, to_identifier};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Confidence assumed when the backend omits it.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const MAX_ROUTE_EDIT_DISTANCE: usize = 2;
const MAX_INTENT_EDIT_DISTANCE: usize = 2;

/// One repair applied while coercing backend output.
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    pub field: &'static str,
    pub detail: String,
}

impl Repair {
    fn new(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Repair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.detail)
    }
}

/// What the validator had to do to produce the plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub repairs: Vec<Repair>,
    /// The fence-strip / brace-extraction fallback was needed
    pub fallback_used: bool,
    /// Nothing parseable was found; the plan is the sentinel
    pub unrecoverable: bool,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty() && !self.fallback_used && !self.unrecoverable
    }

    fn push(&mut self, field: &'static str, detail: impl Into<String>) {
        self.repairs.push(Repair::new(field, detail));
    }
}

/// Validator output: always a plan, plus the report.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: Plan,
    pub report: RepairReport,
}

/// Parse and repair raw backend output into a plan. Never fails.
pub fn validate_plan_output(raw: &str) -> ValidatedPlan {
    let mut report = RepairReport::default();

    let object = match parse_object(raw.trim()) {
        Some(object) => Some(object),
        None => {
            report.fallback_used = true;
            let stripped = strip_code_fences(raw);
            extract_json_object(&stripped).and_then(|block| parse_object(&block))
        }
    };

    match object {
        Some(object) => {
            let plan = plan_from_object(&object, &mut report, true);
            ValidatedPlan { plan, report }
        }
        None => {
            report.unrecoverable = true;
            ValidatedPlan {
                plan: Plan::unknown(),
                report,
            }
        }
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Remove markdown code fences, keeping the fenced content.
pub fn strip_code_fences(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the first balanced `{…}` block, ignoring braces inside strings.
pub fn extract_json_object(raw: &str) -> Option<String> {
    let mut start = None;
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in raw.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if start.is_some() => in_string = true,
            '{' => {
                if start.is_none() {
                    start = Some(idx);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0
                    && let Some(s) = start
                {
                    return Some(raw[s..=idx].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn plan_from_object(object: &Map<String, Value>, report: &mut RepairReport, top_level: bool) -> Plan {
    let tool_plan = coerce_tool_plan(first_of(object, &["tool_plan", "tools", "tool_calls"]), report);
    let tool_names: Vec<&str> = tool_plan.iter().map(|c| c.tool.as_str()).collect();

    let raw_route = object.get("route").and_then(scalar_to_string);
    let raw_intent = object.get("intent").and_then(scalar_to_string);

    let route = resolve_route(raw_route.as_deref(), raw_intent.as_deref(), &tool_names, report);

    // A route value that was really an intent ("create_meeting") still
    // carries the verb, so it is a second intent candidate.
    let mut intent_candidates: Vec<&str> = Vec::new();
    if let Some(intent) = raw_intent.as_deref() {
        intent_candidates.push(intent);
    }
    if let Some(route_text) = raw_route.as_deref()
        && route_text.parse::<Route>().is_err()
    {
        intent_candidates.push(route_text);
    }
    let intent = resolve_intent(route, &intent_candidates, &tool_names, report);

    let slots = coerce_slots(first_of(object, &["slots", "entities"]), report);
    let confidence = coerce_confidence(object.get("confidence"), report);
    let requires_confirmation = coerce_bool(
        "requires_confirmation",
        first_of(object, &["requires_confirmation", "needs_confirmation", "confirm"]),
        report,
    );

    let alternatives = if top_level {
        coerce_alternatives(object.get("alternatives"), report)
    } else {
        Vec::new()
    };

    Plan {
        route,
        intent,
        slots,
        tool_plan,
        requires_confirmation,
        confidence,
        alternatives,
        source: PlanSource::Router,
    }
}

fn first_of<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| object.get(*k)).filter(|v| !v.is_null())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ==================== Route ====================

/// Token → route synonyms.
const ROUTE_SYNONYMS: &[(&str, Route)] = &[
    ("calendar", Route::Calendar),
    ("cal", Route::Calendar),
    ("meeting", Route::Calendar),
    ("meetings", Route::Calendar),
    ("event", Route::Calendar),
    ("events", Route::Calendar),
    ("schedule", Route::Calendar),
    ("appointment", Route::Calendar),
    ("agenda", Route::Calendar),
    ("reminder", Route::Calendar),
    ("mail", Route::Mail),
    ("email", Route::Mail),
    ("emails", Route::Mail),
    ("inbox", Route::Mail),
    ("message", Route::Mail),
    ("messages", Route::Mail),
    ("browser", Route::Browser),
    ("browse", Route::Browser),
    ("web", Route::Browser),
    ("website", Route::Browser),
    ("webpage", Route::Browser),
    ("page", Route::Browser),
    ("url", Route::Browser),
    ("internet", Route::Browser),
    ("file", Route::Filesystem),
    ("files", Route::Filesystem),
    ("fs", Route::Filesystem),
    ("folder", Route::Filesystem),
    ("directory", Route::Filesystem),
    ("dir", Route::Filesystem),
    ("document", Route::Filesystem),
    ("terminal", Route::Terminal),
    ("shell", Route::Terminal),
    ("command", Route::Terminal),
    ("bash", Route::Terminal),
    ("console", Route::Terminal),
    ("chat", Route::Smalltalk),
    ("chitchat", Route::Smalltalk),
    ("talk", Route::Smalltalk),
    ("greeting", Route::Smalltalk),
    ("conversation", Route::Smalltalk),
    ("system", Route::System),
    ("help", Route::System),
    ("time", Route::System),
    ("date", Route::System),
    ("clock", Route::System),
];

fn synonym_route(token: &str) -> Option<Route> {
    ROUTE_SYNONYMS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, route)| *route)
}

fn resolve_route(
    raw_route: Option<&str>,
    raw_intent: Option<&str>,
    tool_names: &[&str],
    report: &mut RepairReport,
) -> Route {
    if let Some(raw) = raw_route {
        let ident = to_identifier(raw);
        if let Ok(route) = ident.parse::<Route>() {
            if ident != raw {
                report.push("route", format!("normalized '{}' to '{}'", raw, route));
            }
            return route;
        }
        if let Some(route) = match_route_text(&ident) {
            report.push("route", format!("mapped '{}' to '{}'", raw, route));
            return route;
        }
    }

    if let Some(route) = raw_intent
        .map(to_identifier)
        .and_then(|intent| match_route_text(&intent))
    {
        report.push("route", format!("inferred '{}' from intent", route));
        return route;
    }

    if let Some(route) = tool_names.iter().find_map(|name| route_for_tool(name)) {
        report.push("route", format!("inferred '{}' from tool plan", route));
        return route;
    }

    if let Some(raw) = raw_route {
        report.push("route", format!("unrecognized '{}', using 'unknown'", raw));
    } else {
        report.push("route", "missing, using 'unknown'");
    }
    Route::Unknown
}

/// Near-miss mapping of free text onto a route.
fn match_route_text(ident: &str) -> Option<Route> {
    if let Some(route) = Route::owning_intent(ident) {
        return Some(route);
    }
    if let Some(route) = identifier_tokens(ident).iter().find_map(|t| synonym_route(t)) {
        return Some(route);
    }
    Route::ALL
        .into_iter()
        .filter(|r| r.as_str().len() > MAX_ROUTE_EDIT_DISTANCE + 1)
        .map(|r| (edit_distance(ident, r.as_str()), r))
        .filter(|(d, _)| *d <= MAX_ROUTE_EDIT_DISTANCE)
        .min_by_key(|(d, _)| *d)
        .map(|(_, r)| r)
}

/// Route implied by a tool name: `fs.read_file` → filesystem, `create_event` → calendar.
fn route_for_tool(name: &str) -> Option<Route> {
    match name.split_once('.') {
        Some((prefix, _)) => Route::from_tool_prefix(prefix),
        None => Route::owning_intent(name),
    }
}

// ==================== Intent ====================

/// Verb keyword groups → catalog verbs they may stand for.
const VERB_GROUPS: &[(&[&str], &[&str])] = &[
    (&["create", "add", "new", "make", "book", "schedule", "set"], &["create"]),
    (&["list", "show", "get", "view", "check", "what", "whats"], &["list", "read"]),
    (&["read", "open", "fetch", "cat"], &["read", "open", "list"]),
    (&["delete", "remove", "cancel", "drop", "erase", "trash", "rm"], &["delete"]),
    (&["update", "move", "reschedule", "change", "edit", "rename"], &["update"]),
    (&["send", "reply", "forward"], &["send"]),
    (&["compose", "draft", "write"], &["compose", "write"]),
    (&["search", "find", "lookup", "google"], &["search"]),
    (&["run", "execute", "exec", "launch"], &["run"]),
    (&["visit", "goto", "navigate", "browse"], &["open"]),
];

fn resolve_intent(
    route: Route,
    candidates: &[&str],
    tool_names: &[&str],
    report: &mut RepairReport,
) -> String {
    for raw in candidates {
        let ident = to_identifier(raw);
        if route.has_intent(&ident) {
            if ident != *raw {
                report.push("intent", format!("normalized '{}' to '{}'", raw, ident));
            }
            return ident;
        }
    }

    for raw in candidates {
        let ident = to_identifier(raw);
        if let Some(intent) = fuzzy_intent(route, &ident) {
            report.push("intent", format!("mapped '{}' to '{}'", raw, intent));
            return intent.to_string();
        }
        if let Some(intent) = verb_intent(route, &ident) {
            report.push("intent", format!("inferred '{}' from '{}'", intent, raw));
            return intent.to_string();
        }
    }

    for name in tool_names.iter().copied() {
        let suffix = name.rsplit('.').next().unwrap_or(name);
        let intent = if route.has_intent(suffix) {
            Some(suffix)
        } else {
            verb_intent(route, suffix)
        };
        if let Some(intent) = intent {
            report.push("intent", format!("inferred '{}' from tool '{}'", intent, name));
            return intent.to_string();
        }
    }

    let fallback = route.default_intent();
    if route != Route::Unknown || !candidates.is_empty() {
        report.push("intent", format!("defaulted to '{}'", fallback));
    }
    fallback.to_string()
}

fn fuzzy_intent(route: Route, ident: &str) -> Option<&'static str> {
    route
        .intents()
        .iter()
        .map(|intent| (edit_distance(ident, intent), *intent))
        .filter(|(d, _)| *d <= MAX_INTENT_EDIT_DISTANCE)
        .min_by_key(|(d, _)| *d)
        .map(|(_, intent)| intent)
}

fn verb_intent(route: Route, ident: &str) -> Option<&'static str> {
    let tokens = identifier_tokens(ident);
    let verb = tokens.first()?;
    let (_, catalog_verbs) = VERB_GROUPS
        .iter()
        .find(|(keywords, _)| keywords.contains(&verb.as_str()))?;

    catalog_verbs.iter().find_map(|catalog_verb| {
        let prefix = format!("{}_", catalog_verb);
        route
            .intents()
            .iter()
            .find(|intent| intent.starts_with(&prefix))
            .copied()
    })
}

// ==================== Tool plan ====================

fn coerce_tool_plan(value: Option<&Value>, report: &mut RepairReport) -> Vec<PlannedCall> {
    let Some(value) = value else {
        return Vec::new();
    };

    match value {
        Value::String(s) => {
            let calls: Vec<PlannedCall> = split_tool_names(s).into_iter().map(PlannedCall::new).collect();
            if !calls.is_empty() {
                report.push("tool_plan", "coerced string to list");
            }
            calls
        }
        Value::Object(object) => {
            report.push("tool_plan", "coerced object to list");
            planned_call_from_object(object, report).into_iter().collect()
        }
        Value::Array(items) => {
            let mut calls = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => calls.extend(split_tool_names(s).into_iter().map(PlannedCall::new)),
                    Value::Object(object) => calls.extend(planned_call_from_object(object, report)),
                    other => report.push("tool_plan", format!("dropped non-call entry {}", other)),
                }
            }
            calls
        }
        other => {
            report.push("tool_plan", format!("dropped unusable value {}", other));
            Vec::new()
        }
    }
}

fn split_tool_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn planned_call_from_object(object: &Map<String, Value>, report: &mut RepairReport) -> Option<PlannedCall> {
    let Some(name) = first_of(object, &["tool", "name", "tool_name"])
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    else {
        report.push("tool_plan", "dropped entry without a tool name");
        return None;
    };

    let mut call = PlannedCall::new(name);
    match first_of(object, &["params", "parameters", "args", "arguments"]) {
        Some(Value::Object(params)) => call.params = params.clone(),
        Some(Value::String(text)) => match parse_object(text) {
            Some(params) => {
                report.push("tool_plan", format!("parsed string params for '{}'", call.tool));
                call.params = params;
            }
            None => report.push("tool_plan", format!("dropped unparseable params for '{}'", call.tool)),
        },
        Some(_) => report.push("tool_plan", format!("dropped non-object params for '{}'", call.tool)),
        None => {}
    }
    call.independent = object
        .get("independent")
        .map(|v| coerce_bool("independent", Some(v), report))
        .unwrap_or(false);
    Some(call)
}

// ==================== Scalars ====================

fn coerce_slots(value: Option<&Value>, report: &mut RepairReport) -> BTreeMap<String, Value> {
    match value {
        None => BTreeMap::new(),
        Some(Value::Object(map)) => {
            let mut slots = BTreeMap::new();
            for (key, value) in map {
                let key = key.trim().to_string();
                if key.is_empty() || value.is_null() {
                    continue;
                }
                slots.entry(key).or_insert_with(|| value.clone());
            }
            slots
        }
        Some(other) => {
            report.push("slots", format!("dropped non-object value {}", other));
            BTreeMap::new()
        }
    }
}

fn coerce_confidence(value: Option<&Value>, report: &mut RepairReport) -> f64 {
    let parsed = match value {
        None | Some(Value::Null) => {
            report.push("confidence", format!("missing, using {}", DEFAULT_CONFIDENCE));
            return DEFAULT_CONFIDENCE;
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let text = s.trim();
            let parsed = match text.strip_suffix('%') {
                Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p / 100.0),
                None => text.parse::<f64>().ok(),
            };
            if parsed.is_some() {
                report.push("confidence", format!("parsed string '{}'", s));
            }
            parsed
        }
        Some(_) => None,
    };

    match parsed {
        Some(c) if c.is_finite() => {
            let scaled = if c > 1.0 && c <= 100.0 {
                report.push("confidence", format!("scaled percentage {}", c));
                c / 100.0
            } else {
                c
            };
            let clamped = scaled.clamp(0.0, 1.0);
            if clamped != scaled {
                report.push("confidence", format!("clamped {} to {}", scaled, clamped));
            }
            clamped
        }
        _ => {
            report.push("confidence", format!("unusable value, using {}", DEFAULT_CONFIDENCE));
            DEFAULT_CONFIDENCE
        }
    }
}

fn coerce_bool(field: &'static str, value: Option<&Value>, report: &mut RepairReport) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => {
            report.push(field, "coerced number to boolean");
            n.as_f64().is_some_and(|f| f != 0.0)
        }
        Some(Value::String(s)) => {
            report.push(field, format!("coerced string '{}' to boolean", s));
            matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "y" | "1")
        }
        Some(_) => {
            report.push(field, "unusable value, using false");
            false
        }
    }
}

fn coerce_alternatives(value: Option<&Value>, report: &mut RepairReport) -> Vec<Plan> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(object) => {
                    let mut nested = RepairReport::default();
                    let plan = plan_from_object(object, &mut nested, false);
                    if !nested.repairs.is_empty() {
                        report.push("alternatives", format!("{} repair(s) in alternative", nested.repairs.len()));
                    }
                    (!plan.is_unknown()).then_some(plan)
                }
                _ => {
                    report.push("alternatives", "dropped non-object alternative");
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            report.push("alternatives", "dropped non-list value");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_plan_has_clean_report() {
        let raw = r#"{"route":"calendar","intent":"delete_event","slots":{"title":"standup"},
            "tool_plan":[{"tool":"calendar.delete_event","params":{"id":"evt-1"}}],
            "requires_confirmation":false,"confidence":0.9}"#;
        let validated = validate_plan_output(raw);

        assert!(validated.report.is_clean(), "{:?}", validated.report);
        let plan = validated.plan;
        assert_eq!(plan.route, Route::Calendar);
        assert_eq!(plan.intent, "delete_event");
        assert_eq!(plan.tool_names(), vec!["calendar.delete_event"]);
        assert_eq!(plan.tool_plan[0].params["id"], "evt-1");
        assert_eq!(plan.confidence, 0.9);
        assert_eq!(plan.source, PlanSource::Router);
    }

    #[test]
    fn test_route_synonym_and_string_tool_plan_repaired() {
        let validated = validate_plan_output(r#"{"route": "create_meeting", "tool_plan": "create_event"}"#);
        let plan = validated.plan;

        assert_eq!(plan.route, Route::Calendar);
        assert_eq!(plan.intent, "create_event");
        assert_eq!(plan.tool_names(), vec!["create_event"]);
        assert!(validated.report.repairs.iter().any(|r| r.field == "route"));
        assert!(validated.report.repairs.iter().any(|r| r.field == "tool_plan"));
        assert!(!validated.report.unrecoverable);
    }

    #[test]
    fn test_markdown_fenced_json() {
        let raw = "Sure! Here is the plan:\n```json\n{\"route\":\"mail\",\"intent\":\"read_inbox\",\"confidence\":0.8}\n```\nAnything else?";
        let validated = validate_plan_output(raw);

        assert!(validated.report.fallback_used);
        assert_eq!(validated.plan.route, Route::Mail);
        assert_eq!(validated.plan.intent, "read_inbox");
    }

    #[test]
    fn test_brace_inside_string_does_not_end_block() {
        let raw = r#"noise {"route":"terminal","slots":{"command":"echo }"},"confidence":1} trailing"#;
        let validated = validate_plan_output(raw);
        assert_eq!(validated.plan.route, Route::Terminal);
        assert_eq!(validated.plan.slots["command"], "echo }");
    }

    #[test]
    fn test_garbage_degrades_to_unknown() {
        for raw in ["", "not json at all", "{\"route\": ", "[1,2,3]", "```\n```"] {
            let validated = validate_plan_output(raw);
            assert!(validated.plan.is_unknown(), "input {:?}", raw);
            assert_eq!(validated.plan.confidence, 0.0);
            assert!(validated.report.unrecoverable);
        }
    }

    #[test]
    fn test_wrong_enum_values() {
        let plan = validate_plan_output(r#"{"route":"Calender","intent":"list-events","confidence":0.7}"#).plan;
        assert_eq!(plan.route, Route::Calendar);
        assert_eq!(plan.intent, "list_events");

        let plan = validate_plan_output(r#"{"route":"weather","intent":"forecast","confidence":0.7}"#).plan;
        assert_eq!(plan.route, Route::Unknown);
        assert_eq!(plan.intent, "unknown");
    }

    #[test]
    fn test_route_inferred_from_intent_and_tools() {
        let plan = validate_plan_output(r#"{"intent":"send_email","confidence":0.9}"#).plan;
        assert_eq!(plan.route, Route::Mail);
        assert_eq!(plan.intent, "send_email");

        let plan = validate_plan_output(r#"{"tool_plan":["fs.read_file"]}"#).plan;
        assert_eq!(plan.route, Route::Filesystem);
        assert_eq!(plan.intent, "read_file");
    }

    #[test]
    fn test_intent_verb_inference() {
        let plan = validate_plan_output(r#"{"route":"calendar","intent":"remove_meeting"}"#).plan;
        assert_eq!(plan.intent, "delete_event");

        let plan = validate_plan_output(r#"{"route":"filesystem","intent":"show contents"}"#).plan;
        assert_eq!(plan.intent, "list_directory");
    }

    #[test]
    fn test_tool_plan_shapes() {
        let plan = validate_plan_output(r#"{"route":"mail","tool_plan":"mail.read_inbox, mail.send_email"}"#).plan;
        assert_eq!(plan.tool_names(), vec!["mail.read_inbox", "mail.send_email"]);

        let plan = validate_plan_output(
            r#"{"route":"mail","tool_plan":{"name":"mail.send_email","arguments":"{\"to\":\"a@b.io\"}"}}"#,
        )
        .plan;
        assert_eq!(plan.tool_names(), vec!["mail.send_email"]);
        assert_eq!(plan.tool_plan[0].params["to"], "a@b.io");

        let plan = validate_plan_output(
            r#"{"route":"filesystem","tool_plan":[{"tool":"fs.read_file","args":{"path":"a"},"independent":true},{"params":{}},42,"fs.list_directory"]}"#,
        )
        .plan;
        assert_eq!(plan.tool_names(), vec!["fs.read_file", "fs.list_directory"]);
        assert!(plan.tool_plan[0].independent);
        assert!(!plan.tool_plan[1].independent);
    }

    #[test]
    fn test_confidence_coercion() {
        let cases = [
            (r#""0.8""#, 0.8),
            (r#""85%""#, 0.85),
            ("85", 0.85),
            ("-2", 0.0),
            ("250", 1.0),
            (r#""high""#, DEFAULT_CONFIDENCE),
        ];
        for (raw, expected) in cases {
            let text = format!(r#"{{"route":"system","intent":"help","confidence":{}}}"#, raw);
            let plan = validate_plan_output(&text).plan;
            assert!((plan.confidence - expected).abs() < 1e-9, "{} → {}", raw, plan.confidence);
        }

        let plan = validate_plan_output(r#"{"route":"system","intent":"help"}"#).plan;
        assert_eq!(plan.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_requires_confirmation_coercion() {
        let plan = validate_plan_output(r#"{"route":"terminal","requires_confirmation":"yes"}"#).plan;
        assert!(plan.requires_confirmation);
        let plan = validate_plan_output(r#"{"route":"terminal","requires_confirmation":"false"}"#).plan;
        assert!(!plan.requires_confirmation);
        let plan = validate_plan_output(r#"{"route":"terminal","requires_confirmation":1}"#).plan;
        assert!(plan.requires_confirmation);
    }

    #[test]
    fn test_alternatives_validated() {
        let raw = r#"{"route":"calendar","intent":"list_events","confidence":0.4,
            "alternatives":[{"route":"mail","intent":"read_inbox","confidence":0.3},
                            {"route":"nonsense"}, "bogus"]}"#;
        let validated = validate_plan_output(raw);
        let plan = validated.plan;
        assert_eq!(plan.alternatives.len(), 1);
        assert_eq!(plan.alternatives[0].route, Route::Mail);
        assert!(plan.alternatives[0].alternatives.is_empty());
        assert!(validated.report.repairs.iter().any(|r| r.field == "alternatives"));
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("x {\"a\":{\"b\":1}} y").as_deref(), Some("{\"a\":{\"b\":1}}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("{ unbalanced"), None);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
    }
}
