//! Deterministic draft replies. Used for the draft tier and as the last
//! fallback, so it never returns an empty string.

use crate::core::string::truncate;
use crate::plan::Plan;
use crate::tool::{CallStatus, ToolCall};
use chrono::NaiveDateTime;
use serde_json::Value;

const MAX_OUTPUT_CHARS: usize = 300;

/// Render a reply from the plan and the turn's calls. `now` is local time.
pub fn render_draft(plan: &Plan, calls: &[ToolCall], now: NaiveDateTime) -> String {
    let mut lines: Vec<String> = calls.iter().filter_map(call_line).collect();

    if lines.is_empty() {
        lines.push(intent_line(plan, now));
    }

    lines.join("\n")
}

/// One plain sentence per failed, denied or skipped call.
pub fn failure_notices(calls: &[ToolCall]) -> Vec<String> {
    calls
        .iter()
        .filter(|c| matches!(c.status, CallStatus::Error | CallStatus::Denied | CallStatus::Skipped))
        .filter_map(call_line)
        .collect()
}

fn call_line(call: &ToolCall) -> Option<String> {
    match call.status {
        CallStatus::Ok => {
            let output = call
                .outcome
                .as_ref()
                .and_then(|r| r.output.as_ref())
                .map(render_output)
                .filter(|s| !s.is_empty());
            Some(match output {
                Some(output) => format!("{}: {}", call.name, output),
                None => format!("Done: {}.", call.name),
            })
        }
        CallStatus::Error => {
            let reason = call
                .outcome
                .as_ref()
                .and_then(|r| r.error())
                .map_or("something went wrong while running it", |e| e.user_reason());
            Some(format!("I couldn't run {} because {}.", call.name, reason))
        }
        CallStatus::Denied => Some(format!("Okay, I didn't run {}.", call.name)),
        CallStatus::Skipped => Some(format!(
            "I skipped {} because an earlier step was cancelled.",
            call.name
        )),
        CallStatus::Pending | CallStatus::Confirmed => None,
    }
}

fn render_output(output: &serde_json::Map<String, Value>) -> String {
    let rendered = output
        .iter()
        .map(|(key, value)| format!("{} {}", key, render_value(value)))
        .collect::<Vec<_>>()
        .join("; ");
    truncate(&rendered, MAX_OUTPUT_CHARS)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => "(none)".to_string(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, render_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

fn intent_line(plan: &Plan, now: NaiveDateTime) -> String {
    match plan.intent.as_str() {
        "greeting" => "Hello! How can I help?".to_string(),
        "farewell" => "Goodbye!".to_string(),
        "thanks" => "You're welcome.".to_string(),
        "time_query" => format!("It's {}.", now.format("%H:%M")),
        "date_query" => format!("Today is {}.", now.format("%A, %B %-d, %Y")),
        "help" => "I can work with your calendar, mail, browser, files and terminal. \
                   I always ask before doing anything destructive."
            .to_string(),
        "chitchat" => "I'm here. What would you like to do?".to_string(),
        "unknown" => "Sorry, I didn't understand that. Could you rephrase?".to_string(),
        _ => format!("I don't have a way to {} yet.", plan.intent.replace('_', " ")),
    }
}
