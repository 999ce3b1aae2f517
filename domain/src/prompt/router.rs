//! Prompt templates for intent routing

use crate::plan::Route;
use crate::tool::ToolDefinition;

/// What the router knows about the turn besides the utterance.
#[derive(Debug, Clone, Default)]
pub struct RouterContext<'a> {
    /// Rolling dialog summary, oldest first
    pub summary: &'a str,
    pub turn_number: u64,
    /// Low-confidence route guess from the fast path
    pub hint: Option<Route>,
}

/// Templates for the router and its repair pass
pub struct RouterPromptTemplate;

impl RouterPromptTemplate {
    /// Classification prompt. Lists every route with its intent catalog and
    /// every registered tool, then asks for a single JSON object.
    pub fn classify(utterance: &str, tools: &[ToolDefinition], context: &RouterContext<'_>) -> String {
        let routes = Route::ALL
            .iter()
            .map(|r| format!("- {}: {}", r, r.intents().join(", ")))
            .collect::<Vec<_>>()
            .join("\n");

        let tool_list = if tools.is_empty() {
            "(none)".to_string()
        } else {
            tools
                .iter()
                .map(|t| {
                    let params = t
                        .parameters
                        .iter()
                        .map(|p| if p.required { format!("{}*", p.name) } else { p.name.clone() })
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("- {}({}): {}", t.name, params, t.description)
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let summary = if context.summary.trim().is_empty() {
            "(new conversation)"
        } else {
            context.summary
        };

        let hint = context
            .hint
            .map(|r| format!("\nA keyword scan suggests the route may be \"{}\".\n", r))
            .unwrap_or_default();

        format!(
            r#"You route requests for a personal assistant. Pick exactly one route and one intent from its list.

## Routes and intents

{routes}

## Tools (* = required parameter)

{tool_list}

## Conversation so far (turn {turn})

{summary}
{hint}
## Request

{utterance}

## Output

Reply with one JSON object and nothing else:
{{"route": "<route>", "intent": "<intent>", "slots": {{}}, "tool_plan": [{{"tool": "<tool name>", "params": {{}}, "independent": false}}], "requires_confirmation": false, "confidence": 0.0, "alternatives": []}}
Use an empty tool_plan when no tool is needed. List up to two other plausible readings in alternatives."#,
            routes = routes,
            tool_list = tool_list,
            turn = context.turn_number,
            summary = summary,
            hint = hint,
            utterance = utterance.trim(),
        )
    }

    /// Secondary repair pass: ask the backend to re-emit its output as valid JSON.
    pub fn repair(raw_output: &str) -> String {
        format!(
            r#"The text below was supposed to be a single JSON object with the keys route, intent, slots, tool_plan, requires_confirmation and confidence, but it could not be parsed.

---
{}
---

Rewrite it as one valid JSON object. Keep the same meaning. Output only the JSON."#,
            raw_output.trim()
        )
    }
}
