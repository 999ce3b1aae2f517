//! Prompt template for reply generation

use crate::core::string::truncate;
use crate::plan::Plan;
use crate::tool::{CallStatus, ToolCall};

const MAX_OUTPUT_CHARS: usize = 2000;

/// Templates for the finalization tiers
pub struct FinalizePromptTemplate;

impl FinalizePromptTemplate {
    pub fn system() -> &'static str {
        r#"You are a concise personal assistant writing the reply to the user.
Use only facts present in the tool results, the conversation or the request.
Never invent names, numbers, times, email addresses or links.
If a tool failed, say so in one plain sentence. Never show JSON or error codes."#
    }

    pub fn reply(utterance: &str, plan: &Plan, calls: &[ToolCall], summary: &str) -> String {
        let results = if calls.is_empty() {
            "(no tools were run)".to_string()
        } else {
            calls.iter().map(describe_call).collect::<Vec<_>>().join("\n")
        };

        let summary = if summary.trim().is_empty() { "(none)" } else { summary };

        format!(
            r#"{system}

## Conversation so far

{summary}

## Request

{utterance}

## Understood as

{route} / {intent}

## Tool results

{results}

Write the reply now, in plain prose."#,
            system = Self::system(),
            summary = summary,
            utterance = utterance.trim(),
            route = plan.route,
            intent = plan.intent,
            results = results,
        )
    }
}

fn describe_call(call: &ToolCall) -> String {
    match call.status {
        CallStatus::Ok => {
            let output = call
                .outcome
                .as_ref()
                .map(|r| r.output_text())
                .unwrap_or_default();
            format!("- {} succeeded: {}", call.name, truncate(&output, MAX_OUTPUT_CHARS))
        }
        CallStatus::Error => {
            let reason = call
                .outcome
                .as_ref()
                .and_then(|r| r.error())
                .map(|e| e.user_reason())
                .unwrap_or("it failed");
            format!("- {} failed ({})", call.name, reason)
        }
        status => format!("- {} {}", call.name, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Route;
    use crate::tool::{RiskLevel, ToolCallId, ToolResult};

    #[test]
    fn test_reply_prompt_carries_results() {
        let mut call = ToolCall::new(ToolCallId::new("c1"), "fs.read_file", RiskLevel::Safe);
        let mut output = serde_json::Map::new();
        output.insert("content".into(), "hello".into());
        call.complete(ToolResult::success(call.id.clone(), "fs.read_file", output));

        let plan = Plan::new(Route::Filesystem, "read_file");
        let prompt = FinalizePromptTemplate::reply("read notes", &plan, &[call], "");

        assert!(prompt.contains("filesystem / read_file"));
        assert!(prompt.contains("fs.read_file succeeded"));
        assert!(prompt.contains("hello"));
        assert!(prompt.contains("Never invent"));
    }

    #[test]
    fn test_reply_prompt_without_tools() {
        let plan = Plan::new(Route::Smalltalk, "chitchat");
        let prompt = FinalizePromptTemplate::reply("how are you", &plan, &[], "user: hi");
        assert!(prompt.contains("(no tools were run)"));
        assert!(prompt.contains("user: hi"));
    }
}
