//! Typed access to a tool's JSON parameters.

use serde_json::{Map, Value};
use steward_domain::tool::ToolError;

pub(crate) fn require_str<'a>(params: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    match params.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ToolError::invalid_argument(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
        None => Err(ToolError::invalid_argument(format!("missing required parameter '{}'", key))),
    }
}

/// Accepts numbers and numeric strings.
pub(crate) fn optional_u64(params: &Map<String, Value>, key: &str) -> Result<Option<u64>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| ToolError::invalid_argument(format!("'{}' must be a non-negative integer", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ToolError::invalid_argument(format!("'{}' must be a non-negative integer", key))),
        Some(other) => Err(ToolError::invalid_argument(format!("'{}' must be a number, got {}", key, other))),
    }
}

pub(crate) fn optional_bool(params: &Map<String, Value>, key: &str) -> Result<Option<bool>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" => Ok(Some(true)),
            "false" | "no" => Ok(Some(false)),
            _ => Err(ToolError::invalid_argument(format!("'{}' must be true or false", key))),
        },
        Some(other) => Err(ToolError::invalid_argument(format!("'{}' must be a boolean, got {}", key, other))),
    }
}
