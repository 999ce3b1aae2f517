//! Tool domain traits
//!
//! Pure validation of a call's parameters against a tool definition. The
//! async tool port lives in the application layer.

use super::entities::{ToolCall, ToolDefinition};
use super::value_objects::ToolError;

/// Validator for tool calls
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolError>;
}

/// Checks required parameters are present. Unknown parameters are allowed
/// unless `strict` is set, since router output often carries extras.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator {
    pub strict: bool,
}

impl DefaultToolValidator {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ToolError> {
        for param in &definition.parameters {
            let present = call.params.get(&param.name).is_some_and(|v| !v.is_null());
            if param.required && !present {
                return Err(ToolError::invalid_argument(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    param.name, definition.name
                )));
            }
        }

        if self.strict {
            for arg_name in call.params.keys() {
                if !definition.parameters.iter().any(|p| &p.name == arg_name) {
                    return Err(ToolError::invalid_argument(format!(
                        "Unknown parameter '{}' for tool '{}'",
                        arg_name, definition.name
                    )));
                }
            }
        }

        Ok(())
    }
}
