//! Tool collaborator port
//!
//! Tools are registered in a closed name → capability catalog. Risk tags are
//! not part of a tool; they come from the risk registry.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use steward_domain::plan::Route;
use steward_domain::tool::{ToolDefinition, ToolError};

/// One external capability (`fs.read_file`, `calendar.delete_event`, ...).
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    async fn execute(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ToolError>;
}

/// Closed registry of tools.
pub trait ToolCatalog: Send + Sync {
    fn get(&self, name: &str) -> Option<Arc<dyn Tool>>;

    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Resolve a planned tool name to a registered one.
    ///
    /// Accepts the fully qualified name, or a bare name qualified with the
    /// route's tool prefix (`delete_event` on the calendar route becomes
    /// `calendar.delete_event`). Unresolvable names are returned unchanged
    /// so they fail as `not_found` at execution.
    fn resolve(&self, name: &str, route: Route) -> String {
        if self.get(name).is_some() || name.contains('.') {
            return name.to_string();
        }
        if let Some(prefix) = route.tool_prefix() {
            let qualified = format!("{}.{}", prefix, name);
            if self.get(&qualified).is_some() {
                return qualified;
            }
        }
        name.to_string()
    }
}
