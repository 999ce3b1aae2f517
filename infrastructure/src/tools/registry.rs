//! Tool Registry
//!
//! The [`ToolRegistry`] is the closed name → capability map handed to the
//! execution engine. It is assembled once at startup and never mutated
//! afterwards; risk tags are not part of it (see the risk registry).
//!
//! # Usage
//!
//! ```ignore
//! use steward_infrastructure::tools::{ToolRegistry, ReadFileTool};
//!
//! let registry = ToolRegistry::new()
//!     .register(ReadFileTool::new("/home/me"));
//!
//! assert!(registry.has_tool("fs.read_file"));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use steward_application::ports::tool_catalog::{Tool, ToolCatalog};
use steward_domain::tool::ToolDefinition;
use tracing::{debug, warn};

/// Closed registry of tool collaborators.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration under the same name wins.
    pub fn register<T: Tool + 'static>(self, tool: T) -> Self {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        let name = tool.definition().name.clone();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!("Tool {} registered twice; keeping the later one", name);
        } else {
            debug!("Registered tool {}", name);
        }
        self
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolCatalog for ToolRegistry {
    fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ListDirectoryTool, ReadFileTool};
    use steward_domain::plan::Route;

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .register(ReadFileTool::new("/tmp"))
            .register(ListDirectoryTool::new("/tmp"))
    }

    #[test]
    fn test_definitions_sorted_by_name() {
        let names: Vec<String> = registry().definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["fs.list_directory", "fs.read_file"]);
    }

    #[test]
    fn test_resolve_short_name_by_route() {
        let registry = registry();
        assert_eq!(registry.resolve("read_file", Route::Filesystem), "fs.read_file");
        assert_eq!(registry.resolve("fs.read_file", Route::Mail), "fs.read_file");
        assert_eq!(registry.resolve("send_email", Route::Mail), "send_email");
        assert!(registry.get("fs.delete_file").is_none());
    }

    #[test]
    fn test_duplicate_registration_keeps_one() {
        let registry = registry().register(ReadFileTool::new("/var"));
        assert_eq!(registry.len(), 2);
    }
}
