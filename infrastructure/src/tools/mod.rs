//! Built-in tool collaborators
//!
//! Concrete implementations of the [`Tool`](steward_application::Tool) port
//! that work on the local machine:
//!
//! | Tool | Module |
//! |------|--------|
//! | `fs.read_file`, `fs.list_directory`, `fs.write_file`, `fs.delete_file` | [`file`] |
//! | `terminal.run_command` | [`command`] |
//!
//! Calendar, mail and browser tools are external collaborators; they plug in
//! through [`ToolRegistry::register`] the same way.

pub mod command;
pub mod file;

mod params;
mod registry;

pub use command::RunCommandTool;
pub use file::{DeleteFileTool, ListDirectoryTool, ReadFileTool, WriteFileTool};
pub use registry::ToolRegistry;

use std::path::Path;

/// Registry with the built-in tools rooted at `root`.
///
/// `terminal.run_command` is only registered when `allow_commands` is set.
pub fn builtin_registry(root: &Path, allow_commands: bool) -> ToolRegistry {
    let registry = ToolRegistry::new()
        .register(ReadFileTool::new(root))
        .register(ListDirectoryTool::new(root))
        .register(WriteFileTool::new(root))
        .register(DeleteFileTool::new(root));

    if allow_commands {
        registry.register(RunCommandTool::new(root))
    } else {
        registry
    }
}
