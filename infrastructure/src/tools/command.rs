//! Command execution tool: terminal.run_command
//!
//! Runs through `sh -c` (or `cmd /C`) inside the sandbox root. The child is
//! killed when the future is dropped, so the execution engine's timeout
//! also stops the process.

use super::file::resolve_path;
use super::params::require_str;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process::Stdio;
use steward_application::ports::tool_catalog::Tool;
use steward_domain::core::string::truncate;
use steward_domain::tool::{ToolDefinition, ToolError, ToolParameter};
use tokio::process::Command;
use tracing::debug;

/// Tool name constant
pub const RUN_COMMAND: &str = "terminal.run_command";

/// Per-stream output limit, in bytes
const MAX_OUTPUT_CHARS: usize = 16 * 1024;

pub struct RunCommandTool {
    root: PathBuf,
    definition: ToolDefinition,
}

impl RunCommandTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            definition: ToolDefinition::new(RUN_COMMAND, "Run a shell command and return its output")
                .with_parameter(ToolParameter::new("command", "The command line to run", true).with_type("string"))
                .with_parameter(
                    ToolParameter::new("working_dir", "Directory to run in, inside the workspace", false)
                        .with_type("path"),
                ),
        }
    }

    fn shell(command: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        }
    }
}

#[async_trait]
impl Tool for RunCommandTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        let command = require_str(&params, "command")?;
        if command.trim().is_empty() {
            return Err(ToolError::invalid_argument("command is empty"));
        }

        let dir = match params.get("working_dir").and_then(Value::as_str) {
            Some(raw) => resolve_path(&self.root, raw)?,
            None => self.root.clone(),
        };
        if !dir.is_dir() {
            return Err(ToolError::not_found(format!("working directory {}", dir.display())));
        }

        debug!("Running `{}` in {}", command, dir.display());
        let output = Self::shell(command)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::failed(format!("Failed to spawn command: {}", e)))?;

        // A non-zero exit is reported, not treated as a tool failure
        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = truncate(String::from_utf8_lossy(&output.stdout).trim_end(), MAX_OUTPUT_CHARS);
        let stderr = truncate(String::from_utf8_lossy(&output.stderr).trim_end(), MAX_OUTPUT_CHARS);

        let mut result = Map::new();
        result.insert("exit_code".into(), Value::from(exit_code));
        result.insert("stdout".into(), Value::String(stdout));
        if !stderr.is_empty() {
            result.insert("stderr".into(), Value::String(stderr));
        }
        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use steward_domain::tool::ErrorKind;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_runs_in_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let tool = RunCommandTool::new(dir.path());

        let out = tool.execute(params(json!({"command": "ls"}))).await.unwrap();
        assert_eq!(out["exit_code"], 0);
        assert_eq!(out["stdout"], "marker.txt");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let tool = RunCommandTool::new(dir.path());

        let out = tool
            .execute(params(json!({"command": "echo oops >&2; exit 3"})))
            .await
            .unwrap();
        assert_eq!(out["exit_code"], 3);
        assert_eq!(out["stderr"], "oops");
    }

    #[tokio::test]
    async fn test_working_dir_outside_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tool = RunCommandTool::new(dir.path());

        let err = tool
            .execute(params(json!({"command": "ls", "working_dir": "../"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PermissionDenied);
    }
}
