//! Filesystem tools: fs.read_file, fs.list_directory, fs.write_file, fs.delete_file
//!
//! Every path is resolved against a sandbox root. Relative paths are joined
//! to it; absolute paths must already lie inside it; `..` is rejected.

use super::params::{optional_bool, optional_u64, require_str};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use steward_application::ports::tool_catalog::Tool;
use steward_domain::tool::{ToolDefinition, ToolError, ToolParameter};
use tracing::debug;

/// Tool name constants
pub const READ_FILE: &str = "fs.read_file";
pub const LIST_DIRECTORY: &str = "fs.list_directory";
pub const WRITE_FILE: &str = "fs.write_file";
pub const DELETE_FILE: &str = "fs.delete_file";

/// Maximum file size to read (1 MB)
const MAX_READ_SIZE: u64 = 1024 * 1024;

/// Maximum entries returned by a listing
const MAX_ENTRIES: usize = 200;

/// Resolve `raw` inside `root`.
pub(crate) fn resolve_path(root: &Path, raw: &str) -> Result<PathBuf, ToolError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ToolError::invalid_argument("path is empty"));
    }
    let candidate = Path::new(raw);
    if candidate.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ToolError::permission_denied(raw));
    }
    if candidate.is_absolute() {
        if candidate.starts_with(root) {
            Ok(candidate.to_path_buf())
        } else {
            Err(ToolError::permission_denied(raw))
        }
    } else {
        Ok(root.join(candidate))
    }
}

fn io_error(path: &str, e: std::io::Error) -> ToolError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ToolError::not_found(path),
        std::io::ErrorKind::PermissionDenied => ToolError::permission_denied(path),
        _ => ToolError::failed(format!("I/O error on {}: {}", path, e)),
    }
}

fn path_parameter(description: &str) -> ToolParameter {
    ToolParameter::new("path", description, true).with_type("path")
}

// ==================== fs.read_file ====================

pub struct ReadFileTool {
    root: PathBuf,
    definition: ToolDefinition,
}

impl ReadFileTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            definition: ToolDefinition::new(READ_FILE, "Read a text file")
                .with_parameter(path_parameter("File to read"))
                .with_parameter(
                    ToolParameter::new("limit", "Maximum number of lines to return", false).with_type("number"),
                ),
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        let raw = require_str(&params, "path")?;
        let path = resolve_path(&self.root, raw)?;

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| io_error(raw, e))?;
        if !metadata.is_file() {
            return Err(ToolError::invalid_argument(format!("'{}' is not a file", raw)));
        }
        if metadata.len() > MAX_READ_SIZE {
            return Err(ToolError::invalid_argument(format!(
                "File too large ({} bytes, limit {})",
                metadata.len(),
                MAX_READ_SIZE
            )));
        }

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| io_error(raw, e))?;
        let total_lines = content.lines().count();
        let content = match optional_u64(&params, "limit")? {
            Some(limit) => content.lines().take(limit as usize).collect::<Vec<_>>().join("\n"),
            None => content,
        };

        let mut output = Map::new();
        output.insert("path".into(), Value::String(raw.to_string()));
        output.insert("lines".into(), Value::from(total_lines));
        output.insert("content".into(), Value::String(content));
        Ok(output)
    }
}

// ==================== fs.list_directory ====================

pub struct ListDirectoryTool {
    root: PathBuf,
    definition: ToolDefinition,
}

impl ListDirectoryTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            definition: ToolDefinition::new(LIST_DIRECTORY, "List the entries of a directory")
                .with_parameter(ToolParameter::new("path", "Directory to list (default: .)", false).with_type("path")),
        }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        let raw = params.get("path").and_then(Value::as_str).unwrap_or(".");
        let path = if raw.trim() == "." {
            self.root.clone()
        } else {
            resolve_path(&self.root, raw)?
        };

        let mut reader = tokio::fs::read_dir(&path).await.map_err(|e| io_error(raw, e))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|e| io_error(raw, e))? {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                name.push('/');
            }
            entries.push(name);
        }
        entries.sort();
        let truncated = entries.len() > MAX_ENTRIES;
        entries.truncate(MAX_ENTRIES);

        let mut output = Map::new();
        output.insert("path".into(), Value::String(raw.to_string()));
        output.insert("entries".into(), Value::from(entries));
        if truncated {
            output.insert("truncated".into(), Value::Bool(true));
        }
        Ok(output)
    }
}

// ==================== fs.write_file ====================

pub struct WriteFileTool {
    root: PathBuf,
    definition: ToolDefinition,
}

impl WriteFileTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            definition: ToolDefinition::new(WRITE_FILE, "Write text to a file, replacing its contents")
                .with_parameter(path_parameter("File to write"))
                .with_parameter(ToolParameter::new("content", "Text to write", true).with_type("string"))
                .with_parameter(
                    ToolParameter::new("create_dirs", "Create missing parent directories", false).with_type("boolean"),
                ),
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        let raw = require_str(&params, "path")?;
        let content = require_str(&params, "content")?;
        let path = resolve_path(&self.root, raw)?;

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            if optional_bool(&params, "create_dirs")?.unwrap_or(false) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| io_error(raw, e))?;
            } else {
                return Err(ToolError::not_found(format!("parent directory of {}", raw)));
            }
        }

        tokio::fs::write(&path, content).await.map_err(|e| io_error(raw, e))?;
        debug!("Wrote {} bytes to {}", content.len(), path.display());

        let mut output = Map::new();
        output.insert("path".into(), Value::String(raw.to_string()));
        output.insert("bytes".into(), Value::from(content.len()));
        Ok(output)
    }
}

// ==================== fs.delete_file ====================

pub struct DeleteFileTool {
    root: PathBuf,
    definition: ToolDefinition,
}

impl DeleteFileTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            definition: ToolDefinition::new(DELETE_FILE, "Delete a file").with_parameter(path_parameter("File to delete")),
        }
    }
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        let raw = require_str(&params, "path")?;
        let path = resolve_path(&self.root, raw)?;

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| io_error(raw, e))?;
        if !metadata.is_file() {
            return Err(ToolError::invalid_argument(format!("'{}' is not a file", raw)));
        }
        tokio::fs::remove_file(&path).await.map_err(|e| io_error(raw, e))?;
        debug!("Deleted {}", path.display());

        let mut output = Map::new();
        output.insert("path".into(), Value::String(raw.to_string()));
        output.insert("deleted".into(), Value::Bool(true));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use steward_domain::tool::ErrorKind;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resolve_path_stays_in_root() {
        let root = Path::new("/srv/steward");
        assert_eq!(resolve_path(root, "notes.txt").unwrap(), PathBuf::from("/srv/steward/notes.txt"));
        assert_eq!(
            resolve_path(root, "/srv/steward/a/b.txt").unwrap(),
            PathBuf::from("/srv/steward/a/b.txt")
        );
        assert_eq!(resolve_path(root, "../etc/passwd").unwrap_err().kind, ErrorKind::PermissionDenied);
        assert_eq!(resolve_path(root, "/etc/passwd").unwrap_err().kind, ErrorKind::PermissionDenied);
        assert_eq!(resolve_path(root, "  ").unwrap_err().kind, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let write = WriteFileTool::new(dir.path());
        let read = ReadFileTool::new(dir.path());

        let written = write
            .execute(params(json!({"path": "notes/todo.txt", "content": "milk\neggs\nbread", "create_dirs": true})))
            .await
            .unwrap();
        assert_eq!(written["bytes"], 15);

        let out = read.execute(params(json!({"path": "notes/todo.txt", "limit": 2}))).await.unwrap();
        assert_eq!(out["content"], "milk\neggs");
        assert_eq!(out["lines"], 3);
    }

    #[tokio::test]
    async fn test_write_without_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let write = WriteFileTool::new(dir.path());

        let err = write
            .execute(params(json!({"path": "missing/todo.txt", "content": "x"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReadFileTool::new(dir.path())
            .execute(params(json!({"path": "nope.txt"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_directory_sorted_with_dir_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let out = ListDirectoryTool::new(dir.path()).execute(Map::new()).await.unwrap();
        assert_eq!(out["entries"], json!(["a.txt", "b.txt", "sub/"]));
    }

    #[tokio::test]
    async fn test_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("old.log");
        std::fs::write(&target, "x").unwrap();

        let tool = DeleteFileTool::new(dir.path());
        let out = tool.execute(params(json!({"path": "old.log"}))).await.unwrap();
        assert_eq!(out["deleted"], true);
        assert!(!target.exists());

        let err = tool.execute(params(json!({"path": "old.log"}))).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
