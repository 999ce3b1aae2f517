//! In-crate fakes for the ports, shared by use case tests.

use crate::ports::audit_sink::{AuditEvent, AuditSink};
use crate::ports::generation::{BackendError, GenerationBackend, GenerationRequest};
use crate::ports::tool_catalog::{Tool, ToolCatalog};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use steward_domain::tool::{ToolDefinition, ToolError, ToolParameter};

// ==================== Backend ====================

/// Backend that replays a fixed script of responses.
pub struct ScriptedBackend {
    name: String,
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    delay: Duration,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, error: BackendError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: GenerationRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Unavailable("script exhausted".into())))
    }
}

// ==================== Tools ====================

/// Tool that replays scripted results, then repeats a default.
pub struct FakeTool {
    definition: ToolDefinition,
    script: Mutex<VecDeque<Result<Map<String, Value>, ToolError>>>,
    default: Result<Map<String, Value>, ToolError>,
    delay: Duration,
    invocations: AtomicUsize,
    received: Mutex<Vec<Map<String, Value>>>,
}

impl FakeTool {
    pub fn new(name: &str) -> Self {
        let mut ok = Map::new();
        ok.insert("ok".into(), Value::Bool(true));
        Self {
            definition: ToolDefinition::new(name, format!("fake {}", name)),
            script: Mutex::new(VecDeque::new()),
            default: Ok(ok),
            delay: Duration::ZERO,
            invocations: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, result: Result<Map<String, Value>, ToolError>) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn always(mut self, result: Result<Map<String, Value>, ToolError>) -> Self {
        self.default = result;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_required(mut self, param: &str) -> Self {
        self.definition = self
            .definition
            .with_parameter(ToolParameter::new(param, param, true));
        self
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Map<String, Value>> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for FakeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, params: Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(params);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.default.clone())
    }
}

/// Catalog over a fixed set of fake tools.
#[derive(Default)]
pub struct FakeCatalog {
    tools: HashMap<String, Arc<FakeTool>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: Arc<FakeTool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }
}

impl ToolCatalog for FakeCatalog {
    fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|t| t.clone() as Arc<dyn Tool>)
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition.clone()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }
}

pub fn output(key: &str, value: impl Into<Value>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value.into());
    map
}

// ==================== Audit ====================

#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn of_type(&self, event_type: &str) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}
