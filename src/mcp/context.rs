//! MCP Tool Execution Context

use std::sync::Arc;

use crate::orchestrator::MusicOrchestrator;

/// Context handed to tool handlers on every call.
#[derive(Clone)]
pub struct ToolContext {
    pub orchestrator: Arc<MusicOrchestrator>,
}

impl ToolContext {
    pub fn new(orchestrator: Arc<MusicOrchestrator>) -> Self {
        Self { orchestrator }
    }
}
