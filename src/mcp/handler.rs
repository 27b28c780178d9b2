//! MCP message dispatch shared by every transport.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::context::ToolContext;
use super::protocol::{
    methods, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult,
    ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability, ToolsListResult,
    JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use super::registry::McpRegistry;
use crate::orchestrator::MusicOrchestrator;

pub const SERVER_NAME: &str = "spotify-orchestrator";

/// State shared across MCP connections
pub struct McpState {
    pub registry: Arc<McpRegistry>,
    pub orchestrator: Arc<MusicOrchestrator>,
}

/// Create the MCP state with all tools registered
pub fn create_mcp_state(orchestrator: Arc<MusicOrchestrator>) -> McpState {
    let mut registry = McpRegistry::new();
    super::tools::register_all_tools(&mut registry);

    info!(
        tools = registry.tool_count(),
        llm = orchestrator.has_llm(),
        "MCP registry initialized"
    );

    McpState {
        registry: Arc::new(registry),
        orchestrator,
    }
}

/// Handle a single MCP message.
///
/// Returns `None` for notifications and anything else that takes no reply.
/// `initialized` is per connection.
pub async fn handle_message(
    text: &str,
    mcp_state: &McpState,
    initialized: &mut bool,
) -> Option<McpResponse> {
    let request: McpRequest = match serde_json::from_str(text) {
        Ok(req) => req,
        Err(e) => {
            return Some(McpResponse::error(
                None,
                McpError::ParseError(e.to_string()),
            ));
        }
    };

    let request_id = request.id.clone();

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(McpResponse::error(
            request_id,
            McpError::InvalidRequest(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
        ));
    }

    debug!(method = %request.method, id = ?request_id, "MCP request");

    let result = match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&request, initialized),
        methods::INITIALIZED | methods::SHUTDOWN => return None,
        methods::PING => handle_ping(),
        methods::TOOLS_LIST => {
            if !*initialized {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_list(mcp_state)
            }
        }
        methods::TOOLS_CALL => {
            if !*initialized {
                Err(McpError::InvalidRequest("Not initialized".to_string()))
            } else {
                handle_tools_call(&request, mcp_state).await
            }
        }
        other => {
            // Unknown notifications are dropped silently
            if request_id.is_none() {
                debug!(method = other, "Ignoring unknown notification");
                return None;
            }
            Err(McpError::MethodNotFound(other.to_string()))
        }
    };

    Some(match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => {
            warn!(code = error.code(), "MCP request failed: {}", error);
            McpResponse::error(request_id, error)
        }
    })
}

fn handle_initialize(request: &McpRequest, initialized: &mut bool) -> Result<Value, McpError> {
    let params: Option<InitializeParams> = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?;

    if let Some(client) = params.and_then(|p| p.client_info) {
        info!(client = %client.name, version = ?client.version, "MCP client initialized");
    }

    *initialized = true;

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability { list_changed: None },
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_ping() -> Result<Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_tools_list(mcp_state: &McpState) -> Result<Value, McpError> {
    let result = ToolsListResult {
        tools: mcp_state.registry.list_tools(),
    };
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(request: &McpRequest, mcp_state: &McpState) -> Result<Value, McpError> {
    let params: ToolsCallParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

    let tool = mcp_state
        .registry
        .get_tool(&params.name)
        .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

    let ctx = ToolContext::new(mcp_state.orchestrator.clone());
    let arguments = params.arguments.unwrap_or(serde_json::json!({}));

    info!(tool = %params.name, "Calling tool");
    let result = (tool.handler)(ctx, arguments).await?;
    if result.is_error == Some(true) {
        info!(tool = %params.name, "Tool reported failure: {}", result.text_content());
    }

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}
