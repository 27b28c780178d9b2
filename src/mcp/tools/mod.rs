//! MCP Tools

pub mod music;

use super::registry::McpRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    music::register_tools(registry);
}
