//! MCP (Model Context Protocol) Server
//!
//! Exposes the music operations as MCP tools.
//!
//! ## Architecture
//!
//! - Transports: newline-delimited JSON on stdio, or WebSocket at `/v1/mcp`
//! - Dispatch: [`handler::handle_message`], shared by both transports
//! - Tools: registered in [`tools`], one per music operation

pub mod context;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod stdio;
pub mod tools;
pub mod websocket;

pub use handler::{create_mcp_state, handle_message, McpState};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::McpRegistry;
pub use stdio::run_stdio;
pub use websocket::run_websocket;
