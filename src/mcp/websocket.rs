//! MCP over WebSocket at `/v1/mcp`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info};

use super::handler::{handle_message, McpState};

pub const MCP_PATH: &str = "/v1/mcp";

pub fn make_app(mcp_state: Arc<McpState>) -> Router {
    Router::new()
        .route(MCP_PATH, get(mcp_handler))
        .with_state(mcp_state)
}

pub async fn run_websocket(mcp_state: Arc<McpState>, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Serving MCP over WebSocket at ws://127.0.0.1:{}{}", port, MCP_PATH);

    Ok(axum::serve(listener, make_app(mcp_state)).await?)
}

async fn mcp_handler(ws: WebSocketUpgrade, State(mcp_state): State<Arc<McpState>>) -> Response {
    ws.on_upgrade(move |socket| handle_mcp_socket(socket, mcp_state))
}

async fn handle_mcp_socket(socket: WebSocket, mcp_state: Arc<McpState>) {
    debug!("MCP connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut initialized = false;

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = handle_message(&text, &mcp_state, &mut initialized).await;

                if let Some(response) = response {
                    match serde_json::to_string(&response) {
                        Ok(json) => {
                            if ws_sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize MCP response: {}", e);
                        }
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                debug!("Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                debug!("Received close frame");
                break;
            }
            Err(e) => {
                debug!("WebSocket error: {}", e);
                break;
            }
        }
    }

    debug!("MCP connection closed");
}
