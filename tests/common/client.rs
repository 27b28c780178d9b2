//! MCP session driving the dispatcher the way a transport does.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use spotify_orchestrator::llm::{ApiKeySource, LlmProvider, OpenAIProvider};
use spotify_orchestrator::mcp::{create_mcp_state, handle_message, McpState};
use spotify_orchestrator::spotify::{SpotifyClient, StaticTokenProvider};
use spotify_orchestrator::MusicOrchestrator;

use super::constants::TEST_TOKEN;
use super::server::MockSpotify;

/// Text and error flag of a tool result.
#[derive(Debug)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

pub struct McpSession {
    state: McpState,
    initialized: bool,
    next_id: i64,
}

impl McpSession {
    /// Session against the mock, with AI playlist generation enabled.
    pub async fn connect(server: &MockSpotify) -> Self {
        Self::build(server, TEST_TOKEN, true).await
    }

    pub async fn connect_without_llm(server: &MockSpotify) -> Self {
        Self::build(server, TEST_TOKEN, false).await
    }

    pub async fn connect_with_token(server: &MockSpotify, token: &str) -> Self {
        Self::build(server, token, false).await
    }

    async fn build(server: &MockSpotify, token: &str, with_llm: bool) -> Self {
        let catalog = SpotifyClient::new(
            server.api_url(),
            Duration::from_secs(5),
            Arc::new(StaticTokenProvider::new(token)),
        )
        .expect("Failed to create Spotify client");

        let llm: Option<Arc<dyn LlmProvider>> = if with_llm {
            Some(Arc::new(OpenAIProvider::new(
                server.openai_url(),
                "test-model",
                ApiKeySource::Static("sk-test".to_string()),
            )))
        } else {
            None
        };

        let orchestrator = MusicOrchestrator::new(Arc::new(catalog), llm, 4);
        let mut session = Self {
            state: create_mcp_state(Arc::new(orchestrator)),
            initialized: false,
            next_id: 1,
        };
        session.initialize().await;
        session
    }

    /// Session that has not sent `initialize` yet.
    pub async fn uninitialized(server: &MockSpotify) -> Self {
        let mut session = Self::build(server, TEST_TOKEN, false).await;
        session.initialized = false;
        session
    }

    pub async fn initialize(&mut self) -> Value {
        let response = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "integration-tests", "version": "1.0" }
                }),
            )
            .await;
        self.send_raw(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        response
    }

    /// Send raw text; `None` when the dispatcher does not reply.
    pub async fn send_raw(&mut self, text: &str) -> Option<Value> {
        handle_message(text, &self.state, &mut self.initialized)
            .await
            .map(|r| serde_json::to_value(r).unwrap())
    }

    /// Send a request and return the full JSON-RPC response.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        let message = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let response = self
            .send_raw(&message.to_string())
            .await
            .expect("Request got no response");
        assert_eq!(response["id"], id);
        response
    }

    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> ToolOutput {
        let response = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await;
        let result = response
            .get("result")
            .unwrap_or_else(|| panic!("Tool call failed: {}", response));
        ToolOutput {
            text: result["content"][0]["text"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            is_error: result["isError"].as_bool().unwrap_or(false),
        }
    }
}
