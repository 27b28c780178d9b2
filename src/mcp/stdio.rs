//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Stdout carries protocol frames only; logging goes to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::handler::{handle_message, McpState};

/// Serve MCP on the process' standard streams until stdin closes.
pub async fn run_stdio(mcp_state: Arc<McpState>) -> Result<()> {
    info!("Serving MCP over stdio");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve_lines(stdin, stdout, &mcp_state).await
}

/// Read one message per line from `reader` and write replies to `writer`.
pub async fn serve_lines<R, W>(reader: R, mut writer: W, mcp_state: &McpState) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut initialized = false;

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(response) = handle_message(line, mcp_state, &mut initialized).await else {
            continue;
        };

        match serde_json::to_string(&response) {
            Ok(mut json) => {
                json.push('\n');
                writer
                    .write_all(json.as_bytes())
                    .await
                    .context("Failed to write response")?;
                writer.flush().await.context("Failed to flush response")?;
            }
            Err(e) => {
                error!("Failed to serialize MCP response: {}", e);
            }
        }
    }

    debug!("stdin closed, stopping");
    Ok(())
}
