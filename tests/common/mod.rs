//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{McpSession, MockSpotify};
//!
//! #[tokio::test]
//! async fn test_top_tracks() {
//!     let server = MockSpotify::spawn().await;
//!     let mut session = McpSession::connect(&server).await;
//!
//!     let output = session.call_tool("get_top_items", serde_json::json!({})).await;
//!     assert!(!output.is_error);
//! }
//! ```
#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::{McpSession, ToolOutput};
pub use constants::*;
pub use server::MockSpotify;
