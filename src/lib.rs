//! Spotify Orchestrator Library
//!
//! MCP tools for inspecting and controlling a Spotify account, plus the
//! music intelligence layer that turns audio features and free-text prompts
//! into moods, recommendations, playlist statistics and generated playlists.

pub mod config;
pub mod intelligence;
pub mod llm;
pub mod mcp;
pub mod orchestrator;
pub mod render;
pub mod spotify;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use intelligence::MusicError;
pub use orchestrator::MusicOrchestrator;
pub use spotify::{CatalogClient, CatalogError, SpotifyClient};
