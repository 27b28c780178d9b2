use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub transport: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_sec: Option<u64>,
    pub max_concurrent_requests: Option<usize>,

    pub spotify: Option<SpotifyFileConfig>,
    pub openai: Option<OpenAiFileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SpotifyFileConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub access_token: Option<String>,
    pub token_cache: Option<String>,
    pub api_base_url: Option<String>,
    pub accounts_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct OpenAiFileConfig {
    pub api_key: Option<String>,
    /// Shell command printing the key, for rotating credentials.
    pub api_key_command: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
