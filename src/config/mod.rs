mod file_config;

pub use file_config::{FileConfig, OpenAiFileConfig, SpotifyFileConfig};

use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::{ApiKeySource, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::spotify::{ClientCredentials, DEFAULT_ACCOUNTS_BASE_URL, DEFAULT_API_BASE_URL};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";
pub const DEFAULT_TOKEN_CACHE: &str = ".spotify_cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// WebSocket server at /v1/mcp
    Websocket,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub transport: Transport,
    pub port: u16,
    pub request_timeout_sec: u64,
    pub max_concurrent_requests: usize,

    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_redirect_uri: String,
    pub spotify_access_token: Option<String>,
    pub spotify_token_cache: PathBuf,

    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            port: DEFAULT_PORT,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            spotify_client_id: None,
            spotify_client_secret: None,
            spotify_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            spotify_access_token: None,
            spotify_token_cache: PathBuf::from(DEFAULT_TOKEN_CACHE),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub transport: Transport,
    pub port: u16,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
    pub spotify: SpotifySettings,
    pub openai: OpenAiSettings,
}

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    /// Used as is, never refreshed. Takes precedence over the token cache.
    pub access_token: Option<String>,
    pub token_cache: PathBuf,
}

impl SpotifySettings {
    /// Client id and secret, when both are set.
    pub fn credentials(&self) -> Option<ClientCredentials> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some(ClientCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
                redirect_uri: self.redirect_uri.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    /// None disables AI playlist generation.
    pub api_key: Option<ApiKeySource>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let spotify_file = file.spotify.unwrap_or_default();
        let openai_file = file.openai.unwrap_or_default();

        let transport = match file.transport {
            Some(name) => Transport::from_str(&name, true)
                .map_err(|_| anyhow!("Invalid transport in config file: {}", name))?,
            None => cli.transport,
        };

        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than 0");
        }

        let max_concurrent_requests = file
            .max_concurrent_requests
            .unwrap_or(cli.max_concurrent_requests);
        if max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be greater than 0");
        }

        let spotify = SpotifySettings {
            api_base_url: spotify_file
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            accounts_base_url: spotify_file
                .accounts_base_url
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_BASE_URL.to_string()),
            client_id: non_empty(spotify_file.client_id.or_else(|| cli.spotify_client_id.clone())),
            client_secret: non_empty(
                spotify_file
                    .client_secret
                    .or_else(|| cli.spotify_client_secret.clone()),
            ),
            redirect_uri: spotify_file
                .redirect_uri
                .unwrap_or_else(|| cli.spotify_redirect_uri.clone()),
            access_token: non_empty(
                spotify_file
                    .access_token
                    .or_else(|| cli.spotify_access_token.clone()),
            ),
            token_cache: spotify_file
                .token_cache
                .map(PathBuf::from)
                .unwrap_or_else(|| cli.spotify_token_cache.clone()),
        };

        if spotify.access_token.is_none() && spotify.credentials().is_none() {
            bail!(
                "No Spotify credentials configured. Set SPOTIFY_ACCESS_TOKEN, or \
                 SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET (with a token cache), \
                 or the [spotify] section of the config file"
            );
        }

        // A key command in the file wins over any static key
        let api_key = match non_empty(openai_file.api_key_command) {
            Some(command) => Some(ApiKeySource::Command(command)),
            None => non_empty(openai_file.api_key.or_else(|| cli.openai_api_key.clone()))
                .map(ApiKeySource::Static),
        };

        let openai = OpenAiSettings {
            base_url: openai_file
                .base_url
                .unwrap_or_else(|| cli.openai_base_url.clone()),
            model: openai_file.model.unwrap_or_else(|| cli.openai_model.clone()),
            api_key,
        };

        Ok(AppConfig {
            transport,
            port: file.port.unwrap_or(cli.port),
            request_timeout: Duration::from_secs(request_timeout_sec),
            max_concurrent_requests,
            spotify,
            openai,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
