use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spotify_orchestrator::config::{
    AppConfig, CliConfig, FileConfig, Transport, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_PORT,
    DEFAULT_REDIRECT_URI, DEFAULT_REQUEST_TIMEOUT_SEC, DEFAULT_TOKEN_CACHE,
};
use spotify_orchestrator::llm::{
    LlmProvider, OpenAIProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
};
use spotify_orchestrator::mcp::{create_mcp_state, run_stdio, run_websocket};
use spotify_orchestrator::spotify::{
    CachedTokenProvider, SpotifyClient, StaticTokenProvider, TokenProvider,
};
use spotify_orchestrator::MusicOrchestrator;

#[derive(Parser, Debug)]
#[clap(version, about = "MCP server for Spotify playback, analysis and playlist generation")]
struct CliArgs {
    /// Path to a TOML config file. Its values override command line values.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// How MCP clients connect.
    #[clap(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// The port to listen on (websocket transport).
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Timeout in seconds for requests to Spotify.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Upper bound on concurrent Spotify requests within one operation.
    #[clap(long, default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS)]
    pub max_concurrent_requests: usize,

    #[clap(long, env = "SPOTIFY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    #[clap(long, env = "SPOTIFY_REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
    pub spotify_redirect_uri: String,

    /// Access token used as is, bypassing the token cache.
    #[clap(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub spotify_access_token: Option<String>,

    /// Token cache file, in the layout spotipy writes.
    #[clap(long, env = "SPOTIFY_TOKEN_CACHE", default_value = DEFAULT_TOKEN_CACHE)]
    pub spotify_token_cache: PathBuf,

    /// Enables create_ai_playlist.
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    #[clap(long, default_value = DEFAULT_OPENAI_MODEL)]
    pub openai_model: String,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            transport: self.transport,
            port: self.port,
            request_timeout_sec: self.request_timeout_sec,
            max_concurrent_requests: self.max_concurrent_requests,
            spotify_client_id: self.spotify_client_id.clone(),
            spotify_client_secret: self.spotify_client_secret.clone(),
            spotify_redirect_uri: self.spotify_redirect_uri.clone(),
            spotify_access_token: self.spotify_access_token.clone(),
            spotify_token_cache: self.spotify_token_cache.clone(),
            openai_api_key: self.openai_api_key.clone(),
            openai_base_url: self.openai_base_url.clone(),
            openai_model: self.openai_model.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Stdout carries JSON-RPC frames on the stdio transport
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let tokens: Arc<dyn TokenProvider> = match &config.spotify.access_token {
        Some(token) => {
            info!("Using static Spotify access token");
            Arc::new(StaticTokenProvider::new(token.clone()))
        }
        None => {
            info!("Using Spotify token cache at {:?}", config.spotify.token_cache);
            Arc::new(CachedTokenProvider::new(
                config.spotify.token_cache.clone(),
                config.spotify.accounts_base_url.clone(),
                config.spotify.credentials(),
            ))
        }
    };

    let catalog = SpotifyClient::new(
        config.spotify.api_base_url.clone(),
        config.request_timeout,
        tokens,
    )
    .context("Failed to create Spotify client")?;

    let llm: Option<Arc<dyn LlmProvider>> = match &config.openai.api_key {
        Some(key) => {
            info!(model = %config.openai.model, "AI playlist generation enabled");
            Some(Arc::new(OpenAIProvider::new(
                config.openai.base_url.clone(),
                config.openai.model.clone(),
                key.clone(),
            )))
        }
        None => {
            warn!("No OpenAI API key configured, create_ai_playlist will be unavailable");
            None
        }
    };

    let orchestrator = Arc::new(MusicOrchestrator::new(
        Arc::new(catalog),
        llm,
        config.max_concurrent_requests,
    ));
    let mcp_state = Arc::new(create_mcp_state(orchestrator));

    match config.transport {
        Transport::Stdio => run_stdio(mcp_state).await,
        Transport::Websocket => run_websocket(mcp_state, config.port).await,
    }
}
