//! Access token providers.
//!
//! Every API call asks its provider for a token right before the request is
//! sent. The cached provider reads a spotipy-compatible token cache, refreshes
//! expired tokens with the refresh-token grant and writes them back.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::catalog::CatalogError;

/// Accounts service used for the authorize URL and token refresh.
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Scopes needed by the tools.
pub const REQUIRED_SCOPES: &str = "user-read-private user-read-email user-read-playback-state user-modify-playback-state user-read-currently-playing playlist-read-private playlist-modify-private playlist-modify-public user-top-read";

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of bearer tokens for the Web API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid access token, or `AuthenticationRequired`.
    async fn access_token(&self) -> Result<String, CatalogError>;
}

/// A fixed token supplied by the operator.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, CatalogError> {
        Ok(self.token.clone())
    }
}

/// OAuth application credentials.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Token cache entry, same layout spotipy writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_at: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenInfo {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Token provider backed by a cache file.
pub struct CachedTokenProvider {
    client: Client,
    cache_path: PathBuf,
    accounts_base_url: String,
    credentials: Option<ClientCredentials>,
    state: Mutex<Option<TokenInfo>>,
}

impl CachedTokenProvider {
    /// # Arguments
    /// * `cache_path` - Token cache file (created on first refresh)
    /// * `accounts_base_url` - Accounts service (e.g. "https://accounts.spotify.com")
    /// * `credentials` - Needed to refresh tokens and build the authorize URL
    pub fn new(
        cache_path: PathBuf,
        accounts_base_url: impl Into<String>,
        credentials: Option<ClientCredentials>,
    ) -> Self {
        Self {
            client: Client::new(),
            cache_path,
            accounts_base_url: accounts_base_url.into().trim_end_matches('/').to_string(),
            credentials,
            state: Mutex::new(None),
        }
    }

    fn authentication_required(&self) -> CatalogError {
        CatalogError::AuthenticationRequired {
            authorize_url: self
                .credentials
                .as_ref()
                .map(|c| authorize_url(&self.accounts_base_url, c)),
        }
    }

    async fn load_cache(&self) -> Result<Option<TokenInfo>, CatalogError> {
        let content = match tokio::fs::read_to_string(&self.cache_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.cache_path, "No token cache file");
                return Ok(None);
            }
            Err(e) => {
                return Err(CatalogError::TokenCache(format!(
                    "Failed to read {:?}: {}",
                    self.cache_path, e
                )))
            }
        };

        match serde_json::from_str::<TokenInfo>(&content) {
            Ok(info) => Ok(Some(info)),
            Err(e) => {
                warn!(path = ?self.cache_path, error = %e, "Ignoring unparseable token cache");
                Ok(None)
            }
        }
    }

    async fn store_cache(&self, info: &TokenInfo) {
        let json = match serde_json::to_string(info) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize token cache");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&self.cache_path, json).await {
            warn!(path = ?self.cache_path, error = %e, "Failed to write token cache");
        }
    }

    async fn refresh(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<TokenInfo, CatalogError> {
        let url = format!("{}/api/token", self.accounts_base_url);
        debug!("Refreshing Spotify access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Timeout
                } else {
                    CatalogError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            // Revoked or otherwise unusable refresh token
            warn!(status = status.as_u16(), "Token refresh rejected");
            return Err(self.authentication_required());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            CatalogError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;

        Ok(TokenInfo {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            scope: token.scope,
            expires_at: unix_now() + token.expires_in,
            // The accounts service may omit the refresh token; keep the old one
            refresh_token: token
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
        })
    }
}

#[async_trait]
impl TokenProvider for CachedTokenProvider {
    async fn access_token(&self) -> Result<String, CatalogError> {
        // Held across the refresh so concurrent calls trigger a single refresh
        let mut state = self.state.lock().await;

        if state.is_none() {
            *state = self.load_cache().await?;
        }

        let current = match state.as_ref() {
            Some(info) => info.clone(),
            None => return Err(self.authentication_required()),
        };

        if !current.is_expired(unix_now()) {
            return Ok(current.access_token);
        }

        let (credentials, refresh_token) =
            match (self.credentials.as_ref(), current.refresh_token.as_deref()) {
                (Some(c), Some(r)) => (c, r),
                _ => return Err(self.authentication_required()),
            };

        let refreshed = self.refresh(credentials, refresh_token).await?;
        self.store_cache(&refreshed).await;
        info!("Spotify access token refreshed");

        let token = refreshed.access_token.clone();
        *state = Some(refreshed);
        Ok(token)
    }
}

/// URL the user must visit to grant this application access.
pub fn authorize_url(accounts_base_url: &str, credentials: &ClientCredentials) -> String {
    format!(
        "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}",
        accounts_base_url.trim_end_matches('/'),
        urlencoding::encode(&credentials.client_id),
        urlencoding::encode(&credentials.redirect_uri),
        urlencoding::encode(REQUIRED_SCOPES),
    )
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
