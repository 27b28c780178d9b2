//! HTTP client for the Spotify Web API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::auth::TokenProvider;
use super::catalog::{CatalogClient, CatalogError};
use super::models::{
    ApiErrorEnvelope, Artist, AudioFeatures, AudioFeaturesResponse, CreatedPlaylist, CurrentUser,
    NewPlaylist, Paging, PlaybackState, Playlist, PlaylistItem, RecommendationsResponse,
    SearchResponse, TimeRange, Track,
};

/// Default base URL of the Web API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Spotify Web API client.
///
/// A fresh token is requested from the provider for every call, so expired
/// cached tokens are refreshed transparently.
pub struct SpotifyClient {
    client: reqwest::Client,
    api_base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SpotifyClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `api_base_url` - Base URL of the Web API (e.g., "https://api.spotify.com/v1")
    /// * `timeout` - Per-request timeout
    /// * `tokens` - Source of bearer tokens
    pub fn new(
        api_base_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        // Ensure base_url doesn't have trailing slash
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            api_base_url,
            tokens,
        })
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, CatalogError> {
        let token = self.tokens.access_token().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, CatalogError> {
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout
            } else {
                CatalogError::Connection(e.to_string())
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.api_base_url, path);
        self.get_json_url(&url, query, false).await
    }

    async fn get_json_url<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
        player: bool,
    ) -> Result<T, CatalogError> {
        debug!(url = %url, "GET");
        let response = Self::send(self.request(Method::GET, url).await?.query(query)).await?;
        let response = check_status(response, player).await?;
        parse_json(response).await
    }

    /// Send a player command. Player endpoints answer 204 on success.
    async fn player_command(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), CatalogError> {
        let url = format!("{}/me/player{}", self.api_base_url, path);
        debug!(url = %url, method = %method, "Player command");

        let mut builder = self.request(method, &url).await?;
        builder = match body {
            Some(body) => builder.json(&body),
            // Spotify rejects bodiless PUT/POST without a length header
            None => builder.header(reqwest::header::CONTENT_LENGTH, 0),
        };

        let response = Self::send(builder).await?;
        check_status(response, true).await?;
        Ok(())
    }
}

async fn check_status(response: Response, player: bool) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(map_error_status(status, &body, player))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    response
        .json()
        .await
        .map_err(|e| CatalogError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Map a non-success status and its body to a catalog error.
///
/// `player` marks player endpoints, where a 404 means there is no device to
/// act on rather than a missing resource.
fn map_error_status(status: StatusCode, body: &str, player: bool) -> CatalogError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let reason = envelope.as_ref().and_then(|e| e.error.reason.clone());
    let message = envelope
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.to_string());

    if reason.as_deref() == Some("NO_ACTIVE_DEVICE") {
        return CatalogError::NoActiveDevice;
    }

    match status.as_u16() {
        401 => CatalogError::AuthenticationRequired {
            authorize_url: None,
        },
        404 if player => CatalogError::NoActiveDevice,
        404 => CatalogError::NotFound(message),
        code => {
            warn!(status = code, message = %message, "Spotify API error");
            CatalogError::Api {
                status: code,
                message,
            }
        }
    }
}

fn limit_query(limit: u32) -> (String, String) {
    ("limit".to_string(), limit.to_string())
}

#[async_trait]
impl CatalogClient for SpotifyClient {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("type".to_string(), "track".to_string()),
            limit_query(limit),
        ];
        let response: SearchResponse = self.get_json("/search", &params).await?;
        Ok(response.tracks.map(|p| p.items).unwrap_or_default())
    }

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, CatalogError> {
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("type".to_string(), "artist".to_string()),
            limit_query(limit),
        ];
        let response: SearchResponse = self.get_json("/search", &params).await?;
        Ok(response.artists.map(|p| p.items).unwrap_or_default())
    }

    async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
        self.get_json(&format!("/tracks/{}", urlencoding::encode(id)), &[])
            .await
    }

    async fn get_audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = vec![("ids".to_string(), ids.join(","))];
        let response: AudioFeaturesResponse = self.get_json("/audio-features", &params).await?;
        Ok(response.audio_features)
    }

    async fn get_recommendations(
        &self,
        query: &[(String, String)],
    ) -> Result<Vec<Track>, CatalogError> {
        let response: RecommendationsResponse = self.get_json("/recommendations", query).await?;
        Ok(response.tracks)
    }

    async fn get_playlist(&self, id: &str) -> Result<Playlist, CatalogError> {
        self.get_json(&format!("/playlists/{}", urlencoding::encode(id)), &[])
            .await
    }

    async fn get_playlist_items_page(
        &self,
        next: &str,
    ) -> Result<Paging<PlaylistItem>, CatalogError> {
        // Cursor URLs already carry their query string
        self.get_json_url(next, &[], false).await
    }

    async fn get_current_user(&self) -> Result<CurrentUser, CatalogError> {
        self.get_json("/me", &[]).await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, CatalogError> {
        let url = format!(
            "{}/users/{}/playlists",
            self.api_base_url,
            urlencoding::encode(user_id)
        );
        let builder = self.request(Method::POST, &url).await?.json(playlist);
        let response = check_status(Self::send(builder).await?, false).await?;
        parse_json(response).await
    }

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        if uris.is_empty() {
            return Ok(());
        }
        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_base_url,
            urlencoding::encode(playlist_id)
        );
        // At most 100 items per request
        for chunk in uris.chunks(100) {
            let builder = self
                .request(Method::POST, &url)
                .await?
                .json(&json!({ "uris": chunk }));
            check_status(Self::send(builder).await?, false).await?;
        }
        Ok(())
    }

    async fn get_current_playback(&self) -> Result<Option<PlaybackState>, CatalogError> {
        let url = format!("{}/me/player", self.api_base_url);
        let response = Self::send(self.request(Method::GET, &url).await?).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let response = check_status(response, true).await?;
        parse_json(response).await.map(Some)
    }

    async fn start_playback(&self, uris: Option<&[String]>) -> Result<(), CatalogError> {
        let body = uris.map(|uris| json!({ "uris": uris }));
        self.player_command(Method::PUT, "/play", body).await
    }

    async fn pause_playback(&self) -> Result<(), CatalogError> {
        self.player_command(Method::PUT, "/pause", None).await
    }

    async fn skip_to_next(&self) -> Result<(), CatalogError> {
        self.player_command(Method::POST, "/next", None).await
    }

    async fn skip_to_previous(&self) -> Result<(), CatalogError> {
        self.player_command(Method::POST, "/previous", None).await
    }

    async fn get_top_tracks(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Track>, CatalogError> {
        let params = vec![
            limit_query(limit),
            ("time_range".to_string(), time_range.as_str().to_string()),
        ];
        let page: Paging<Track> = self.get_json("/me/top/tracks", &params).await?;
        Ok(page.items)
    }

    async fn get_top_artists(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Artist>, CatalogError> {
        let params = vec![
            limit_query(limit),
            ("time_range".to_string(), time_range.as_str().to_string()),
        ];
        let page: Paging<Artist> = self.get_json("/me/top/artists", &params).await?;
        Ok(page.items)
    }
}
