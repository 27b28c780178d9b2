//! Catalog/playback client abstraction.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    Artist, AudioFeatures, CreatedPlaylist, CurrentUser, NewPlaylist, Paging, PlaybackState,
    Playlist, PlaylistItem, TimeRange, Track,
};

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No valid access token; the user has to complete the authorization flow.
    #[error("Spotify authentication required")]
    AuthenticationRequired { authorize_url: Option<String> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No active device found")]
    NoActiveDevice,

    #[error("Spotify API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token cache error: {0}")]
    TokenCache(String),
}

/// Everything the tools need from the Spotify account and catalog.
///
/// Implemented by [`super::SpotifyClient`]; tests use in-memory fakes.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError>;

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, CatalogError>;

    async fn get_track(&self, id: &str) -> Result<Track, CatalogError>;

    /// Features for each id, in request order. Entries are `None` for tracks
    /// the service has no analysis for.
    async fn get_audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError>;

    /// Query pairs are forwarded verbatim as URL parameters.
    async fn get_recommendations(
        &self,
        query: &[(String, String)],
    ) -> Result<Vec<Track>, CatalogError>;

    /// Playlist metadata plus the first page of its items.
    async fn get_playlist(&self, id: &str) -> Result<Playlist, CatalogError>;

    /// Follow a `next` cursor returned by a previous page.
    async fn get_playlist_items_page(
        &self,
        next: &str,
    ) -> Result<Paging<PlaylistItem>, CatalogError>;

    async fn get_current_user(&self) -> Result<CurrentUser, CatalogError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, CatalogError>;

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError>;

    /// `None` when nothing is playing.
    async fn get_current_playback(&self) -> Result<Option<PlaybackState>, CatalogError>;

    /// Resume playback, or start the given URIs when provided.
    async fn start_playback(&self, uris: Option<&[String]>) -> Result<(), CatalogError>;

    async fn pause_playback(&self) -> Result<(), CatalogError>;

    async fn skip_to_next(&self) -> Result<(), CatalogError>;

    async fn skip_to_previous(&self) -> Result<(), CatalogError>;

    async fn get_top_tracks(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Track>, CatalogError>;

    async fn get_top_artists(
        &self,
        limit: u32,
        time_range: TimeRange,
    ) -> Result<Vec<Artist>, CatalogError>;
}
