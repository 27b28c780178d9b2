//! Spotify Web API collaborator.
//!
//! - `catalog`: the `CatalogClient` trait the intelligence layer depends on
//! - `client`: reqwest implementation against the Web API
//! - `auth`: access token providers (static token, spotipy-style token cache)
//! - `ids`: parsing of track/playlist ids, URIs and open.spotify.com links

pub mod auth;
pub mod catalog;
pub mod client;
pub mod ids;
pub mod models;

pub use auth::{
    authorize_url, CachedTokenProvider, ClientCredentials, StaticTokenProvider, TokenProvider,
    DEFAULT_ACCOUNTS_BASE_URL,
};
pub use catalog::{CatalogClient, CatalogError};
pub use client::{SpotifyClient, DEFAULT_API_BASE_URL};
pub use models::{
    Artist, AudioFeatures, CreatedPlaylist, CurrentUser, NewPlaylist, Paging, PlaybackState,
    Playlist, PlaylistItem, SimplifiedArtist, TimeRange, Track,
};
