//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{CompletionOptions, CompletionResponse, LlmError, LlmProvider, Message};
use crate::spotify::models::{AlbumRef, ExternalUrls, PlaylistOwner};
use crate::spotify::{
    Artist, AudioFeatures, CatalogClient, CatalogError, CreatedPlaylist, CurrentUser, NewPlaylist,
    Paging, PlaybackState, Playlist, PlaylistItem, SimplifiedArtist, TimeRange, Track,
};

pub fn track(id: &str, name: &str, artist: &str) -> Track {
    Track {
        id: Some(id.to_string()),
        name: name.to_string(),
        uri: format!("spotify:track:{}", id),
        artists: vec![SimplifiedArtist {
            id: Some(format!("artist-{}", artist.to_lowercase())),
            name: artist.to_string(),
        }],
        album: AlbumRef {
            name: format!("{} Album", name),
        },
        duration_ms: 215_000,
    }
}

pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: vec!["rock".to_string()],
        popularity: 80,
    }
}

pub fn features(valence: f64, energy: f64) -> AudioFeatures {
    AudioFeatures {
        danceability: 0.5,
        energy,
        valence,
        tempo: 120.0,
        acousticness: 0.1,
        instrumentalness: 0.0,
        key: 9,
        mode: 0,
        time_signature: 4,
    }
}

pub fn playlist(id: &str, name: &str, items: Vec<Option<Track>>, next: Option<&str>, total: u32) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        owner: PlaylistOwner {
            id: "owner".to_string(),
            display_name: Some("Owner Name".to_string()),
        },
        tracks: page(items, next, total),
    }
}

pub fn page(items: Vec<Option<Track>>, next: Option<&str>, total: u32) -> Paging<PlaylistItem> {
    Paging {
        items: items
            .into_iter()
            .map(|track| PlaylistItem { track })
            .collect(),
        next: next.map(str::to_string),
        total,
    }
}

/// Catalog fake backed by maps, recording every call by method name.
#[derive(Default)]
pub struct FakeCatalog {
    pub track_searches: HashMap<String, Vec<Track>>,
    pub artist_searches: HashMap<String, Vec<Artist>>,
    pub tracks: HashMap<String, Track>,
    pub features: HashMap<String, AudioFeatures>,
    pub recommendations: Vec<Track>,
    pub playlists: HashMap<String, Playlist>,
    pub pages: HashMap<String, Paging<PlaylistItem>>,
    pub playback: Option<PlaybackState>,
    pub top_tracks: Vec<Track>,
    pub top_artists: Vec<Artist>,
    pub no_active_device: bool,
    pub fail_create_playlist: bool,
    pub fail_searches: bool,

    pub calls: Mutex<Vec<String>>,
    pub recommendation_queries: Mutex<Vec<Vec<(String, String)>>>,
    pub feature_batches: Mutex<Vec<Vec<String>>>,
    pub created_playlists: Mutex<Vec<NewPlaylist>>,
    pub added_items: Mutex<Vec<(String, Vec<String>)>>,
    pub started: Mutex<Vec<Option<Vec<String>>>>,
}

impl FakeCatalog {
    pub fn search_results(&mut self, query: &str, tracks: Vec<Track>) {
        self.track_searches.insert(query.to_string(), tracks);
    }

    pub fn artist_results(&mut self, query: &str, artists: Vec<Artist>) {
        self.artist_searches.insert(query.to_string(), artists);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == method)
            .count()
    }

    fn record(&self, method: &str) {
        self.calls.lock().unwrap().push(method.to_string());
    }

    fn player(&self, method: &str) -> Result<(), CatalogError> {
        self.record(method);
        if self.no_active_device {
            Err(CatalogError::NoActiveDevice)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        self.record("search_tracks");
        if self.fail_searches {
            return Err(CatalogError::Api {
                status: 500,
                message: "search unavailable".to_string(),
            });
        }
        let mut results = self.track_searches.get(query).cloned().unwrap_or_default();
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<Artist>, CatalogError> {
        self.record("search_artists");
        let mut results = self.artist_searches.get(query).cloned().unwrap_or_default();
        results.truncate(limit as usize);
        Ok(results)
    }

    async fn get_track(&self, id: &str) -> Result<Track, CatalogError> {
        self.record("get_track");
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound("Invalid id".to_string()))
    }

    async fn get_audio_features(
        &self,
        ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        self.record("get_audio_features");
        self.feature_batches.lock().unwrap().push(ids.to_vec());
        Ok(ids.iter().map(|id| self.features.get(id).copied()).collect())
    }

    async fn get_recommendations(
        &self,
        query: &[(String, String)],
    ) -> Result<Vec<Track>, CatalogError> {
        self.record("get_recommendations");
        self.recommendation_queries
            .lock()
            .unwrap()
            .push(query.to_vec());
        Ok(self.recommendations.clone())
    }

    async fn get_playlist(&self, id: &str) -> Result<Playlist, CatalogError> {
        self.record("get_playlist");
        self.playlists
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound("Invalid playlist Id".to_string()))
    }

    async fn get_playlist_items_page(
        &self,
        next: &str,
    ) -> Result<Paging<PlaylistItem>, CatalogError> {
        self.record("get_playlist_items_page");
        self.pages
            .get(next)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(next.to_string()))
    }

    async fn get_current_user(&self) -> Result<CurrentUser, CatalogError> {
        self.record("get_current_user");
        Ok(CurrentUser {
            id: "me".to_string(),
            display_name: Some("Me".to_string()),
        })
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, CatalogError> {
        self.record("create_playlist");
        if self.fail_create_playlist {
            return Err(CatalogError::Api {
                status: 403,
                message: "Forbidden".to_string(),
            });
        }
        self.created_playlists
            .lock()
            .unwrap()
            .push(playlist.clone());
        Ok(CreatedPlaylist {
            id: format!("{}-playlist", user_id),
            name: playlist.name.clone(),
            external_urls: ExternalUrls {
                spotify: Some(format!(
                    "https://open.spotify.com/playlist/{}-playlist",
                    user_id
                )),
            },
        })
    }

    async fn add_playlist_items(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        self.record("add_playlist_items");
        self.added_items
            .lock()
            .unwrap()
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }

    async fn get_current_playback(&self) -> Result<Option<PlaybackState>, CatalogError> {
        self.record("get_current_playback");
        Ok(self.playback.clone())
    }

    async fn start_playback(&self, uris: Option<&[String]>) -> Result<(), CatalogError> {
        self.started
            .lock()
            .unwrap()
            .push(uris.map(|u| u.to_vec()));
        self.player("start_playback")
    }

    async fn pause_playback(&self) -> Result<(), CatalogError> {
        self.player("pause_playback")
    }

    async fn skip_to_next(&self) -> Result<(), CatalogError> {
        self.player("skip_to_next")
    }

    async fn skip_to_previous(&self) -> Result<(), CatalogError> {
        self.player("skip_to_previous")
    }

    async fn get_top_tracks(
        &self,
        limit: u32,
        _time_range: TimeRange,
    ) -> Result<Vec<Track>, CatalogError> {
        self.record("get_top_tracks");
        Ok(self.top_tracks.iter().take(limit as usize).cloned().collect())
    }

    async fn get_top_artists(
        &self,
        limit: u32,
        _time_range: TimeRange,
    ) -> Result<Vec<Artist>, CatalogError> {
        self.record("get_top_artists");
        Ok(self
            .top_artists
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// LLM fake replaying canned responses in order.
pub struct FakeLlm {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    pub requests: Mutex<Vec<(Vec<Message>, CompletionOptions)>>,
}

impl FakeLlm {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.requests
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.clone()));
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::Connection("no canned response left".to_string()));
        }
        responses.remove(0).map(CompletionResponse::text)
    }
}
