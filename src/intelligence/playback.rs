//! Playback state and control.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use super::analysis::fetch_features;
use super::error::MusicError;
use super::features::{classify, MoodLabel};
use crate::spotify::{AudioFeatures, CatalogClient, Track};

/// The track currently playing, with its analysis when available.
#[derive(Debug, Clone)]
pub struct NowPlaying {
    pub track: Track,
    pub progress_ms: u64,
    pub analysis: Option<(AudioFeatures, MoodLabel)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    Play,
    Pause,
    Next,
    Previous,
}

impl FromStr for PlaybackAction {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "play" => Ok(PlaybackAction::Play),
            "pause" => Ok(PlaybackAction::Pause),
            "next" | "skip" => Ok(PlaybackAction::Next),
            "previous" | "prev" => Ok(PlaybackAction::Previous),
            _ => Err(MusicError::InvalidArgument(format!(
                "Unknown action: {}. Supported actions are: play, pause, next, previous",
                s
            ))),
        }
    }
}

impl fmt::Display for PlaybackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackAction::Play => "play",
            PlaybackAction::Pause => "pause",
            PlaybackAction::Next => "next",
            PlaybackAction::Previous => "previous",
        };
        f.write_str(name)
    }
}

/// `None` when nothing is playing.
///
/// Feature lookup failures only drop the analysis section.
pub async fn current_track(catalog: &dyn CatalogClient) -> Result<Option<NowPlaying>, MusicError> {
    let state = match catalog.get_current_playback().await? {
        Some(state) => state,
        None => return Ok(None),
    };
    let track = match state.item {
        Some(track) => track,
        None => return Ok(None),
    };

    let analysis = match track.id.as_deref() {
        Some(id) => match fetch_features(catalog, id).await {
            Ok(Some(features)) => Some((features, classify(&features))),
            Ok(None) => None,
            Err(e) => {
                debug!(track = %track.name, error = %e, "Audio features unavailable");
                None
            }
        },
        None => None,
    };

    Ok(Some(NowPlaying {
        track,
        progress_ms: state.progress_ms.unwrap_or(0),
        analysis,
    }))
}

/// Search for `query` and start playing the best match.
pub async fn play_track(catalog: &dyn CatalogClient, query: &str) -> Result<Track, MusicError> {
    let track = catalog
        .search_tracks(query, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| MusicError::NotFound(format!("No tracks found for query: {}", query)))?;

    let uris = vec![track.uri.clone()];
    catalog.start_playback(Some(uris.as_slice())).await?;
    info!(track = %track.name, "Playback started");
    Ok(track)
}

pub async fn control(
    catalog: &dyn CatalogClient,
    action: PlaybackAction,
) -> Result<PlaybackAction, MusicError> {
    match action {
        PlaybackAction::Play => catalog.start_playback(None).await?,
        PlaybackAction::Pause => catalog.pause_playback().await?,
        PlaybackAction::Next => catalog.skip_to_next().await?,
        PlaybackAction::Previous => catalog.skip_to_previous().await?,
    }
    debug!(action = %action, "Playback command sent");
    Ok(action)
}
