//! Single-track analysis.

use tracing::debug;

use super::error::MusicError;
use super::features::{classify, MoodLabel};
use crate::spotify::ids::{parse_track_reference, TrackReference};
use crate::spotify::{AudioFeatures, CatalogClient, CatalogError, Track};

/// A track with its features and derived mood.
#[derive(Debug, Clone)]
pub struct TrackAnalysis {
    pub track: Track,
    pub features: AudioFeatures,
    pub mood: MoodLabel,
}

/// Resolve `input` to a track (id, URI, link or search text) and classify it.
pub async fn analyze_track(
    catalog: &dyn CatalogClient,
    input: &str,
) -> Result<TrackAnalysis, MusicError> {
    let track = resolve_track(catalog, input).await?;

    let id = track.id.clone().ok_or_else(|| {
        MusicError::NotFound(format!(
            "No audio features available for track: {}",
            track.name
        ))
    })?;

    let features = fetch_features(catalog, &id).await?.ok_or_else(|| {
        MusicError::NotFound(format!(
            "No audio features available for track: {}",
            track.name
        ))
    })?;

    let mood = classify(&features);
    debug!(track = %track.name, mood = %mood, "Track analyzed");

    Ok(TrackAnalysis {
        track,
        features,
        mood,
    })
}

/// Features of one track, `None` when the service has none.
pub(crate) async fn fetch_features(
    catalog: &dyn CatalogClient,
    id: &str,
) -> Result<Option<AudioFeatures>, MusicError> {
    let features = catalog.get_audio_features(&[id.to_string()]).await?;
    Ok(features.into_iter().next().flatten())
}

async fn resolve_track(catalog: &dyn CatalogClient, input: &str) -> Result<Track, MusicError> {
    match parse_track_reference(input) {
        TrackReference::Id(id) => match catalog.get_track(&id).await {
            Ok(track) => Ok(track),
            Err(CatalogError::NotFound(_)) | Err(CatalogError::Api { status: 400, .. }) => Err(
                MusicError::InvalidArgument(format!("Invalid track ID: {}", input)),
            ),
            Err(e) => Err(e.into()),
        },
        TrackReference::Query(query) => catalog
            .search_tracks(&query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MusicError::NotFound(format!("No track found for query: {}", input))),
    }
}
