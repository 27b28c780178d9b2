//! Playlist-level statistics.

use std::collections::HashMap;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::debug;

use super::error::MusicError;
use super::features::{classify_aggregate, FeatureMeans, MoodLabel};
use crate::spotify::ids::parse_playlist_id;
use crate::spotify::{AudioFeatures, CatalogClient, PlaylistItem};

/// Items considered per playlist.
pub const MAX_PLAYLIST_ITEMS: usize = 100;
/// Ids per audio-features request.
pub const FEATURES_BATCH_SIZE: usize = 50;
/// Artists listed in the report.
pub const TOP_ARTISTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistCount {
    pub name: String,
    pub tracks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub name: String,
    pub owner: String,
    /// Item count declared by the service, not limited to what was analyzed.
    pub total_tracks: u32,
    pub means: FeatureMeans,
    pub mood: MoodLabel,
    pub top_artists: Vec<ArtistCount>,
    /// Number of feature vectors the means were computed from.
    pub analyzed_tracks: usize,
}

/// Analyze the playlist referenced by `playlist_ref` (id, URI or link).
pub async fn aggregate(
    catalog: &dyn CatalogClient,
    playlist_ref: &str,
    max_concurrent: usize,
) -> Result<AggregateReport, MusicError> {
    let playlist_id = parse_playlist_id(playlist_ref);
    let playlist = catalog.get_playlist(&playlist_id).await?;

    let mut items = playlist.tracks.items;
    let mut next = playlist.tracks.next;
    while let Some(cursor) = next {
        if items.len() >= MAX_PLAYLIST_ITEMS {
            break;
        }
        let page = catalog.get_playlist_items_page(&cursor).await?;
        items.extend(page.items);
        next = page.next;
    }
    items.truncate(MAX_PLAYLIST_ITEMS);

    let track_ids: Vec<String> = items
        .iter()
        .filter_map(|item| item.track.as_ref().and_then(|t| t.id.clone()))
        .collect();

    debug!(
        playlist = %playlist_id,
        items = items.len(),
        with_ids = track_ids.len(),
        "Fetching audio features"
    );

    let id_batches: Vec<Vec<String>> = track_ids
        .chunks(FEATURES_BATCH_SIZE)
        .map(<[String]>::to_vec)
        .collect();

    let batches: Vec<Vec<Option<AudioFeatures>>> = stream::iter(id_batches)
        .map(|batch| async move { catalog.get_audio_features(&batch).await })
        .buffered(max_concurrent.max(1))
        .try_collect()
        .await?;

    let vectors: Vec<AudioFeatures> = batches.into_iter().flatten().flatten().collect();
    let means = FeatureMeans::from_vectors(&vectors).ok_or_else(|| {
        MusicError::NotFound(format!(
            "No audio features available for playlist: {}",
            playlist.name
        ))
    })?;

    Ok(AggregateReport {
        owner: playlist
            .owner
            .display_name
            .unwrap_or(playlist.owner.id),
        name: playlist.name,
        total_tracks: playlist.tracks.total,
        mood: classify_aggregate(&means),
        means,
        top_artists: top_artists(&items, TOP_ARTISTS),
        analyzed_tracks: vectors.len(),
    })
}

/// Count each item's first-listed artist; ties keep first-encountered order.
pub fn top_artists(items: &[PlaylistItem], limit: usize) -> Vec<ArtistCount> {
    let mut counts: Vec<ArtistCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for artist in items
        .iter()
        .filter_map(|item| item.track.as_ref()?.primary_artist())
    {
        match index.get(&artist.name) {
            Some(&i) => counts[i].tracks += 1,
            None => {
                index.insert(artist.name.clone(), counts.len());
                counts.push(ArtistCount {
                    name: artist.name.clone(),
                    tracks: 1,
                });
            }
        }
    }

    // Stable sort keeps encounter order among equal counts
    counts.sort_by(|a, b| b.tracks.cmp(&a.tracks));
    counts.truncate(limit);
    counts
}
