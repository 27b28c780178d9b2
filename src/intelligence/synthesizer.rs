//! Recommendation parameter synthesis.
//!
//! Turns free-text seed names and a mood keyword into the parameter set of a
//! recommendation request.

use tracing::debug;

use super::error::MusicError;
use crate::spotify::{CatalogClient, TimeRange, Track};

/// Seeds of each kind kept after resolution.
pub const MAX_SEEDS_PER_KIND: usize = 2;
/// Tracks requested per recommendation call.
pub const RECOMMENDATION_LIMIT: u32 = 5;

/// Resolved seed ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSet {
    pub track_ids: Vec<String>,
    pub artist_ids: Vec<String>,
}

impl SeedSet {
    pub fn is_empty(&self) -> bool {
        self.track_ids.is_empty() && self.artist_ids.is_empty()
    }
}

/// Mood keywords with target features.
pub const MOOD_KEYWORDS: [&str; 5] = ["happy", "sad", "energetic", "relaxed", "focus"];

/// Target audio features for a mood keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoodTargets {
    pub valence: Option<f64>,
    pub energy: Option<f64>,
    pub tempo: Option<f64>,
    pub instrumentalness: Option<f64>,
}

impl MoodTargets {
    /// Unknown keywords set no targets.
    pub fn for_keyword(keyword: &str) -> Self {
        match keyword.trim().to_lowercase().as_str() {
            "happy" => MoodTargets {
                valence: Some(0.8),
                energy: Some(0.7),
                ..Default::default()
            },
            "sad" => MoodTargets {
                valence: Some(0.2),
                energy: Some(0.3),
                ..Default::default()
            },
            "energetic" => MoodTargets {
                energy: Some(0.9),
                tempo: Some(140.0),
                ..Default::default()
            },
            "relaxed" => MoodTargets {
                energy: Some(0.3),
                tempo: Some(90.0),
                ..Default::default()
            },
            "focus" => MoodTargets {
                valence: Some(0.5),
                energy: Some(0.5),
                instrumentalness: Some(0.3),
                ..Default::default()
            },
            _ => MoodTargets::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationParameters {
    pub limit: u32,
    pub seeds: SeedSet,
    pub targets: MoodTargets,
}

impl RecommendationParameters {
    /// URL query pairs, with unset targets and empty seed lists left out.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("limit".to_string(), self.limit.to_string())];

        if !self.seeds.track_ids.is_empty() {
            pairs.push(("seed_tracks".to_string(), self.seeds.track_ids.join(",")));
        }
        if !self.seeds.artist_ids.is_empty() {
            pairs.push(("seed_artists".to_string(), self.seeds.artist_ids.join(",")));
        }

        let targets = [
            ("target_valence", self.targets.valence),
            ("target_energy", self.targets.energy),
            ("target_tempo", self.targets.tempo),
            ("target_instrumentalness", self.targets.instrumentalness),
        ];
        pairs.extend(
            targets
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.to_string()))),
        );

        pairs
    }
}

/// Split comma separated names, dropping blanks, keeping at most
/// [`MAX_SEEDS_PER_KIND`].
pub fn split_names(input: Option<&str>) -> Vec<String> {
    input
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .take(MAX_SEEDS_PER_KIND)
        .map(str::to_string)
        .collect()
}

/// Resolve seeds and mood into recommendation parameters.
///
/// Names without a search match are dropped. When no seed resolves, the
/// user's top tracks stand in as track seeds.
pub async fn synthesize(
    catalog: &dyn CatalogClient,
    seed_tracks: Option<&str>,
    seed_artists: Option<&str>,
    mood: Option<&str>,
) -> Result<RecommendationParameters, MusicError> {
    let mut seeds = SeedSet::default();

    for name in split_names(seed_tracks) {
        match catalog.search_tracks(&name, 1).await?.into_iter().next() {
            Some(Track { id: Some(id), .. }) => seeds.track_ids.push(id),
            _ => debug!(name = %name, "Seed track not found, skipping"),
        }
    }

    for name in split_names(seed_artists) {
        match catalog.search_artists(&name, 1).await?.into_iter().next() {
            Some(artist) => seeds.artist_ids.push(artist.id),
            None => debug!(name = %name, "Seed artist not found, skipping"),
        }
    }

    if seeds.is_empty() {
        seeds.track_ids = top_track_seeds(catalog).await?;
    }

    Ok(RecommendationParameters {
        limit: RECOMMENDATION_LIMIT,
        seeds,
        targets: mood.map(MoodTargets::for_keyword).unwrap_or_default(),
    })
}

/// Parameters seeded by one already resolved track and no mood.
///
/// The track's own id is the only seed. A track without an id is looked up
/// by its full name, and the top tracks stand in if that finds nothing.
pub async fn synthesize_for_track(
    catalog: &dyn CatalogClient,
    track: &Track,
) -> Result<RecommendationParameters, MusicError> {
    let track_id = match &track.id {
        Some(id) => Some(id.clone()),
        None => catalog
            .search_tracks(&track.name, 1)
            .await?
            .into_iter()
            .next()
            .and_then(|t| t.id),
    };

    let track_ids = match track_id {
        Some(id) => vec![id],
        None => top_track_seeds(catalog).await?,
    };

    Ok(RecommendationParameters {
        limit: RECOMMENDATION_LIMIT,
        seeds: SeedSet {
            track_ids,
            artist_ids: Vec::new(),
        },
        targets: MoodTargets::default(),
    })
}

async fn top_track_seeds(catalog: &dyn CatalogClient) -> Result<Vec<String>, MusicError> {
    let top = catalog
        .get_top_tracks(MAX_SEEDS_PER_KIND as u32, TimeRange::MediumTerm)
        .await?;
    let ids: Vec<String> = top.into_iter().filter_map(|t| t.id).collect();
    debug!(count = ids.len(), "Using top tracks as seeds");
    Ok(ids)
}

/// Run a recommendation request. An empty list is a valid result.
pub async fn recommend(
    catalog: &dyn CatalogClient,
    params: &RecommendationParameters,
) -> Result<Vec<Track>, MusicError> {
    Ok(catalog.get_recommendations(&params.query_pairs()).await?)
}
