//! Listening history: the current user's top tracks and artists.

use std::str::FromStr;

use super::error::MusicError;
use crate::spotify::{Artist, CatalogClient, TimeRange, Track};

pub const TOP_ITEMS_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopItemType {
    Tracks,
    Artists,
}

impl TopItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopItemType::Tracks => "tracks",
            TopItemType::Artists => "artists",
        }
    }
}

impl FromStr for TopItemType {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tracks" => Ok(TopItemType::Tracks),
            "artists" => Ok(TopItemType::Artists),
            _ => Err(MusicError::InvalidArgument(
                "Invalid item type. Please use 'tracks' or 'artists'.".to_string(),
            )),
        }
    }
}

/// Parse a time range argument, with the caller-facing error text.
pub fn parse_time_range(s: &str) -> Result<TimeRange, MusicError> {
    TimeRange::parse(s).ok_or_else(|| {
        MusicError::InvalidArgument(
            "Invalid time range. Please use 'short_term', 'medium_term', or 'long_term'."
                .to_string(),
        )
    })
}

#[derive(Debug, Clone)]
pub enum TopItems {
    Tracks(Vec<Track>),
    Artists(Vec<Artist>),
}

#[derive(Debug, Clone)]
pub struct TopItemsReport {
    pub time_range: TimeRange,
    pub items: TopItems,
}

pub async fn top_items(
    catalog: &dyn CatalogClient,
    item_type: TopItemType,
    time_range: TimeRange,
) -> Result<TopItemsReport, MusicError> {
    let items = match item_type {
        TopItemType::Tracks => {
            TopItems::Tracks(catalog.get_top_tracks(TOP_ITEMS_LIMIT, time_range).await?)
        }
        TopItemType::Artists => {
            TopItems::Artists(catalog.get_top_artists(TOP_ITEMS_LIMIT, time_range).await?)
        }
    };
    Ok(TopItemsReport { time_range, items })
}
