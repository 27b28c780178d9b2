//! Parsing of user-supplied Spotify references.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BASE62_ID: Regex = Regex::new(r"^[0-9A-Za-z]{22}$").unwrap();
}

const TRACK_URI_PREFIX: &str = "spotify:track:";
const TRACK_URL_MARKER: &str = "spotify.com/track/";
const PLAYLIST_URI_PREFIX: &str = "spotify:playlist:";
const PLAYLIST_URL_MARKER: &str = "spotify.com/playlist/";

/// How a track was referenced by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackReference {
    Id(String),
    Query(String),
}

/// Interpret input as a track id (URI, open.spotify.com link or bare base-62
/// id) and fall back to treating it as a free-text search query.
pub fn parse_track_reference(input: &str) -> TrackReference {
    let input = input.trim();

    if let Some(id) = input.strip_prefix(TRACK_URI_PREFIX) {
        return TrackReference::Id(id.to_string());
    }
    if let Some(id) = after_marker(input, TRACK_URL_MARKER) {
        return TrackReference::Id(id);
    }
    if BASE62_ID.is_match(input) {
        return TrackReference::Id(input.to_string());
    }

    TrackReference::Query(input.to_string())
}

/// Extract a playlist id from a URL or URI; anything else is taken literally.
pub fn parse_playlist_id(input: &str) -> String {
    let input = input.trim();

    if let Some(id) = after_marker(input, PLAYLIST_URL_MARKER) {
        return id;
    }
    if let Some((_, id)) = input.split_once(PLAYLIST_URI_PREFIX) {
        return id.to_string();
    }

    input.to_string()
}

fn after_marker(input: &str, marker: &str) -> Option<String> {
    let (_, rest) = input.split_once(marker)?;
    let id = rest.split(['?', '#', '/']).next().unwrap_or(rest);
    Some(id.to_string())
}
