//! JSON payloads in the Web API's shapes.

use serde_json::{json, Value};

use super::constants::*;

pub struct FixtureTrack {
    pub id: &'static str,
    pub name: &'static str,
    pub artist_id: &'static str,
    pub artist: &'static str,
    pub album: &'static str,
    pub duration_ms: u64,
    /// (danceability, energy, valence, tempo, acousticness, instrumentalness, key, mode)
    pub features: Option<(f64, f64, f64, f64, f64, f64, i32, i32)>,
}

pub struct FixtureArtist {
    pub id: &'static str,
    pub name: &'static str,
    pub genres: &'static [&'static str],
    pub popularity: u32,
}

pub const TRACKS: &[FixtureTrack] = &[
    FixtureTrack {
        id: TRACK_1_ID,
        name: TRACK_1_NAME,
        artist_id: "0gxyHStUsqpMadRV0Di1Qt",
        artist: ARTIST_1_NAME,
        album: "Whenever You Need Somebody",
        duration_ms: 213_573,
        features: Some((0.727, 0.939, 0.916, 113.33, 0.0477, 0.0, 8, 1)),
    },
    FixtureTrack {
        id: TRACK_2_ID,
        name: TRACK_2_NAME,
        artist_id: "2jzc5TC5TVFLXQlBNiIUzE",
        artist: ARTIST_2_NAME,
        album: "Hunting High and Low",
        duration_ms: 225_280,
        features: Some((0.573, 0.902, 0.876, 84.41, 0.018, 0.00125, 6, 0)),
    },
    FixtureTrack {
        id: TRACK_3_ID,
        name: TRACK_3_NAME,
        artist_id: "0C0XlULifJtAgn6ZNCW2eu",
        artist: ARTIST_3_NAME,
        album: "Hot Fuss",
        duration_ms: 222_973,
        features: Some((0.352, 0.918, 0.236, 148.03, 0.00121, 0.0, 1, 1)),
    },
    FixtureTrack {
        id: TRACK_4_ID,
        name: TRACK_4_NAME,
        artist_id: "1Xyo4u8uXC1ZmMpatF05PJ",
        artist: ARTIST_4_NAME,
        album: "After Hours",
        duration_ms: 200_040,
        features: None,
    },
];

pub const ARTISTS: &[FixtureArtist] = &[
    FixtureArtist {
        id: "0gxyHStUsqpMadRV0Di1Qt",
        name: ARTIST_1_NAME,
        genres: &["dance pop", "new wave pop"],
        popularity: 72,
    },
    FixtureArtist {
        id: "2jzc5TC5TVFLXQlBNiIUzE",
        name: ARTIST_2_NAME,
        genres: &["new romantic", "new wave", "new wave pop", "synthpop"],
        popularity: 75,
    },
    FixtureArtist {
        id: "0C0XlULifJtAgn6ZNCW2eu",
        name: ARTIST_3_NAME,
        genres: &[],
        popularity: 80,
    },
];

pub fn find_track(id: &str) -> Option<&'static FixtureTrack> {
    TRACKS.iter().find(|t| t.id == id)
}

pub fn track_json(track: &FixtureTrack) -> Value {
    json!({
        "id": track.id,
        "name": track.name,
        "uri": format!("spotify:track:{}", track.id),
        "duration_ms": track.duration_ms,
        "artists": [{ "id": track.artist_id, "name": track.artist }],
        "album": { "name": track.album },
        "popularity": 50,
    })
}

pub fn artist_json(artist: &FixtureArtist) -> Value {
    json!({
        "id": artist.id,
        "name": artist.name,
        "genres": artist.genres,
        "popularity": artist.popularity,
    })
}

pub fn features_json(track: &FixtureTrack) -> Value {
    match track.features {
        Some((danceability, energy, valence, tempo, acousticness, instrumentalness, key, mode)) => {
            json!({
                "id": track.id,
                "danceability": danceability,
                "energy": energy,
                "valence": valence,
                "tempo": tempo,
                "acousticness": acousticness,
                "instrumentalness": instrumentalness,
                "key": key,
                "mode": mode,
                "time_signature": 4,
                "loudness": -8.0,
            })
        }
        None => Value::Null,
    }
}

/// Free text matches when either string contains the other. The
/// `track:<name> artist:<artist>` form requires both to match exactly.
pub fn search_tracks(query: &str) -> Vec<&'static FixtureTrack> {
    let query = query.to_lowercase();
    if let Some(rest) = query.strip_prefix("track:") {
        let (name, artist) = match rest.split_once(" artist:") {
            Some((name, artist)) => (name.trim(), Some(artist.trim())),
            None => (rest.trim(), None),
        };
        return TRACKS
            .iter()
            .filter(|t| t.name.to_lowercase() == name)
            .filter(|t| artist.map_or(true, |a| t.artist.to_lowercase() == a))
            .collect();
    }
    TRACKS
        .iter()
        .filter(|t| {
            let name = t.name.to_lowercase();
            name.contains(&query) || query.contains(&name)
        })
        .collect()
}

pub fn search_artists(query: &str) -> Vec<&'static FixtureArtist> {
    let query = query.to_lowercase();
    ARTISTS
        .iter()
        .filter(|a| a.name.to_lowercase().contains(&query))
        .collect()
}

/// Items of the fixture playlist: two pages, one removed track.
pub fn playlist_items(page: usize) -> Vec<Value> {
    let item = |id: &str| json!({ "track": find_track(id).map(track_json) });
    match page {
        0 => vec![item(TRACK_1_ID), item(TRACK_2_ID)],
        _ => vec![item(TRACK_3_ID), json!({ "track": null }), item(TRACK_1_ID)],
    }
}
