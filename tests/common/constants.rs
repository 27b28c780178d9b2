//! Fixture data served by the mock Spotify API.
#![allow(dead_code)]

pub const TEST_TOKEN: &str = "test-access-token";
pub const TEST_USER_ID: &str = "testuser";

pub const TRACK_1_ID: &str = "4uLU6hMCjMI75M1A2tKUQC";
pub const TRACK_1_NAME: &str = "Never Gonna Give You Up";
pub const TRACK_2_ID: &str = "2WfaOiMkCvy7F5fcp2zZ8L";
pub const TRACK_2_NAME: &str = "Take On Me";
pub const TRACK_3_ID: &str = "3n3Ppam7vgaVa1iaRUc9Lp";
pub const TRACK_3_NAME: &str = "Mr. Brightside";
/// Has no audio features.
pub const TRACK_4_ID: &str = "0VjIjW4GlUZAMYd2vXMi3b";
pub const TRACK_4_NAME: &str = "Blinding Lights";

pub const ARTIST_1_NAME: &str = "Rick Astley";
pub const ARTIST_2_NAME: &str = "a-ha";
pub const ARTIST_3_NAME: &str = "The Killers";
pub const ARTIST_4_NAME: &str = "The Weeknd";

pub const PLAYLIST_ID: &str = "37i9dQZF1DXcBWIGoYBM5M";
pub const PLAYLIST_NAME: &str = "Today's Top Hits";
pub const CREATED_PLAYLIST_ID: &str = "newplaylist";

/// Concept returned by the mock chat completions endpoint: two of the three
/// suggestions exist in the catalog.
pub const CONCEPT_JSON: &str = r#"{
  "description": "Upbeat eighties classics",
  "tracks": [
    {"name": "Take On Me", "artist": "a-ha"},
    {"name": "Imaginary Song", "artist": "Nobody"},
    {"name": "Never Gonna Give You Up", "artist": "Rick Astley"}
  ]
}"#;
pub const GENERATED_NAME: &str = "Eighties Energy";
