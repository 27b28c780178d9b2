//! Text rendering of operation results.
//!
//! Every tool answer is plain text meant to be read by a person or relayed
//! by an agent. All report layouts live here.

use crate::intelligence::{
    key_name, AggregateReport, GenerationReport, MusicError, NowPlaying, PlaybackAction,
    TopItems, TopItemsReport, TrackAnalysis,
};
use crate::orchestrator::CompositeAnalysis;
use crate::spotify::{AudioFeatures, Track};

pub const NOTHING_PLAYING: &str = "No track is currently playing.";
pub const NO_RECOMMENDATIONS: &str =
    "No recommendations found. Try different seed tracks or artists.";
pub const SIMILAR_TRACKS_SEPARATOR: &str = "\n\n--- SIMILAR TRACKS ---\n\n";

/// Text for a failed operation.
///
/// Self-describing errors are shown as is; service failures get the
/// operation prefix, e.g. "Error analyzing playlist: ...".
pub fn failure(prefix: &str, err: &MusicError) -> String {
    if err.is_self_describing() {
        err.to_string()
    } else {
        format!("{}: {}", prefix, err)
    }
}

/// `m:ss`
pub fn format_duration(ms: u64) -> String {
    format!("{}:{:02}", ms / 60_000, (ms % 60_000) / 1000)
}

fn feature_lines(features: &AudioFeatures, include_instrumentalness: bool) -> String {
    let mut lines = format!(
        "- Danceability: {:.2}/1.0\n\
         - Energy: {:.2}/1.0\n\
         - Positivity: {:.2}/1.0\n\
         - Tempo: {:.1} BPM\n\
         - Acousticness: {:.2}/1.0\n",
        features.danceability,
        features.energy,
        features.valence,
        features.tempo,
        features.acousticness
    );
    if include_instrumentalness {
        lines.push_str(&format!(
            "- Instrumentalness: {:.2}/1.0\n",
            features.instrumentalness
        ));
    }
    lines
}

pub fn now_playing(now: Option<&NowPlaying>) -> String {
    let now = match now {
        Some(now) => now,
        None => return NOTHING_PLAYING.to_string(),
    };

    let track = &now.track;
    let mut out = format!(
        "Currently Playing: \"{}\" by {}\nAlbum: {}\nDuration: {}\nProgress: {}\n",
        track.name,
        track.artist_names(),
        track.album.name,
        format_duration(track.duration_ms),
        format_duration(now.progress_ms)
    );

    match &now.analysis {
        Some((features, mood)) => {
            out.push_str("\nAudio Analysis:\n");
            out.push_str(&feature_lines(features, false));
            out.push_str(&format!("\nMood: This track sounds {}.\n", mood));
        }
        None => out.push_str("\nAudio analysis not available for this track."),
    }
    out
}

pub fn now_playing_confirmation(track: &Track) -> String {
    let artist = track
        .primary_artist()
        .map(|a| a.name.as_str())
        .unwrap_or("Unknown Artist");
    format!("Now playing: {} by {}", track.name, artist)
}

pub fn playback_confirmation(action: PlaybackAction) -> String {
    match action {
        PlaybackAction::Play => "Playback started",
        PlaybackAction::Pause => "Playback paused",
        PlaybackAction::Next => "Skipped to next track",
        PlaybackAction::Previous => "Returned to previous track",
    }
    .to_string()
}

pub fn recommendations(tracks: &[Track]) -> String {
    if tracks.is_empty() {
        return NO_RECOMMENDATIONS.to_string();
    }

    let mut out = String::from("Recommended tracks:\n\n");
    for (i, track) in tracks.iter().enumerate() {
        out.push_str(&format!(
            "{}. \"{}\" by {}\n   Album: {}\n   Spotify URI: {}\n\n",
            i + 1,
            track.name,
            track.artist_names(),
            track.album.name,
            track.uri
        ));
    }
    out
}

pub fn track_analysis(analysis: &TrackAnalysis) -> String {
    let track = &analysis.track;
    let features = &analysis.features;

    format!(
        "Track Analysis: \"{}\" by {}\n\
         Album: {}\n\
         \n\
         Audio Features:\n\
         {}\n\
         Mood: This track sounds {}.\n\
         \n\
         Key: {}\n\
         Time Signature: {}/4\n",
        track.name,
        track.artist_names(),
        track.album.name,
        feature_lines(features, true),
        analysis.mood,
        key_name(features.key, features.mode),
        features.time_signature
    )
}

pub fn playlist_analysis(report: &AggregateReport) -> String {
    let means = &report.means;

    let mut out = format!(
        "Playlist Analysis: \"{}\" by {}\n\
         Total Tracks: {}\n\
         \n\
         Musical Characteristics:\n\
         - Danceability: {:.2}/1.0\n\
         - Energy: {:.2}/1.0\n\
         - Positivity: {:.2}/1.0\n\
         - Average Tempo: {:.1} BPM\n\
         - Acousticness: {:.2}/1.0\n\
         - Instrumentalness: {:.2}/1.0\n\
         \n\
         Overall Mood: This playlist sounds {}.\n\
         \n\
         Top Artists:\n",
        report.name,
        report.owner,
        report.total_tracks,
        means.danceability,
        means.energy,
        means.valence,
        means.tempo,
        means.acousticness,
        means.instrumentalness,
        report.mood
    );
    for artist in &report.top_artists {
        out.push_str(&format!("- {}: {} tracks\n", artist.name, artist.tracks));
    }
    out
}

pub fn generation(report: &GenerationReport) -> String {
    let mut out = format!(
        "Created playlist: \"{}\"\n\
         Description: {}\n\
         Link: {}\n\
         \n\
         Added {} tracks to the playlist.\n",
        report.name,
        report.description,
        report.link.as_deref().unwrap_or("(no link available)"),
        report.added
    );

    if !report.unresolved.is_empty() {
        out.push_str("\nThe following tracks couldn't be found on Spotify:\n");
        for suggestion in &report.unresolved {
            out.push_str(&format!("- {}\n", suggestion));
        }
    }
    out
}

pub fn top_items(report: &TopItemsReport) -> String {
    let period = report.time_range.description();

    match &report.items {
        TopItems::Tracks(tracks) => {
            let mut out = format!("Your top tracks from the {}:\n\n", period);
            for (i, track) in tracks.iter().enumerate() {
                out.push_str(&format!(
                    "{}. \"{}\" by {}\n   Album: {}\n\n",
                    i + 1,
                    track.name,
                    track.artist_names(),
                    track.album.name
                ));
            }
            out
        }
        TopItems::Artists(artists) => {
            let mut out = format!("Your top artists from the {}:\n\n", period);
            for (i, artist) in artists.iter().enumerate() {
                let genres = if artist.genres.is_empty() {
                    "No genres listed".to_string()
                } else {
                    artist
                        .genres
                        .iter()
                        .take(3)
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                out.push_str(&format!(
                    "{}. {}\n   Genres: {}\n   Popularity: {}/100\n\n",
                    i + 1,
                    artist.name,
                    genres,
                    artist.popularity
                ));
            }
            out
        }
    }
}

pub fn analysis_with_recommendations(composite: &CompositeAnalysis) -> String {
    let recommendations = match &composite.recommendations {
        Ok(tracks) => recommendations(tracks),
        Err(err) => failure("Error getting recommendations", err),
    };
    format!(
        "{}{}{}",
        track_analysis(&composite.analysis),
        SIMILAR_TRACKS_SEPARATOR,
        recommendations
    )
}
