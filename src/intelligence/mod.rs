//! Music intelligence components.
//!
//! - `features`: mood classification of single tracks and aggregates
//! - `synthesizer`: seed/mood resolution into recommendation parameters
//! - `aggregator`: playlist statistics over paginated items
//! - `generation`: prompt-to-playlist pipeline
//! - `analysis`, `playback`, `insights`: single-purpose operations
//!
//! Components take the collaborators as trait objects and return structured
//! values; rendering to text happens in [`crate::render`].

pub mod aggregator;
pub mod analysis;
mod error;
pub mod features;
pub mod generation;
pub mod insights;
pub mod playback;
pub mod synthesizer;

pub use aggregator::{aggregate, AggregateReport, ArtistCount};
pub use analysis::{analyze_track, TrackAnalysis};
pub use error::MusicError;
pub use features::{classify, classify_aggregate, key_name, FeatureMeans, MoodLabel};
pub use generation::{
    GenerationFailure, GenerationPipeline, GenerationReport, GenerationStage, PlaylistConcept,
    SuggestedTrack,
};
pub use insights::{TopItemType, TopItems, TopItemsReport};
pub use playback::{NowPlaying, PlaybackAction};
pub use synthesizer::{MoodTargets, RecommendationParameters, SeedSet};
