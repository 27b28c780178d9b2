//! Routes named operations to the component that owns them and composes
//! multi-step workflows.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::intelligence::{
    aggregator, analysis, generation::GenerationPipeline, insights, playback, synthesizer,
    AggregateReport, GenerationReport, MusicError, NowPlaying, PlaybackAction, TopItemType,
    TopItemsReport, TrackAnalysis,
};
use crate::llm::LlmProvider;
use crate::spotify::{CatalogClient, Track};

/// Analysis of a track followed by tracks similar to it.
#[derive(Debug)]
pub struct CompositeAnalysis {
    pub analysis: TrackAnalysis,
    /// Recommendation failures do not discard the analysis.
    pub recommendations: Result<Vec<Track>, MusicError>,
}

pub struct MusicOrchestrator {
    catalog: Arc<dyn CatalogClient>,
    llm: Option<Arc<dyn LlmProvider>>,
    max_concurrent_requests: usize,
}

impl MusicOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        llm: Option<Arc<dyn LlmProvider>>,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            catalog,
            llm,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn get_current_track(&self) -> Result<Option<NowPlaying>, MusicError> {
        playback::current_track(self.catalog.as_ref()).await
    }

    pub async fn play_track(&self, query: &str) -> Result<Track, MusicError> {
        playback::play_track(self.catalog.as_ref(), query).await
    }

    /// Parse and run a playback action; unknown actions are rejected
    /// without contacting the service.
    pub async fn control_playback(&self, action: &str) -> Result<PlaybackAction, MusicError> {
        let action: PlaybackAction = action.parse()?;
        playback::control(self.catalog.as_ref(), action).await
    }

    pub async fn get_recommendations(
        &self,
        seed_tracks: Option<&str>,
        seed_artists: Option<&str>,
        mood: Option<&str>,
    ) -> Result<Vec<Track>, MusicError> {
        let catalog = self.catalog.as_ref();
        let params = synthesizer::synthesize(catalog, seed_tracks, seed_artists, mood).await?;
        debug!(params = ?params, "Requesting recommendations");
        synthesizer::recommend(catalog, &params).await
    }

    pub async fn analyze_track(&self, track_id_or_name: &str) -> Result<TrackAnalysis, MusicError> {
        analysis::analyze_track(self.catalog.as_ref(), track_id_or_name).await
    }

    pub async fn analyze_playlist(&self, playlist_url: &str) -> Result<AggregateReport, MusicError> {
        aggregator::aggregate(
            self.catalog.as_ref(),
            playlist_url,
            self.max_concurrent_requests,
        )
        .await
    }

    pub async fn create_ai_playlist(
        &self,
        prompt: &str,
        name: Option<&str>,
    ) -> Result<GenerationReport, MusicError> {
        let pipeline = GenerationPipeline::new(
            self.catalog.as_ref(),
            self.llm.as_deref(),
            self.max_concurrent_requests,
        );
        let report = pipeline.generate(prompt, name).await.map_err(|failure| {
            warn!(
                stage = ?failure.stage,
                history = ?failure.history,
                error = %failure.error,
                "Playlist generation failed"
            );
            failure.error
        })?;
        info!(
            playlist = %report.playlist_id,
            added = report.added,
            unresolved = report.unresolved.len(),
            "AI playlist created"
        );
        Ok(report)
    }

    /// Validates both arguments before any call is made.
    pub async fn get_top_items(
        &self,
        item_type: &str,
        time_range: &str,
    ) -> Result<TopItemsReport, MusicError> {
        let item_type: TopItemType = item_type.parse()?;
        let time_range = insights::parse_time_range(time_range)?;
        insights::top_items(self.catalog.as_ref(), item_type, time_range).await
    }

    /// Analyze a track, then recommend tracks seeded by that track alone.
    ///
    /// An analysis failure is returned as is and no recommendation request
    /// is made.
    pub async fn analyze_and_recommend(
        &self,
        track_id_or_name: &str,
    ) -> Result<CompositeAnalysis, MusicError> {
        let analysis = self.analyze_track(track_id_or_name).await?;
        let catalog = self.catalog.as_ref();
        let recommendations = async {
            let params = synthesizer::synthesize_for_track(catalog, &analysis.track).await?;
            debug!(params = ?params, "Requesting recommendations for analyzed track");
            synthesizer::recommend(catalog, &params).await
        }
        .await;
        Ok(CompositeAnalysis {
            analysis,
            recommendations,
        })
    }
}
