//! Prompt-driven playlist generation.
//!
//! A run moves through the stages below; any collaborator failure aborts it
//! in `Failed`. The playlist is never created before `CollectionCreated`, so
//! a failed concept or name request leaves nothing behind.
//!
//! ```text
//! PromptReceived -> ConceptRequested -> ConceptReceived
//!   [-> NameRequested -> NameReceived]
//!   -> CollectionCreated -> ItemsResolving -> Completed
//! ```

use std::fmt;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use tracing::{debug, info};

use super::error::MusicError;
use crate::llm::{CompletionOptions, LlmProvider, Message};
use crate::spotify::{CatalogClient, CreatedPlaylist, NewPlaylist};

/// Suggestions requested from the model and the most that are resolved.
pub const SUGGESTION_COUNT: usize = 10;

const FALLBACK_NAME: &str = "AI Playlist";

const CONCEPT_SYSTEM_PROMPT: &str = "You are a music expert helping to create a Spotify playlist.";
const NAME_SYSTEM_PROMPT: &str = "You are a creative assistant helping to name a playlist.";

pub const MISSING_KEY_MESSAGE: &str =
    "OpenAI API key not configured. Please set the OPENAI_API_KEY environment variable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    PromptReceived,
    ConceptRequested,
    ConceptReceived,
    NameRequested,
    NameReceived,
    CollectionCreated,
    ItemsResolving,
    Completed,
    Failed,
}

/// Stage tracking for one generation run.
#[derive(Debug)]
pub struct PipelineRun {
    stage: GenerationStage,
    history: Vec<GenerationStage>,
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            stage: GenerationStage::PromptReceived,
            history: vec![GenerationStage::PromptReceived],
        }
    }

    pub fn stage(&self) -> GenerationStage {
        self.stage
    }

    fn advance(&mut self, next: GenerationStage) {
        debug!(from = ?self.stage, to = ?next, "Generation stage");
        self.stage = next;
        self.history.push(next);
    }

    /// Move to `Failed`, keeping the stage the error happened in.
    fn fail(&mut self, error: impl Into<MusicError>) -> GenerationFailure {
        let error = error.into();
        let stage = self.stage;
        self.stage = GenerationStage::Failed;
        self.history.push(GenerationStage::Failed);
        GenerationFailure {
            stage,
            error,
            history: self.history.clone(),
        }
    }
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

/// One (name, artist) suggestion from the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestedTrack {
    pub name: String,
    pub artist: String,
}

impl fmt::Display for SuggestedTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.name, self.artist)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaylistConcept {
    pub description: String,
    #[serde(default)]
    pub tracks: Vec<SuggestedTrack>,
}

impl PlaylistConcept {
    /// Parse the model's JSON answer, tolerating a surrounding code fence.
    pub fn parse(content: &str) -> Result<Self, MusicError> {
        let mut concept: PlaylistConcept = serde_json::from_str(strip_code_fence(content))
            .map_err(|e| {
                MusicError::MalformedUpstreamResponse(format!(
                    "Playlist concept is not valid JSON: {}",
                    e
                ))
            })?;
        concept.tracks.truncate(SUGGESTION_COUNT);
        Ok(concept)
    }
}

/// Outcome of searching for one suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    Resolved(String),
    Unresolved(SuggestedTrack),
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub name: String,
    pub description: String,
    pub playlist_id: String,
    pub link: Option<String>,
    pub added: usize,
    /// Suggestions with no catalog match, in suggestion order.
    pub unresolved: Vec<SuggestedTrack>,
}

#[derive(Debug)]
pub struct GenerationFailure {
    /// Stage the run was in when it failed.
    pub stage: GenerationStage,
    pub error: MusicError,
    pub history: Vec<GenerationStage>,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

pub struct GenerationPipeline<'a> {
    catalog: &'a dyn CatalogClient,
    llm: Option<&'a dyn LlmProvider>,
    max_concurrent: usize,
}

impl<'a> GenerationPipeline<'a> {
    pub fn new(
        catalog: &'a dyn CatalogClient,
        llm: Option<&'a dyn LlmProvider>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            catalog,
            llm,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Build a playlist from `prompt`, naming it `name` or a generated name.
    pub async fn generate(
        &self,
        prompt: &str,
        name: Option<&str>,
    ) -> Result<GenerationReport, GenerationFailure> {
        let mut run = PipelineRun::new();

        let llm = match self.llm {
            Some(llm) => llm,
            None => {
                return Err(
                    run.fail(MusicError::ConfigurationMissing(MISSING_KEY_MESSAGE.to_string()))
                )
            }
        };

        run.advance(GenerationStage::ConceptRequested);
        let concept = match self.request_concept(llm, prompt).await {
            Ok(concept) => concept,
            Err(e) => return Err(run.fail(e)),
        };
        run.advance(GenerationStage::ConceptReceived);
        debug!(suggestions = concept.tracks.len(), "Concept received");

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                run.advance(GenerationStage::NameRequested);
                let generated = match self.request_name(llm, &concept.description).await {
                    Ok(name) => name,
                    Err(e) => return Err(run.fail(e)),
                };
                run.advance(GenerationStage::NameReceived);
                generated
            }
        };

        let created = match self.create_playlist(&name, &concept.description).await {
            Ok(created) => created,
            Err(e) => return Err(run.fail(e)),
        };
        run.advance(GenerationStage::CollectionCreated);
        info!(playlist = %created.id, name = %name, "Playlist created");

        run.advance(GenerationStage::ItemsResolving);
        let resolutions = match self.resolve(&concept.tracks).await {
            Ok(resolutions) => resolutions,
            Err(e) => return Err(run.fail(e)),
        };

        let mut uris = Vec::new();
        let mut unresolved = Vec::new();
        for resolution in resolutions {
            match resolution {
                ResolutionResult::Resolved(uri) => uris.push(uri),
                ResolutionResult::Unresolved(suggestion) => unresolved.push(suggestion),
            }
        }

        if !uris.is_empty() {
            if let Err(e) = self.catalog.add_playlist_items(&created.id, &uris).await {
                return Err(run.fail(e));
            }
        }
        run.advance(GenerationStage::Completed);

        Ok(GenerationReport {
            name,
            description: concept.description,
            playlist_id: created.id,
            link: created.external_urls.spotify,
            added: uris.len(),
            unresolved,
        })
    }

    async fn request_concept(
        &self,
        llm: &dyn LlmProvider,
        prompt: &str,
    ) -> Result<PlaylistConcept, MusicError> {
        let messages = [
            Message::system(CONCEPT_SYSTEM_PROMPT),
            Message::user(format!(
                "Create a concept for a playlist based on this prompt: '{}'. \
                 Provide a short description and suggest {} specific songs with their artists \
                 that would fit this playlist. Format as JSON with 'description' and 'tracks' fields, \
                 where 'tracks' is an array of objects with 'name' and 'artist' properties.",
                prompt, SUGGESTION_COUNT
            )),
        ];
        let response = llm.complete(&messages, &CompletionOptions::json()).await?;
        PlaylistConcept::parse(&response.content)
    }

    async fn request_name(
        &self,
        llm: &dyn LlmProvider,
        description: &str,
    ) -> Result<String, MusicError> {
        let messages = [
            Message::system(NAME_SYSTEM_PROMPT),
            Message::user(format!(
                "Create a catchy, concise name (max 5 words) for a playlist with this description: '{}'",
                description
            )),
        ];
        let response = llm
            .complete(&messages, &CompletionOptions::default())
            .await?;
        Ok(clean_name(&response.content))
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist, MusicError> {
        let user = self.catalog.get_current_user().await?;
        let playlist = NewPlaylist {
            name: name.to_string(),
            public: false,
            description: description.to_string(),
        };
        Ok(self.catalog.create_playlist(&user.id, &playlist).await?)
    }

    /// Search every suggestion, preserving suggestion order in the result.
    async fn resolve(
        &self,
        suggestions: &[SuggestedTrack],
    ) -> Result<Vec<ResolutionResult>, MusicError> {
        let catalog = self.catalog;
        let results = stream::iter(suggestions.to_vec())
            .map(|suggestion| async move {
                let query = format!("track:{} artist:{}", suggestion.name, suggestion.artist);
                let found = catalog.search_tracks(&query, 1).await?;
                Ok::<_, MusicError>(match found.into_iter().next() {
                    Some(track) => ResolutionResult::Resolved(track.uri),
                    None => {
                        debug!(suggestion = %suggestion, "Suggestion not found");
                        ResolutionResult::Unresolved(suggestion)
                    }
                })
            })
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;
        Ok(results)
    }
}

/// Trim a generated name and strip surrounding quotes.
fn clean_name(raw: &str) -> String {
    let name = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”'))
        .trim();
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
