//! Music Tools
//!
//! One tool per orchestrator operation. Operation failures become tool
//! results with `isError` set; only malformed arguments are JSON-RPC errors.

use serde::Deserialize;
use serde_json::Value;

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ToolsCallResult};
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};
use crate::intelligence::synthesizer::MOOD_KEYWORDS;
use crate::render;

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(get_current_track_tool());
    registry.register_tool(play_track_tool());
    registry.register_tool(control_playback_tool());
    registry.register_tool(get_recommendations_tool());
    registry.register_tool(analyze_track_tool());
    registry.register_tool(analyze_playlist_tool());
    registry.register_tool(create_ai_playlist_tool());
    registry.register_tool(get_top_items_tool());
    registry.register_tool(analyze_and_recommend_tool());
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, McpError> {
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn string_schema(description: &str) -> Value {
    serde_json::json!({ "type": "string", "description": description })
}

// ============================================================================
// get_current_track
// ============================================================================

fn get_current_track_tool() -> RegisteredTool {
    ToolBuilder::new("get_current_track")
        .description(
            "Get the track currently playing on the user's account, with its audio analysis",
        )
        .build(get_current_track_handler)
}

async fn get_current_track_handler(ctx: ToolContext, _params: Value) -> ToolResult {
    Ok(match ctx.orchestrator.get_current_track().await {
        Ok(now) => ToolsCallResult::text(render::now_playing(now.as_ref())),
        Err(e) => ToolsCallResult::error(render::failure("Error", &e)),
    })
}

// ============================================================================
// play_track
// ============================================================================

#[derive(Debug, Deserialize)]
struct PlayTrackParams {
    query: String,
}

fn play_track_tool() -> RegisteredTool {
    ToolBuilder::new("play_track")
        .description("Search for a track and start playing the best match")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "query": string_schema("Track name, optionally with the artist")
            },
            "required": ["query"]
        }))
        .build(play_track_handler)
}

async fn play_track_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: PlayTrackParams = parse_params(params)?;
    Ok(match ctx.orchestrator.play_track(&params.query).await {
        Ok(track) => ToolsCallResult::text(render::now_playing_confirmation(&track)),
        Err(e) => ToolsCallResult::error(render::failure("Error playing track", &e)),
    })
}

// ============================================================================
// control_playback
// ============================================================================

#[derive(Debug, Deserialize)]
struct ControlPlaybackParams {
    action: String,
}

fn control_playback_tool() -> RegisteredTool {
    ToolBuilder::new("control_playback")
        .description("Control playback: play, pause, next (skip) or previous (prev)")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "Playback action",
                    "enum": ["play", "pause", "next", "skip", "previous", "prev"]
                }
            },
            "required": ["action"]
        }))
        .build(control_playback_handler)
}

async fn control_playback_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ControlPlaybackParams = parse_params(params)?;
    Ok(match ctx.orchestrator.control_playback(&params.action).await {
        Ok(action) => ToolsCallResult::text(render::playback_confirmation(action)),
        Err(e) => ToolsCallResult::error(render::failure("Error controlling playback", &e)),
    })
}

// ============================================================================
// get_recommendations
// ============================================================================

#[derive(Debug, Deserialize, Default)]
struct RecommendationsParams {
    #[serde(default)]
    seed_tracks: Option<String>,
    #[serde(default)]
    seed_artists: Option<String>,
    #[serde(default)]
    mood: Option<String>,
}

fn get_recommendations_tool() -> RegisteredTool {
    ToolBuilder::new("get_recommendations")
        .description(
            "Recommend tracks from seed track and artist names and an optional mood. \
             Without seeds, the user's top tracks are used.",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "seed_tracks": string_schema("Comma-separated track names"),
                "seed_artists": string_schema("Comma-separated artist names"),
                "mood": {
                    "type": "string",
                    "description": "Optional mood to bias the recommendations",
                    "enum": MOOD_KEYWORDS
                }
            }
        }))
        .build(get_recommendations_handler)
}

async fn get_recommendations_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: RecommendationsParams = parse_params(params)?;
    let result = ctx
        .orchestrator
        .get_recommendations(
            params.seed_tracks.as_deref(),
            params.seed_artists.as_deref(),
            params.mood.as_deref(),
        )
        .await;
    Ok(match result {
        Ok(tracks) => ToolsCallResult::text(render::recommendations(&tracks)),
        Err(e) => ToolsCallResult::error(render::failure("Error getting recommendations", &e)),
    })
}

// ============================================================================
// analyze_track
// ============================================================================

#[derive(Debug, Deserialize)]
struct TrackRefParams {
    track_id_or_name: String,
}

fn track_ref_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "track_id_or_name": string_schema(
                "Spotify track id, URI or link, or a free-text track name"
            )
        },
        "required": ["track_id_or_name"]
    })
}

fn analyze_track_tool() -> RegisteredTool {
    ToolBuilder::new("analyze_track")
        .description("Analyze a track's audio features and describe its mood")
        .input_schema(track_ref_schema())
        .build(analyze_track_handler)
}

async fn analyze_track_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: TrackRefParams = parse_params(params)?;
    Ok(match ctx.orchestrator.analyze_track(&params.track_id_or_name).await {
        Ok(analysis) => ToolsCallResult::text(render::track_analysis(&analysis)),
        Err(e) => ToolsCallResult::error(render::failure("Error analyzing track", &e)),
    })
}

// ============================================================================
// analyze_playlist
// ============================================================================

#[derive(Debug, Deserialize)]
struct AnalyzePlaylistParams {
    playlist_url: String,
}

fn analyze_playlist_tool() -> RegisteredTool {
    ToolBuilder::new("analyze_playlist")
        .description(
            "Analyze up to 100 tracks of a playlist: average audio features, \
             overall mood and top artists",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "playlist_url": string_schema("Playlist link, URI or id")
            },
            "required": ["playlist_url"]
        }))
        .build(analyze_playlist_handler)
}

async fn analyze_playlist_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: AnalyzePlaylistParams = parse_params(params)?;
    Ok(match ctx.orchestrator.analyze_playlist(&params.playlist_url).await {
        Ok(report) => ToolsCallResult::text(render::playlist_analysis(&report)),
        Err(e) => ToolsCallResult::error(render::failure("Error analyzing playlist", &e)),
    })
}

// ============================================================================
// create_ai_playlist
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreatePlaylistParams {
    prompt: String,
    #[serde(default)]
    name: Option<String>,
}

fn create_ai_playlist_tool() -> RegisteredTool {
    ToolBuilder::new("create_ai_playlist")
        .description(
            "Create a playlist from a free-text description. Tracks are suggested \
             by a language model and matched against the catalog.",
        )
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": string_schema("Description of the playlist to create"),
                "name": string_schema("Playlist name; generated when omitted")
            },
            "required": ["prompt"]
        }))
        .build(create_ai_playlist_handler)
}

async fn create_ai_playlist_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreatePlaylistParams = parse_params(params)?;
    let result = ctx
        .orchestrator
        .create_ai_playlist(&params.prompt, params.name.as_deref())
        .await;
    Ok(match result {
        Ok(report) => ToolsCallResult::text(render::generation(&report)),
        Err(e) => ToolsCallResult::error(render::failure("Error creating AI playlist", &e)),
    })
}

// ============================================================================
// get_top_items
// ============================================================================

#[derive(Debug, Deserialize)]
struct TopItemsParams {
    #[serde(default = "default_item_type")]
    item_type: String,
    #[serde(default = "default_time_range")]
    time_range: String,
}

fn default_item_type() -> String {
    "tracks".to_string()
}

fn default_time_range() -> String {
    "medium_term".to_string()
}

fn get_top_items_tool() -> RegisteredTool {
    ToolBuilder::new("get_top_items")
        .description("Get the user's top tracks or artists over a time range")
        .input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "item_type": {
                    "type": "string",
                    "description": "What to list (default tracks)",
                    "enum": ["tracks", "artists"]
                },
                "time_range": {
                    "type": "string",
                    "description": "short_term (4 weeks), medium_term (6 months, default) or long_term (years)",
                    "enum": ["short_term", "medium_term", "long_term"]
                }
            }
        }))
        .build(get_top_items_handler)
}

async fn get_top_items_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: TopItemsParams = parse_params(params)?;
    let result = ctx
        .orchestrator
        .get_top_items(&params.item_type, &params.time_range)
        .await;
    Ok(match result {
        Ok(report) => ToolsCallResult::text(render::top_items(&report)),
        Err(e) => {
            let prefix = format!("Error getting top {}", params.item_type);
            ToolsCallResult::error(render::failure(&prefix, &e))
        }
    })
}

// ============================================================================
// analyze_and_recommend
// ============================================================================

fn analyze_and_recommend_tool() -> RegisteredTool {
    ToolBuilder::new("analyze_and_recommend")
        .description("Analyze a track, then recommend similar tracks")
        .input_schema(track_ref_schema())
        .build(analyze_and_recommend_handler)
}

async fn analyze_and_recommend_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: TrackRefParams = parse_params(params)?;
    let result = ctx
        .orchestrator
        .analyze_and_recommend(&params.track_id_or_name)
        .await;
    Ok(match result {
        Ok(composite) => ToolsCallResult::text(render::analysis_with_recommendations(&composite)),
        // Same text analyze_track would show
        Err(e) => ToolsCallResult::error(render::failure("Error analyzing track", &e)),
    })
}
