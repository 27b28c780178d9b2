//! In-process mock of the Spotify Web API and an OpenAI-compatible chat
//! completions endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::constants::*;
use super::fixtures::{self, ARTISTS, TRACKS};

#[derive(Default)]
struct MockData {
    base_url: String,
    active_device: AtomicBool,
    now_playing: Mutex<Option<&'static str>>,
    requests: Mutex<Vec<String>>,
    recommendation_queries: Mutex<Vec<HashMap<String, String>>>,
    added_items: Mutex<Vec<Value>>,
    created_playlists: Mutex<Vec<Value>>,
    chat_requests: Mutex<Vec<Value>>,
}

#[derive(Clone)]
struct MockState(Arc<MockData>);

pub struct MockSpotify {
    pub base_url: String,
    data: Arc<MockData>,
}

impl MockSpotify {
    /// Spawn the mock on a random local port.
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let data = Arc::new(MockData {
            base_url: base_url.clone(),
            active_device: AtomicBool::new(true),
            ..Default::default()
        });
        let app = make_app(MockState(data.clone()));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, data }
    }

    pub fn api_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    pub fn openai_url(&self) -> String {
        format!("{}/openai", self.base_url)
    }

    pub fn set_active_device(&self, active: bool) {
        self.data.active_device.store(active, Ordering::SeqCst);
    }

    pub fn set_now_playing(&self, track_id: Option<&'static str>) {
        *self.data.now_playing.lock().unwrap() = track_id;
    }

    /// "METHOD /path" of every authorized API request, in order.
    pub fn requests(&self) -> Vec<String> {
        self.data.requests.lock().unwrap().clone()
    }

    pub fn count_requests(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn recommendation_queries(&self) -> Vec<HashMap<String, String>> {
        self.data.recommendation_queries.lock().unwrap().clone()
    }

    pub fn added_items(&self) -> Vec<Value> {
        self.data.added_items.lock().unwrap().clone()
    }

    pub fn created_playlists(&self) -> Vec<Value> {
        self.data.created_playlists.lock().unwrap().clone()
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.data.chat_requests.lock().unwrap().clone()
    }
}

fn make_app(state: MockState) -> Router {
    let api = Router::new()
        .route("/v1/search", get(search))
        .route("/v1/tracks/{id}", get(get_track))
        .route("/v1/audio-features", get(audio_features))
        .route("/v1/recommendations", get(recommendations))
        .route("/v1/playlists/{id}", get(get_playlist))
        .route(
            "/v1/playlists/{id}/tracks",
            get(playlist_page).post(add_items),
        )
        .route("/v1/me", get(current_user))
        .route("/v1/users/{user}/playlists", post(create_playlist))
        .route("/v1/me/player", get(current_playback))
        .route("/v1/me/player/play", put(player_command))
        .route("/v1/me/player/pause", put(player_command))
        .route("/v1/me/player/next", post(player_command))
        .route("/v1/me/player/previous", post(player_command))
        .route("/v1/me/top/tracks", get(top_tracks))
        .route("/v1/me/top/artists", get(top_artists))
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize));

    Router::new()
        .merge(api)
        .route("/openai/chat/completions", post(chat_completions))
        .with_state(state)
}

fn api_error(status: StatusCode, message: &str, reason: Option<&str>) -> Response {
    let mut error = json!({ "status": status.as_u16(), "message": message });
    if let Some(reason) = reason {
        error["reason"] = json!(reason);
    }
    (status, Json(json!({ "error": error }))).into_response()
}

async fn authorize(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", TEST_TOKEN);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid access token", None);
    }

    state.0.requests.lock().unwrap().push(format!(
        "{} {}",
        request.method(),
        request.uri().path()
    ));
    next.run(request).await
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("q").cloned().unwrap_or_default();
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);

    match params.get("type").map(String::as_str) {
        Some("track") => {
            let items: Vec<Value> = fixtures::search_tracks(&query)
                .into_iter()
                .take(limit)
                .map(fixtures::track_json)
                .collect();
            Json(json!({ "tracks": { "items": items, "total": items.len() } })).into_response()
        }
        Some("artist") => {
            let items: Vec<Value> = fixtures::search_artists(&query)
                .into_iter()
                .take(limit)
                .map(fixtures::artist_json)
                .collect();
            Json(json!({ "artists": { "items": items, "total": items.len() } })).into_response()
        }
        _ => api_error(StatusCode::BAD_REQUEST, "Bad search type field", None),
    }
}

async fn get_track(Path(id): Path<String>) -> Response {
    match fixtures::find_track(&id) {
        Some(track) => Json(fixtures::track_json(track)).into_response(),
        None => api_error(StatusCode::BAD_REQUEST, "Invalid base62 id", None),
    }
}

async fn audio_features(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let features: Vec<Value> = params
        .get("ids")
        .map(|ids| {
            ids.split(',')
                .map(|id| fixtures::find_track(id).map_or(Value::Null, fixtures::features_json))
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "audio_features": features }))
}

async fn recommendations(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let has_seed = ["seed_tracks", "seed_artists", "seed_genres"]
        .iter()
        .any(|k| params.contains_key(*k));
    state.0.recommendation_queries.lock().unwrap().push(params);
    if !has_seed {
        return api_error(StatusCode::BAD_REQUEST, "No seeds provided", None);
    }
    let tracks: Vec<Value> = [fixtures::TRACKS[1].id, fixtures::TRACKS[2].id]
        .iter()
        .filter_map(|id| fixtures::find_track(id))
        .map(fixtures::track_json)
        .collect();
    Json(json!({ "tracks": tracks, "seeds": [] })).into_response()
}

fn page_json(state: &MockState, playlist_id: &str, page: usize) -> Value {
    let items = fixtures::playlist_items(page);
    let next = match page {
        0 => json!(format!(
            "{}/v1/playlists/{}/tracks?offset=2&limit=2",
            state.0.base_url, playlist_id
        )),
        _ => Value::Null,
    };
    json!({ "items": items, "next": next, "total": 5 })
}

async fn get_playlist(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    if id != PLAYLIST_ID {
        return api_error(StatusCode::NOT_FOUND, "Resource not found", None);
    }
    Json(json!({
        "id": PLAYLIST_ID,
        "name": PLAYLIST_NAME,
        "owner": { "id": "spotify", "display_name": "Spotify" },
        "tracks": page_json(&state, &id, 0),
    }))
    .into_response()
}

async fn playlist_page(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if id != PLAYLIST_ID {
        return api_error(StatusCode::NOT_FOUND, "Resource not found", None);
    }
    let page = match params.get("offset").map(String::as_str) {
        Some("0") | None => 0,
        _ => 1,
    };
    Json(page_json(&state, &id, page)).into_response()
}

async fn add_items(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if id != CREATED_PLAYLIST_ID {
        return api_error(StatusCode::NOT_FOUND, "Resource not found", None);
    }
    state.0.added_items.lock().unwrap().push(body);
    (StatusCode::CREATED, Json(json!({ "snapshot_id": "snapshot" }))).into_response()
}

async fn current_user() -> Json<Value> {
    Json(json!({ "id": TEST_USER_ID, "display_name": "Test User" }))
}

async fn create_playlist(
    State(state): State<MockState>,
    Path(user): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if user != TEST_USER_ID {
        return api_error(StatusCode::FORBIDDEN, "You cannot create a playlist for another user", None);
    }
    let name = body["name"].clone();
    state.0.created_playlists.lock().unwrap().push(body);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": CREATED_PLAYLIST_ID,
            "name": name,
            "external_urls": {
                "spotify": format!("https://open.spotify.com/playlist/{}", CREATED_PLAYLIST_ID)
            },
        })),
    )
        .into_response()
}

async fn current_playback(State(state): State<MockState>) -> Response {
    let now_playing = *state.0.now_playing.lock().unwrap();
    match now_playing.and_then(fixtures::find_track) {
        Some(track) => Json(json!({
            "is_playing": true,
            "progress_ms": 83_000,
            "item": fixtures::track_json(track),
        }))
        .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn player_command(State(state): State<MockState>) -> Response {
    if !state.0.active_device.load(Ordering::SeqCst) {
        return api_error(
            StatusCode::NOT_FOUND,
            "Player command failed: No active device found",
            Some("NO_ACTIVE_DEVICE"),
        );
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn top_tracks(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);
    let items: Vec<Value> = TRACKS.iter().take(limit).map(fixtures::track_json).collect();
    Json(json!({ "items": items, "total": TRACKS.len(), "next": null }))
}

async fn top_artists(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);
    let items: Vec<Value> = ARTISTS
        .iter()
        .take(limit)
        .map(fixtures::artist_json)
        .collect();
    Json(json!({ "items": items, "total": ARTISTS.len(), "next": null }))
}

/// JSON-mode requests get the playlist concept; plain requests get a name.
async fn chat_completions(State(state): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    let json_mode = body["response_format"]["type"] == "json_object";
    state.0.chat_requests.lock().unwrap().push(body);

    let content = if json_mode {
        CONCEPT_JSON.to_string()
    } else {
        format!("\"{}\"", GENERATED_NAME)
    };
    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30 }
    }))
}
