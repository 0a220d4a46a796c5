//! Local HTTP server imitating the Auphonic API
//!
//! Serves the API under `/api` and output files under `/files`. Every API
//! route checks Basic auth for `user:secret`.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "secret";
/// base64("user:secret")
const EXPECTED_AUTH: &str = "Basic dXNlcjpzZWNyZXQ=";

/// Bytes served for every output file
pub const OUTPUT_BODY: &[u8] = b"RIFF-mock-processed-audio-payload";

/// Request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct ServerState {
    requests: Mutex<Vec<RecordedRequest>>,
    presets: Mutex<Vec<Value>>,
    polls: Mutex<u32>,
}

impl ServerState {
    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: &[u8]) {
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            body: body.to_vec(),
        });
    }
}

/// Running mock server
pub struct MockServer {
    pub base_url: String,
    pub root_url: String,
    pub state: Arc<ServerState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());

        let app = Router::new()
            .route("/api/presets.json", get(list_presets).post(create_preset))
            .route("/api/productions.json", post(create_production))
            .route("/api/production/:uuid/upload.json", post(upload))
            .route("/api/production/:uuid/start.json", post(start))
            .route("/api/production/:uuid", get(production_status))
            .route("/api/broken.json", get(broken))
            .route("/files/redirect/:name", get(redirect_download))
            .route("/files/final/:name", get(final_download))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let root_url = format!("http://{}", addr);
        Self {
            base_url: format!("{}/api", root_url),
            root_url,
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path_suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(path_suffix))
            .collect()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == EXPECTED_AUTH)
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "authentication required").into_response()
}

async fn list_presets(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/api/presets.json".to_string(), &headers, &[]);
    if !authorized(&headers) {
        return unauthorized();
    }
    let presets = state.presets.lock().unwrap().clone();
    Json(json!({ "data": presets })).into_response()
}

async fn create_preset(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record("POST", "/api/presets.json".to_string(), &headers, &body);
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut preset: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid json").into_response(),
    };
    preset["uuid"] = json!("preset-abc");
    state.presets.lock().unwrap().push(preset.clone());
    Json(json!({ "data": preset })).into_response()
}

async fn create_production(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record("POST", "/api/productions.json".to_string(), &headers, &body);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": { "uuid": "prod-1", "status": 9 } })).into_response()
}

async fn upload(
    State(state): State<Arc<ServerState>>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.record("POST", format!("/api/production/{}/upload.json", uuid), &headers, &body);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": { "uuid": uuid } })).into_response()
}

async fn start(
    State(state): State<Arc<ServerState>>,
    Path(uuid): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("POST", format!("/api/production/{}/start.json", uuid), &headers, &[]);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": { "uuid": uuid, "status": 1 } })).into_response()
}

/// WAITING on the first poll, DONE afterwards
async fn production_status(
    State(state): State<Arc<ServerState>>,
    Path(file): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("GET", format!("/api/production/{}", file), &headers, &[]);
    if !authorized(&headers) {
        return unauthorized();
    }
    let Some(uuid) = file.strip_suffix(".json") else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    let poll = {
        let mut polls = state.polls.lock().unwrap();
        *polls += 1;
        *polls
    };

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("127.0.0.1")
        .to_string();

    let data = if poll < 2 {
        json!({ "uuid": uuid, "status": 1, "output_files": [] })
    } else {
        json!({
            "uuid": uuid,
            "status": 3,
            "output_files": [
                {
                    "format": "wav",
                    "download_url": format!("http://{}/files/redirect/report_final.wav", host)
                }
            ],
        })
    };
    Json(json!({ "data": data })).into_response()
}

async fn broken(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/api/broken.json".to_string(), &headers, &[]);
    (StatusCode::INTERNAL_SERVER_ERROR, "something broke").into_response()
}

async fn redirect_download(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("GET", format!("/files/redirect/{}", name), &headers, &[]);
    Redirect::temporary(&format!("/files/final/{}", name)).into_response()
}

async fn final_download(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("GET", format!("/files/final/{}", name), &headers, &[]);
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        [(header::CONTENT_LENGTH, OUTPUT_BODY.len().to_string())],
        OUTPUT_BODY.to_vec(),
    )
        .into_response()
}
