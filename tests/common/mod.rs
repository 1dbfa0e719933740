//! In-process mock registry for integration tests
//!
//! Serves just enough of the registry and deployment REST surface for the
//! blocking client to exercise real HTTP round trips. Every request is
//! recorded so tests can assert exact bodies and "zero destination
//! mutations". Signed artifact URLs point back at the mock's own /blob
//! store, so artifact bytes genuinely round-trip.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

pub type Shared = Arc<Mutex<RegistryState>>;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn is_mutation(&self) -> bool {
        matches!(self.method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
    }
}

#[derive(Debug, Default)]
pub struct RegistryState {
    base_url: String,
    pub model_versions: HashMap<u64, Value>,
    pub registered_models: HashMap<u64, Value>,
    pub builds: HashMap<u64, Value>,
    pub build_list: Vec<Value>,
    /// Scripted status sequence per build id; the cursor advances one step
    /// per GET and sticks at the last entry.
    pub status_plan: HashMap<u64, (Vec<String>, usize)>,
    pub blobs: HashMap<String, Vec<u8>>,
    pub requests: Vec<RecordedRequest>,
    pub next_id: u64,
}

pub struct MockRegistry {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockRegistry {
    /// Bind to an ephemeral port and serve on a background thread.
    pub fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(RegistryState {
            next_id: 1000,
            ..RegistryState::default()
        }));

        let thread_state = state.clone();
        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind mock registry");
                let addr = listener.local_addr().expect("local addr");
                thread_state.lock().unwrap().base_url = format!("http://{}", addr);
                addr_tx.send(addr).expect("report addr");

                let app = router(thread_state);
                axum::serve(listener, app).await.expect("serve mock registry");
            });
        });

        let addr = addr_rx.recv().expect("mock registry failed to start");
        Self { addr, state }
    }

    /// Host string for an AuthContext pointing at this mock.
    pub fn host(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.requests().iter().filter(|r| r.is_mutation()).count()
    }

    pub fn add_model_version(&self, id: u64, value: Value) {
        self.state.lock().unwrap().model_versions.insert(id, value);
    }

    pub fn add_registered_model(&self, id: u64, value: Value) {
        self.state.lock().unwrap().registered_models.insert(id, value);
    }

    /// Register a build both in the per-id map and the list endpoint.
    pub fn add_build(&self, value: Value) {
        let id = value["id"].as_u64().expect("build id");
        let mut state = self.state.lock().unwrap();
        state.builds.insert(id, value.clone());
        state.build_list.push(value);
    }

    pub fn add_blob(&self, key: &str, bytes: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .blobs
            .insert(key.to_string(), bytes.to_vec());
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().blobs.get(key).cloned()
    }

    /// Script the statuses successive GETs of a build will observe.
    pub fn plan_statuses(&self, build_id: u64, statuses: &[&str]) {
        self.state.lock().unwrap().status_plan.insert(
            build_id,
            (statuses.iter().map(|s| s.to_string()).collect(), 0),
        );
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route(
            "/api/v1/registry/model_versions/:id",
            get(get_model_version),
        )
        .route(
            "/api/v1/registry/registered_models/:id",
            get(get_registered_model),
        )
        .route(
            "/api/v1/registry/model_versions/:id/getUrlForArtifact",
            post(get_url_for_artifact),
        )
        .route(
            "/api/v1/registry/model_versions/:id/commitArtifactPart",
            post(commit_artifact_part),
        )
        .route(
            "/api/v1/registry/workspaces/:ws/registered_models",
            post(create_registered_model),
        )
        .route(
            "/api/v1/registry/registered_models/:id/model_versions",
            post(create_model_version),
        )
        .route(
            "/api/v1/registry/registered_models/:rm/model_versions/:mv",
            patch(patch_model_version),
        )
        .route("/api/v1/deployment/builds/", get(list_builds))
        .route("/api/v1/deployment/builds/:id", get(get_build))
        .route("/api/v1/deployment/workspace/:ws/builds", post(create_build))
        .route("/api/v1/deployment/builds/:id/scan", put(put_scan))
        .route("/api/v1/deployment/builds/:id/message", put(put_message))
        .route("/blob/:key", get(get_blob).put(put_blob))
        .with_state(state)
}

fn record(state: &Shared, method: &str, path: String, body: Option<Value>) {
    state.lock().unwrap().requests.push(RecordedRequest {
        method: method.to_string(),
        path,
        body,
    });
}

fn parse_body(bytes: &Bytes) -> Option<Value> {
    serde_json::from_slice(bytes).ok()
}

async fn get_model_version(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    record(
        &state,
        "GET",
        format!("/api/v1/registry/model_versions/{}", id),
        None,
    );
    let found = state.lock().unwrap().model_versions.get(&id).cloned();
    match found {
        Some(mv) => Json(json!({ "model_version": mv })).into_response(),
        None => (StatusCode::NOT_FOUND, "model version not found").into_response(),
    }
}

async fn get_registered_model(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    record(
        &state,
        "GET",
        format!("/api/v1/registry/registered_models/{}", id),
        None,
    );
    let found = state.lock().unwrap().registered_models.get(&id).cloned();
    match found {
        Some(model) => Json(json!({ "registered_model": model })).into_response(),
        None => (StatusCode::NOT_FOUND, "registered model not found").into_response(),
    }
}

async fn get_url_for_artifact(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    bytes: Bytes,
) -> Response {
    let body = parse_body(&bytes);
    record(
        &state,
        "POST",
        format!("/api/v1/registry/model_versions/{}/getUrlForArtifact", id),
        body.clone(),
    );
    let key = body
        .as_ref()
        .and_then(|b| b["key"].as_str())
        .unwrap_or_default()
        .to_string();
    let base = state.lock().unwrap().base_url.clone();
    Json(json!({ "url": format!("{}/blob/{}", base, key) })).into_response()
}

async fn commit_artifact_part(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    bytes: Bytes,
) -> Response {
    record(
        &state,
        "POST",
        format!("/api/v1/registry/model_versions/{}/commitArtifactPart", id),
        parse_body(&bytes),
    );
    Json(json!({})).into_response()
}

async fn create_registered_model(
    State(state): State<Shared>,
    Path(ws): Path<String>,
    bytes: Bytes,
) -> Response {
    let body = parse_body(&bytes);
    record(
        &state,
        "POST",
        format!("/api/v1/registry/workspaces/{}/registered_models", ws),
        body.clone(),
    );
    let mut stored = body.unwrap_or_else(|| json!({}));
    let mut guard = state.lock().unwrap();
    let id = guard.next_id;
    guard.next_id += 1;
    stored["id"] = json!(id);
    guard.registered_models.insert(id, stored.clone());
    Json(json!({ "registered_model": stored })).into_response()
}

async fn create_model_version(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    bytes: Bytes,
) -> Response {
    let body = parse_body(&bytes);
    record(
        &state,
        "POST",
        format!("/api/v1/registry/registered_models/{}/model_versions", id),
        body.clone(),
    );
    let mut stored = body.unwrap_or_else(|| json!({}));
    let mut guard = state.lock().unwrap();
    let new_id = guard.next_id;
    guard.next_id += 1;
    stored["id"] = json!(new_id);
    stored["registered_model_id"] = json!(id);
    guard.model_versions.insert(new_id, stored.clone());
    Json(json!({ "model_version": stored })).into_response()
}

async fn patch_model_version(
    State(state): State<Shared>,
    Path((rm, mv)): Path<(u64, u64)>,
    bytes: Bytes,
) -> Response {
    record(
        &state,
        "PATCH",
        format!("/api/v1/registry/registered_models/{}/model_versions/{}", rm, mv),
        parse_body(&bytes),
    );
    Json(json!({})).into_response()
}

async fn list_builds(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", "/api/v1/deployment/builds/".to_string(), None);
    let builds: Vec<Value> = state
        .lock()
        .unwrap()
        .build_list
        .iter()
        .filter(|b| match params.get("model_version_id") {
            Some(id) => b["model_version_id"].as_u64().map(|v| v.to_string()).as_ref() == Some(id),
            None => true,
        })
        .cloned()
        .collect();
    Json(json!({ "builds": builds })).into_response()
}

async fn get_build(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    record(&state, "GET", format!("/api/v1/deployment/builds/{}", id), None);
    let mut guard = state.lock().unwrap();
    let mut found = match guard.builds.get(&id).cloned() {
        Some(build) => build,
        None => return (StatusCode::NOT_FOUND, "build not found").into_response(),
    };
    if let Some((statuses, cursor)) = guard.status_plan.get_mut(&id) {
        let index = (*cursor).min(statuses.len() - 1);
        found["status"] = json!(statuses[index]);
        *cursor += 1;
    }
    Json(found).into_response()
}

async fn create_build(
    State(state): State<Shared>,
    Path(ws): Path<String>,
    bytes: Bytes,
) -> Response {
    let body = parse_body(&bytes);
    record(
        &state,
        "POST",
        format!("/api/v1/deployment/workspace/{}/builds", ws),
        body.clone(),
    );
    let mut stored = body.unwrap_or_else(|| json!({}));
    let mut guard = state.lock().unwrap();
    let id = guard.next_id;
    guard.next_id += 1;
    stored["id"] = json!(id);
    if stored.get("status").is_none() {
        stored["status"] = json!("pending");
    }
    guard.builds.insert(id, stored.clone());
    Json(stored).into_response()
}

async fn put_scan(State(state): State<Shared>, Path(id): Path<u64>, bytes: Bytes) -> Response {
    record(
        &state,
        "PUT",
        format!("/api/v1/deployment/builds/{}/scan", id),
        parse_body(&bytes),
    );
    Json(json!({})).into_response()
}

async fn put_message(State(state): State<Shared>, Path(id): Path<u64>, bytes: Bytes) -> Response {
    record(
        &state,
        "PUT",
        format!("/api/v1/deployment/builds/{}/message", id),
        parse_body(&bytes),
    );
    // Real message endpoint answers 200 with no body.
    StatusCode::OK.into_response()
}

async fn get_blob(State(state): State<Shared>, Path(key): Path<String>) -> Response {
    record(&state, "GET", format!("/blob/{}", key), None);
    let found = state.lock().unwrap().blobs.get(&key).cloned();
    match found {
        Some(bytes) => bytes.into_response(),
        None => (StatusCode::NOT_FOUND, "no such blob").into_response(),
    }
}

async fn put_blob(State(state): State<Shared>, Path(key): Path<String>, bytes: Bytes) -> Response {
    record(&state, "PUT", format!("/blob/{}", key), None);
    state
        .lock()
        .unwrap()
        .blobs
        .insert(key.clone(), bytes.to_vec());
    (
        StatusCode::OK,
        [(header::ETAG, format!("\"etag-{}\"", key))],
    )
        .into_response()
}
