//! Local HTTP stand-in for the AniList GraphQL endpoint and the Jikan API
//!
//! Canned behavior:
//! - AniList id 1 → idMal 100, id 2 → idMal null, id 404/429 → GraphQL error
//!   with that status, id 500 → plain-text 500, id 7 → `{"data":null}`
//! - Jikan search "Mushishi" → [457, 24687], "broken" → body without `data`,
//!   anything else → no matches
//! - Jikan episodes 457 → two pages (2 + 1 episodes), 888 → endless pages,
//!   429 → rate limited, anything else → 404

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockState {
    graphql_requests: Arc<AtomicUsize>,
    episode_requests: Arc<AtomicUsize>,
}

/// Running mock server; stops when the test runtime shuts down
pub struct MockCatalogServer {
    pub base_url: String,
    state: MockState,
}

impl MockCatalogServer {
    pub fn anilist_url(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    pub fn jikan_url(&self) -> String {
        format!("{}/v4", self.base_url)
    }

    pub fn graphql_requests(&self) -> usize {
        self.state.graphql_requests.load(Ordering::SeqCst)
    }

    pub fn episode_requests(&self) -> usize {
        self.state.episode_requests.load(Ordering::SeqCst)
    }
}

/// Bind on an ephemeral localhost port and serve in the background
pub async fn spawn_mock_catalog() -> MockCatalogServer {
    let state = MockState::default();
    let app = Router::new()
        .route("/graphql", post(graphql))
        .route("/v4/anime", get(search))
        .route("/v4/anime/:id/episodes", get(episodes))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockCatalogServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

fn graphql_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "errors": [{ "message": message, "status": status.as_u16() }],
            "data": { "Media": null }
        })),
    )
        .into_response()
}

async fn graphql(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.graphql_requests.fetch_add(1, Ordering::SeqCst);

    let query = body["query"].as_str().unwrap_or_default();
    if !query.contains("idMal") {
        return graphql_error(StatusCode::BAD_REQUEST, "Unexpected query");
    }

    match body["variables"]["id"].as_i64() {
        Some(1) => Json(json!({ "data": { "Media": { "idMal": 100 } } })).into_response(),
        Some(2) => Json(json!({ "data": { "Media": { "idMal": null } } })).into_response(),
        Some(7) => Json(json!({ "data": null })).into_response(),
        Some(404) => graphql_error(StatusCode::NOT_FOUND, "Not Found."),
        Some(429) => graphql_error(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests."),
        Some(500) => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        _ => graphql_error(StatusCode::NOT_FOUND, "Not Found."),
    }
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("q").map(String::as_str) {
        Some("Mushishi") => Json(json!({
            "pagination": { "has_next_page": false },
            "data": [
                { "mal_id": 457, "title": "Mushishi" },
                { "mal_id": 24687, "title": "Mushishi Zoku Shou" }
            ]
        }))
        .into_response(),
        Some("broken") => Json(json!({ "status": "ok" })).into_response(),
        _ => Json(json!({ "pagination": { "has_next_page": false }, "data": [] })).into_response(),
    }
}

async fn episodes(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.episode_requests.fetch_add(1, Ordering::SeqCst);
    let page: u32 = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    match (id, page) {
        (457, 1) => Json(json!({
            "pagination": { "last_visible_page": 2, "has_next_page": true },
            "data": [
                { "mal_id": 1, "title": "The Green Seat" },
                { "mal_id": 2, "title": null }
            ]
        }))
        .into_response(),
        (457, _) => Json(json!({
            "pagination": { "last_visible_page": 2, "has_next_page": false },
            "data": [{ "mal_id": 3, "title": "Tender Horns" }]
        }))
        .into_response(),
        (888, page) => Json(json!({
            "pagination": { "has_next_page": true },
            "data": [{ "mal_id": page, "title": format!("Episode {}", page) }]
        }))
        .into_response(),
        (429, _) => (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": 404, "message": "Resource does not exist" })),
        )
            .into_response(),
    }
}
