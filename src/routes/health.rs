use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    post_hash: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Ready while the comment view task is running.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (code, status) = if state.removals.is_closed() {
        (StatusCode::SERVICE_UNAVAILABLE, "view stopped")
    } else {
        (StatusCode::OK, "ok")
    };
    (
        code,
        Json(ReadyResponse {
            status,
            post_hash: state.post_hash.to_string(),
        }),
    )
}
