use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;

use kommentar_core::Signal;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/signals", post(publish_signal))
}

#[derive(Serialize)]
struct PublishResponse {
    delivered_to: usize,
}

/// Push endpoint for store signals.
async fn publish_signal(
    State(state): State<AppState>,
    Json(signal): Json<Signal>,
) -> (StatusCode, Json<PublishResponse>) {
    tracing::debug!(
        zome = %signal.zome_name,
        variant = signal.payload.variant(),
        "Received signal"
    );
    let delivered_to = state.hub.publish(signal);
    (StatusCode::ACCEPTED, Json(PublishResponse { delivered_to }))
}
