use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};

use kommentar_core::ActionHash;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/comments", get(get_comments))
        .route("/comments/{hash}/deleted", post(comment_deleted))
}

async fn get_comments(State(state): State<AppState>) -> Html<String> {
    Html(state.rendered.borrow().to_html())
}

/// Called by a comment detail view after it deleted its comment.
async fn comment_deleted(State(state): State<AppState>, Path(hash): Path<String>) -> Response {
    let comment_hash = match hash.parse::<ActionHash>() {
        Ok(h) => h,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Invalid comment hash: {}", e))
                .into_response();
        }
    };

    if !state.removals.comment_deleted(comment_hash) {
        return (StatusCode::SERVICE_UNAVAILABLE, "Comment view is not running").into_response();
    }

    StatusCode::ACCEPTED.into_response()
}
