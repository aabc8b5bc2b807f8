pub mod comments;
pub mod health;
pub mod signals;

use axum::Router;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(comments::routes())
        .merge(signals::routes())
        .merge(health::routes())
        .with_state(state)
}
