use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kommentar::{create_router, spawn_view, AppState, Config};
use kommentar_refresh::{CommentsForPost, HttpCommentStore, SignalHub};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Required: KOMMENTAR_POST_HASH=<action hash>");
            eprintln!("Optional: KOMMENTAR_STORE_URL, KOMMENTAR_ROLE_NAME, KOMMENTAR_LISTEN_ADDR, KOMMENTAR_SIGNAL_CAPACITY");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting Kommentar");
    tracing::info!("Post: {}", config.post_hash);
    tracing::info!("Store: {} (role {})", config.store_url, config.role_name);
    tracing::info!("Listen address: {}", config.listen_addr);

    let store = Arc::new(HttpCommentStore::new(&config.store_url).with_role_name(&config.role_name));
    let hub = SignalHub::new(config.signal_capacity);

    // Start the comment view
    let view = CommentsForPost::new(store).with_post_hash(config.post_hash.clone());
    let handle = match spawn_view(view, &hub) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("View activation error: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(
        config.post_hash,
        hub,
        handle.removals.clone(),
        handle.rendered.clone(),
    );
    let app = create_router(state);

    // Start server
    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }

    drop(handle);
}
