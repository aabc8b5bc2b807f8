use tokio::sync::watch;

use kommentar_core::ActionHash;
use kommentar_refresh::{RemovalNotifier, Rendered, SignalHub};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub post_hash: ActionHash,
    pub hub: SignalHub,
    pub removals: RemovalNotifier,
    pub rendered: watch::Receiver<Rendered>,
}

impl AppState {
    pub fn new(
        post_hash: ActionHash,
        hub: SignalHub,
        removals: RemovalNotifier,
        rendered: watch::Receiver<Rendered>,
    ) -> Self {
        Self {
            post_hash,
            hub,
            removals,
            rendered,
        }
    }
}
