use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use kommentar_core::{Signal, SignalPayload};

use crate::hub::{SignalHub, Subscription};
use crate::protocol::POSTS_ZOME;

/// Turns store signals into refresh requests for a comment view.
pub struct NotificationListener;

impl NotificationListener {
    /// True for "a comment entry was created in the posts zome".
    pub fn matches(signal: &Signal) -> bool {
        signal.zome_name == POSTS_ZOME
            && matches!(
                &signal.payload,
                SignalPayload::EntryCreated { app_entry, .. } if app_entry.kind() == "Comment"
            )
    }

    /// Subscribe to `hub` and send `()` on `refresh` for every matching signal.
    ///
    /// The subscription lives until the returned handle is dropped or the
    /// refresh receiver goes away.
    pub fn subscribe(hub: &SignalHub, refresh: mpsc::UnboundedSender<()>) -> Subscription {
        let mut signals = hub.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(signal) => {
                        if !Self::matches(&signal) {
                            tracing::trace!(
                                zome = %signal.zome_name,
                                variant = signal.payload.variant(),
                                "Ignoring signal"
                            );
                            continue;
                        }
                        if refresh.send(()).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        // Missed signals may have announced comments.
                        tracing::warn!(missed, "Signal subscriber lagged, refreshing");
                        if refresh.send(()).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("Signal subscription ended");
        });

        Subscription::new(handle)
    }
}
