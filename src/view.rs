use tokio::sync::watch;
use tokio::task::JoinHandle;

use kommentar_core::{ActivationError, CommentStore};
use kommentar_refresh::{CommentsForPost, RemovalNotifier, Rendered, SignalHub};

/// A comment view running on its own task.
///
/// Every render is published on `rendered`. Dropping the handle stops the
/// view, which releases its signal subscription.
pub struct ViewHandle {
    pub rendered: watch::Receiver<Rendered>,
    pub removals: RemovalNotifier,
    task: JoinHandle<()>,
}

impl ViewHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ViewHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Activate `view` against `hub` and drive it on a spawned task.
///
/// The task runs until the returned handle is dropped; aborting it drops the
/// view along with its subscription and any fetches in flight.
pub fn spawn_view<S>(
    mut view: CommentsForPost<S>,
    hub: &SignalHub,
) -> Result<ViewHandle, ActivationError>
where
    S: CommentStore + 'static,
{
    view.activate(hub)?;

    let (tx, rendered) = watch::channel(view.render());
    let removals = view.removal_notifier();

    let task = tokio::spawn(async move {
        loop {
            let next = view.step().await;
            tx.send_if_modified(|current| {
                if *current == next {
                    return false;
                }
                *current = next;
                true
            });
        }
    });

    Ok(ViewHandle {
        rendered,
        removals,
        task,
    })
}
