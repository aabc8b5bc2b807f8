use std::sync::Arc;

use tokio::sync::mpsc;

use kommentar_core::link::targets;
use kommentar_core::{AccumulatedSet, ActionHash, ActivationError, CommentStore, FetchState};

use crate::hub::{SignalHub, Subscription};
use crate::listener::NotificationListener;
use crate::render::Rendered;
use crate::task::{Completion, FetchTask, RunToken};

/// Something the view has to react to.
#[derive(Debug)]
pub enum Input {
    /// A fetch run finished.
    Completed(Completion),
    /// The store announced a new comment.
    CommentCreated,
    /// A detail view reported that its comment was deleted.
    CommentRemoved(ActionHash),
}

/// Handed to detail views so they can report a deleted comment.
#[derive(Clone)]
pub struct RemovalNotifier {
    tx: mpsc::UnboundedSender<ActionHash>,
}

impl RemovalNotifier {
    /// Returns false if the view no longer exists.
    pub fn comment_deleted(&self, comment_hash: ActionHash) -> bool {
        self.tx.send(comment_hash).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Reactive list of the comments of one post.
///
/// Inputs (fetch completions, refresh signals, removals) are processed one at
/// a time by [`step`](Self::step), so the accumulated hashes and the fetch
/// state are only mutated from a single place.
pub struct CommentsForPost<S: CommentStore> {
    task: FetchTask<S>,
    hashes: AccumulatedSet,
    completions: mpsc::UnboundedReceiver<Completion>,
    refresh_tx: mpsc::UnboundedSender<()>,
    refresh: mpsc::UnboundedReceiver<()>,
    removals_tx: mpsc::UnboundedSender<ActionHash>,
    removals: mpsc::UnboundedReceiver<ActionHash>,
    subscription: Option<Subscription>,
}

impl<S: CommentStore + 'static> CommentsForPost<S> {
    pub fn new(store: Arc<S>) -> Self {
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (refresh_tx, refresh) = mpsc::unbounded_channel();
        let (removals_tx, removals) = mpsc::unbounded_channel();

        Self {
            task: FetchTask::new(store, completions_tx),
            hashes: AccumulatedSet::new(),
            completions,
            refresh_tx,
            refresh,
            removals_tx,
            removals,
            subscription: None,
        }
    }

    pub fn with_post_hash(mut self, post_hash: ActionHash) -> Self {
        self.set_post_hash(post_hash);
        self
    }

    /// Point the view at a post. A hash equal by value to the current one is
    /// ignored. A different one drops the accumulated comments and the last
    /// fetch result, then starts a fetch if the view is active.
    pub fn set_post_hash(&mut self, post_hash: ActionHash) -> Option<RunToken> {
        if !self.task.set_post_hash(post_hash) {
            return None;
        }
        self.hashes.clear();
        if self.is_active() {
            self.task.run().ok()
        } else {
            self.task.reset();
            None
        }
    }

    /// Subscribe to `hub` and start the first fetch.
    ///
    /// Fails before touching the store or the hub if no post hash is set.
    pub fn activate(&mut self, hub: &SignalHub) -> Result<RunToken, ActivationError> {
        if self.is_active() {
            return Err(ActivationError::AlreadyActive);
        }
        let Some(post_hash) = self.task.post_hash() else {
            return Err(ActivationError::MissingPostHash);
        };
        tracing::info!(%post_hash, "Activating comments view");

        self.subscription = Some(NotificationListener::subscribe(
            hub,
            self.refresh_tx.clone(),
        ));
        self.task.run()
    }

    /// Release the signal subscription and abort the fetch in flight.
    pub fn deactivate(&mut self) {
        if self.subscription.take().is_some() {
            tracing::info!("Deactivating comments view");
        }
        self.task.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn removal_notifier(&self) -> RemovalNotifier {
        RemovalNotifier {
            tx: self.removals_tx.clone(),
        }
    }

    /// Force a new fetch.
    pub fn refresh(&mut self) -> Result<RunToken, ActivationError> {
        self.task.run()
    }

    /// Forget every accumulated comment and fetch the full list again.
    pub fn on_comment_removed(&mut self) -> Result<RunToken, ActivationError> {
        self.hashes.clear();
        self.task.run()
    }

    /// Wait for the next input. Completions are taken first.
    ///
    /// The view holds a sender for each of its input channels, so this never
    /// runs dry. Drop the view to stop it.
    pub async fn next_input(&mut self) -> Input {
        tokio::select! {
            biased;
            Some(completion) = self.completions.recv() => Input::Completed(completion),
            Some(()) = self.refresh.recv() => Input::CommentCreated,
            Some(hash) = self.removals.recv() => Input::CommentRemoved(hash),
        }
    }

    /// Apply one input to the view state.
    pub fn handle(&mut self, input: Input) {
        match input {
            Input::Completed(completion) => {
                if !self.task.complete(completion) {
                    return;
                }
                if let FetchState::Complete(links) = self.task.state() {
                    let added = self.hashes.absorb(targets(links));
                    tracing::debug!(added, total = self.hashes.len(), "Merged fetched comments");
                }
            }
            Input::CommentCreated => {
                if let Err(e) = self.refresh() {
                    tracing::warn!("Cannot refresh comments: {}", e);
                }
            }
            Input::CommentRemoved(hash) => {
                tracing::debug!(comment = %hash, "Comment removed, reloading");
                if let Err(e) = self.on_comment_removed() {
                    tracing::warn!("Cannot reload comments: {}", e);
                }
            }
        }
    }

    /// Wait for and apply the next input, then render.
    pub async fn step(&mut self) -> Rendered {
        let input = self.next_input().await;
        self.handle(input);
        self.render()
    }

    pub fn render(&self) -> Rendered {
        match self.task.state() {
            FetchState::Pending => Rendered::Loading,
            FetchState::Failed(e) => Rendered::Error(e.to_string()),
            FetchState::Complete(links) => {
                let merged = self.hashes.merged_with(targets(links));
                if merged.is_empty() {
                    Rendered::Empty
                } else {
                    Rendered::Comments(merged)
                }
            }
        }
    }

    pub fn accumulated(&self) -> &AccumulatedSet {
        &self.hashes
    }

    pub fn fetch_task(&self) -> &FetchTask<S> {
        &self.task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::oneshot;

    use kommentar_core::{
        AppEntry, FetchError, InMemoryCommentStore, Link, Signal, SignalPayload,
    };

    fn h(n: u8) -> ActionHash {
        ActionHash::fake(n)
    }

    fn comment_created() -> Signal {
        Signal::new(
            "posts",
            SignalPayload::EntryCreated {
                action_hash: h(200),
                app_entry: AppEntry::Comment {
                    comment: "hello".to_string(),
                    post_hash: h(1),
                },
            },
        )
    }

    fn noise(i: usize) -> Signal {
        match i % 3 {
            0 => Signal::new("profiles", comment_created().payload),
            1 => Signal::new(
                "posts",
                SignalPayload::EntryCreated {
                    action_hash: h(201),
                    app_entry: AppEntry::Post {
                        title: "t".to_string(),
                        content: "c".to_string(),
                    },
                },
            ),
            _ => Signal::new(
                "posts",
                SignalPayload::LinkCreated {
                    link_type: "PostToComments".to_string(),
                },
            ),
        }
    }

    fn make_view() -> (
        CommentsForPost<InMemoryCommentStore>,
        Arc<InMemoryCommentStore>,
        SignalHub,
    ) {
        let store = Arc::new(InMemoryCommentStore::new());
        let view = CommentsForPost::new(store.clone()).with_post_hash(h(1));
        (view, store, SignalHub::default())
    }

    async fn assert_idle(view: &mut CommentsForPost<InMemoryCommentStore>) {
        let next = tokio::time::timeout(Duration::from_millis(50), view.next_input()).await;
        assert!(next.is_err(), "unexpected input: {:?}", next);
    }

    #[tokio::test]
    async fn test_activate_without_post_hash_fails_before_fetch() {
        let store = Arc::new(InMemoryCommentStore::new());
        let hub = SignalHub::default();
        let mut view = CommentsForPost::new(store.clone());

        assert_eq!(view.activate(&hub), Err(ActivationError::MissingPostHash));
        assert!(!view.is_active());
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_activate_twice_is_rejected() {
        let (mut view, _store, hub) = make_view();
        view.activate(&hub).unwrap();

        assert_eq!(view.activate(&hub), Err(ActivationError::AlreadyActive));
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_post_renders_empty() {
        let (mut view, _store, hub) = make_view();
        view.activate(&hub).unwrap();
        assert_eq!(view.render(), Rendered::Loading);

        assert_eq!(view.step().await, Rendered::Empty);
    }

    #[tokio::test]
    async fn test_fetch_error_is_rendered() {
        let (mut view, store, hub) = make_view();
        store.fail_with(FetchError::Network("connection refused".to_string()));
        view.activate(&hub).unwrap();

        let rendered = view.step().await;
        assert_eq!(
            rendered,
            Rendered::Error("Network error: connection refused".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_then_remove_scenario() {
        let (mut view, store, hub) = make_view();
        let post = h(1);
        let (a, b, c) = (h(10), h(11), h(12));

        store.set_comments(&post, &[a.clone(), b.clone()]);
        view.activate(&hub).unwrap();
        assert_eq!(
            view.step().await,
            Rendered::Comments(vec![a.clone(), b.clone()])
        );

        // A new comment is announced.
        store.set_comments(&post, &[a.clone(), b.clone(), c.clone()]);
        hub.publish(comment_created());
        assert_eq!(view.step().await, Rendered::Loading);
        assert_eq!(
            view.step().await,
            Rendered::Comments(vec![a.clone(), b.clone(), c.clone()])
        );

        // B is deleted from its detail view.
        store.remove_comment(&post, &b);
        assert!(view.removal_notifier().comment_deleted(b.clone()));
        assert_eq!(view.step().await, Rendered::Loading);
        assert!(view.accumulated().is_empty());
        assert_eq!(
            view.step().await,
            Rendered::Comments(vec![a.clone(), c.clone()])
        );

        assert_eq!(store.calls(), 3);
    }

    #[tokio::test]
    async fn test_noise_never_triggers_fetch() {
        let (mut view, store, hub) = make_view();
        view.activate(&hub).unwrap();
        view.step().await;

        for i in 0..100 {
            hub.publish(noise(i));
        }
        assert_idle(&mut view).await;
        assert_eq!(view.fetch_task().runs_started(), 1);

        hub.publish(comment_created());
        view.step().await;
        assert_eq!(view.fetch_task().runs_started(), 2);
        view.step().await;
        assert_idle(&mut view).await;

        assert_eq!(view.fetch_task().runs_started(), 2);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_repeated_refreshes_never_duplicate() {
        let (mut view, store, hub) = make_view();
        let post = h(1);
        view.activate(&hub).unwrap();
        view.step().await;

        for n in 10..30u8 {
            store.add_comment(&post, h(n));
            hub.publish(comment_created());
            hub.publish(comment_created());
            // Two refresh requests, two completions.
            for _ in 0..4 {
                view.step().await;
            }
        }

        let rendered = view.render();
        let hashes = rendered.comment_hashes();
        let expected: Vec<_> = (10..30u8).map(h).collect();
        assert_eq!(hashes, expected.as_slice());
    }

    #[tokio::test]
    async fn test_comment_not_yet_indexed_shows_up_later() {
        let (mut view, store, hub) = make_view();
        let post = h(1);
        store.set_comments(&post, &[h(10)]);
        view.activate(&hub).unwrap();
        view.step().await;

        // Signal arrives before the store has the new link.
        hub.publish(comment_created());
        view.step().await;
        assert_eq!(
            view.step().await,
            Rendered::Comments(vec![h(10)])
        );

        store.add_comment(&post, h(11));
        hub.publish(comment_created());
        view.step().await;
        assert_eq!(
            view.step().await,
            Rendered::Comments(vec![h(10), h(11)])
        );
    }

    #[tokio::test]
    async fn test_known_comment_survives_partial_result() {
        let (mut view, store, hub) = make_view();
        let post = h(1);
        store.set_comments(&post, &[h(10), h(11)]);
        view.activate(&hub).unwrap();
        view.step().await;

        // A lagging replica returns fewer links; nothing disappears.
        store.set_comments(&post, &[h(11)]);
        view.refresh().unwrap();
        assert_eq!(
            view.step().await,
            Rendered::Comments(vec![h(10), h(11)])
        );
    }

    #[tokio::test]
    async fn test_post_hash_change_reloads() {
        let (mut view, store, hub) = make_view();
        store.set_comments(&h(1), &[h(10)]);
        store.set_comments(&h(2), &[h(20)]);
        view.activate(&hub).unwrap();
        view.step().await;

        assert!(view.set_post_hash(ActionHash::from_raw_36([1; 36])).is_none());

        assert!(view.set_post_hash(h(2)).is_some());
        assert!(view.accumulated().is_empty());
        assert_eq!(view.step().await, Rendered::Comments(vec![h(20)]));
    }

    #[tokio::test]
    async fn test_post_hash_before_activation_does_not_fetch() {
        let store = Arc::new(InMemoryCommentStore::new());
        let mut view = CommentsForPost::new(store.clone());

        assert!(view.set_post_hash(h(1)).is_none());
        assert_eq!(store.calls(), 0);
        assert_eq!(view.fetch_task().runs_started(), 0);
    }

    #[tokio::test]
    async fn test_post_hash_change_while_inactive_drops_old_result() {
        let (mut view, store, hub) = make_view();
        store.set_comments(&h(1), &[h(10)]);
        store.set_comments(&h(2), &[h(20)]);
        view.activate(&hub).unwrap();
        assert_eq!(view.step().await, Rendered::Comments(vec![h(10)]));
        view.deactivate();

        assert!(view.set_post_hash(h(2)).is_none());
        assert_eq!(view.render(), Rendered::Loading);
        assert!(view.accumulated().is_empty());
        assert_eq!(store.calls(), 1);

        view.activate(&hub).unwrap();
        assert_eq!(view.step().await, Rendered::Comments(vec![h(20)]));
    }

    #[tokio::test]
    async fn test_deactivate_unsubscribes() {
        let (mut view, store, hub) = make_view();
        view.activate(&hub).unwrap();
        view.step().await;

        view.deactivate();
        for _ in 0..10 {
            if hub.subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(hub.subscriber_count(), 0);

        hub.publish(comment_created());
        assert_idle(&mut view).await;
        assert_eq!(store.calls(), 1);
    }

    /// Store whose responses are released by the test, in any order.
    struct GatedStore {
        scripted: Mutex<VecDeque<(oneshot::Receiver<()>, Vec<Link>)>>,
    }

    impl GatedStore {
        fn new() -> Self {
            Self {
                scripted: Mutex::new(VecDeque::new()),
            }
        }

        fn script(&self, links: Vec<Link>) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.scripted.lock().unwrap().push_back((rx, links));
            tx
        }

        fn remaining(&self) -> usize {
            self.scripted.lock().unwrap().len()
        }
    }

    impl CommentStore for GatedStore {
        async fn get_comments_for_post(
            &self,
            _post_hash: &ActionHash,
        ) -> Result<Vec<Link>, FetchError> {
            let next = self.scripted.lock().unwrap().pop_front();
            let Some((gate, links)) = next else {
                return Err(FetchError::Network("no scripted response".to_string()));
            };
            let _ = gate.await;
            Ok(links)
        }
    }

    async fn wait_for_calls(store: &GatedStore, remaining: usize) {
        for _ in 0..100 {
            if store.remaining() == remaining {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("store still has {} scripted responses", store.remaining());
    }

    #[tokio::test]
    async fn test_slow_superseded_run_does_not_overwrite() {
        let store = Arc::new(GatedStore::new());
        let hub = SignalHub::default();
        let post = h(1);
        let first = store.script(vec![Link::new(post.clone(), h(10))]);
        let second = store.script(vec![Link::new(post.clone(), h(11))]);

        let mut view = CommentsForPost::new(store.clone()).with_post_hash(post);
        view.activate(&hub).unwrap();
        wait_for_calls(&store, 1).await;
        view.refresh().unwrap();
        wait_for_calls(&store, 0).await;

        // The newer run resolves first.
        second.send(()).unwrap();
        assert_eq!(view.step().await, Rendered::Comments(vec![h(11)]));

        // The older run resolves late and is dropped.
        first.send(()).unwrap();
        assert_eq!(view.step().await, Rendered::Comments(vec![h(11)]));
        assert_eq!(view.fetch_task().stale_discarded(), 1);
        assert_eq!(view.accumulated().as_slice(), &[h(11)]);
    }

    #[tokio::test]
    async fn test_removal_discards_inflight_result() {
        let store = Arc::new(GatedStore::new());
        let hub = SignalHub::default();
        let post = h(1);
        let before = store.script(vec![
            Link::new(post.clone(), h(10)),
            Link::new(post.clone(), h(11)),
        ]);
        let after = store.script(vec![Link::new(post.clone(), h(10))]);

        let mut view = CommentsForPost::new(store.clone()).with_post_hash(post);
        view.activate(&hub).unwrap();
        wait_for_calls(&store, 1).await;

        view.removal_notifier().comment_deleted(h(11));
        view.step().await;
        wait_for_calls(&store, 0).await;

        before.send(()).unwrap();
        after.send(()).unwrap();
        view.step().await;
        let rendered = view.step().await;

        assert_eq!(rendered, Rendered::Comments(vec![h(10)]));
    }
}
