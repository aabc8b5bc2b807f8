use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use kommentar_core::{ActionHash, ActivationError, CommentStore, FetchError, FetchState, Link};

/// Identifies one run of the fetch task. Tokens grow monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunToken(pub u64);

impl std::fmt::Display for RunToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Result of one store call, tagged with the run that issued it.
#[derive(Debug)]
pub struct Completion {
    pub run: RunToken,
    pub result: Result<Vec<Link>, FetchError>,
}

/// Single-flight fetch of the comments of one post.
///
/// Every `run` issues exactly one store call on a spawned task and reports
/// back through the completion channel. Only the completion of the most
/// recent run is applied; older ones are counted and dropped. Superseded
/// calls keep running until they finish or the task is cancelled.
pub struct FetchTask<S: CommentStore> {
    store: Arc<S>,
    post_hash: Option<ActionHash>,
    state: FetchState,
    latest: RunToken,
    applied: bool,
    runs: u64,
    stale_discarded: u64,
    completions: mpsc::UnboundedSender<Completion>,
    in_flight: Vec<JoinHandle<()>>,
}

impl<S: CommentStore + 'static> FetchTask<S> {
    pub fn new(store: Arc<S>, completions: mpsc::UnboundedSender<Completion>) -> Self {
        Self {
            store,
            post_hash: None,
            state: FetchState::Pending,
            latest: RunToken::default(),
            applied: false,
            runs: 0,
            stale_discarded: 0,
            completions,
            in_flight: Vec::new(),
        }
    }

    pub fn post_hash(&self) -> Option<&ActionHash> {
        self.post_hash.as_ref()
    }

    /// Set the input hash. Returns true if it differs by value from the current one.
    pub fn set_post_hash(&mut self, post_hash: ActionHash) -> bool {
        if self.post_hash.as_ref() == Some(&post_hash) {
            return false;
        }
        self.post_hash = Some(post_hash);
        true
    }

    /// Start a new run, superseding any run still in flight.
    pub fn run(&mut self) -> Result<RunToken, ActivationError> {
        let post_hash = self
            .post_hash
            .clone()
            .ok_or(ActivationError::MissingPostHash)?;

        self.reset();
        self.runs += 1;

        let run = self.latest;
        let store = self.store.clone();
        let completions = self.completions.clone();

        tracing::debug!(%run, %post_hash, "Fetching comments");

        self.in_flight.retain(|handle| !handle.is_finished());
        self.in_flight.push(tokio::spawn(async move {
            let result = store.get_comments_for_post(&post_hash).await;
            if completions.send(Completion { run, result }).is_err() {
                tracing::debug!(%run, "View gone before fetch completed");
            }
        }));

        Ok(run)
    }

    /// Forget the current state without starting a run. Completions of
    /// earlier runs are discarded from now on.
    pub fn reset(&mut self) {
        self.latest = RunToken(self.latest.0 + 1);
        self.state = FetchState::Pending;
        self.applied = false;
    }

    /// Apply a completion. Returns false if it belongs to a superseded run.
    pub fn complete(&mut self, completion: Completion) -> bool {
        if completion.run != self.latest || self.applied {
            self.stale_discarded += 1;
            tracing::debug!(
                run = %completion.run,
                latest = %self.latest,
                "Discarding stale fetch result"
            );
            return false;
        }

        if let Err(e) = &completion.result {
            tracing::warn!(run = %completion.run, "Failed to fetch comments: {}", e);
        }

        self.state = completion.result.into();
        self.applied = true;
        true
    }

    /// Abort every store call still in flight. Their results will never be applied.
    pub fn cancel(&mut self) {
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn latest(&self) -> RunToken {
        self.latest
    }

    /// Number of runs started so far.
    pub fn runs_started(&self) -> u64 {
        self.runs
    }

    /// Number of spawned store calls that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    /// Number of completions dropped because a newer run had started.
    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }
}

impl<S: CommentStore> Drop for FetchTask<S> {
    fn drop(&mut self) {
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
    }
}
