use std::future::Future;

use crate::error::FetchError;
use crate::hash::ActionHash;
use crate::link::Link;

/// Remote store holding the links from posts to their comments.
pub trait CommentStore: Send + Sync {
    /// Fetch all links from `post_hash` to its comments, in store order.
    fn get_comments_for_post(
        &self,
        post_hash: &ActionHash,
    ) -> impl Future<Output = Result<Vec<Link>, FetchError>> + Send;
}

// In-memory implementation for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;

    /// In-memory comment store that counts calls and can be told to fail.
    #[derive(Default)]
    pub struct InMemoryCommentStore {
        links: RwLock<HashMap<ActionHash, Vec<Link>>>,
        failure: RwLock<Option<FetchError>>,
        calls: AtomicUsize,
    }

    impl InMemoryCommentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Replace the comments of a post.
        pub fn set_comments(&self, post: &ActionHash, comments: &[ActionHash]) {
            let links = comments
                .iter()
                .map(|c| Link::new(post.clone(), c.clone()))
                .collect();
            self.links.write().unwrap().insert(post.clone(), links);
        }

        pub fn add_comment(&self, post: &ActionHash, comment: ActionHash) {
            self.links
                .write()
                .unwrap()
                .entry(post.clone())
                .or_default()
                .push(Link::new(post.clone(), comment));
        }

        pub fn remove_comment(&self, post: &ActionHash, comment: &ActionHash) {
            if let Some(links) = self.links.write().unwrap().get_mut(post) {
                links.retain(|l| &l.target != comment);
            }
        }

        /// Make every following call fail with `error`.
        pub fn fail_with(&self, error: FetchError) {
            *self.failure.write().unwrap() = Some(error);
        }

        pub fn recover(&self) {
            *self.failure.write().unwrap() = None;
        }

        /// Number of fetches served so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CommentStore for InMemoryCommentStore {
        async fn get_comments_for_post(
            &self,
            post_hash: &ActionHash,
        ) -> Result<Vec<Link>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(e) = self.failure.read().unwrap().clone() {
                return Err(e);
            }

            Ok(self
                .links
                .read()
                .unwrap()
                .get(post_hash)
                .cloned()
                .unwrap_or_default())
        }
    }

}
