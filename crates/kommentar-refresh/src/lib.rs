//! Kommentar Refresh - Fetch coordination for a live comment list.
//!
//! A [`CommentsForPost`] view fetches the comments of a post through a
//! [`CommentStore`](kommentar_core::CommentStore), refetches when the store
//! signals a new comment or a detail view reports a deletion, and merges the
//! results into an ordered, duplicate-free list.

pub mod client;
pub mod component;
pub mod hub;
pub mod listener;
pub mod protocol;
pub mod render;
pub mod task;

pub use client::HttpCommentStore;
pub use component::{CommentsForPost, Input, RemovalNotifier};
pub use hub::{SignalHub, Subscription, DEFAULT_SIGNAL_CAPACITY};
pub use listener::NotificationListener;
pub use protocol::ZomeCallRequest;
pub use render::Rendered;
pub use task::{Completion, FetchTask, RunToken};
