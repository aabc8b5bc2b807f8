//! Kommentar Core - Domain types and the store trait.
//!
//! Hashes, link records, store signals, fetch state and the ordered set of
//! confirmed comments. This crate does no I/O.

pub mod accumulated;
pub mod error;
pub mod hash;
pub mod link;
pub mod signal;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use accumulated::AccumulatedSet;
pub use error::{ActivationError, FetchError, HashError};
pub use hash::ActionHash;
pub use link::Link;
pub use signal::{AppEntry, Signal, SignalPayload};
pub use state::FetchState;
pub use store::CommentStore;

#[cfg(any(test, feature = "test-utils"))]
pub use store::memory::InMemoryCommentStore;
