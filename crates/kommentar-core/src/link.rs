use serde::{Deserialize, Serialize};

use crate::hash::ActionHash;

/// A link record returned by the store, from a post to one of its comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The post the link hangs off.
    pub base: ActionHash,
    /// The linked comment.
    pub target: ActionHash,
    #[serde(default)]
    pub tag: Vec<u8>,
    /// Creation time in microseconds since epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl Link {
    pub fn new(base: ActionHash, target: ActionHash) -> Self {
        Self {
            base,
            target,
            tag: Vec::new(),
            timestamp: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Targets of a slice of links, in store order.
pub fn targets(links: &[Link]) -> impl Iterator<Item = &ActionHash> {
    links.iter().map(|l| &l.target)
}
