use std::collections::HashSet;

use crate::hash::ActionHash;

/// Ordered set of comment hashes the view has already confirmed.
///
/// Insertion order is kept and each hash appears once. New fetch results are
/// merged by appending only the hashes not seen yet.
#[derive(Debug, Clone, Default)]
pub struct AccumulatedSet {
    order: Vec<ActionHash>,
    seen: HashSet<ActionHash>,
}

impl AccumulatedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, hash: &ActionHash) -> bool {
        self.seen.contains(hash)
    }

    pub fn as_slice(&self) -> &[ActionHash] {
        &self.order
    }

    /// Append the hashes not yet present, in the given order.
    /// Returns how many were added.
    pub fn absorb<'a>(&mut self, hashes: impl IntoIterator<Item = &'a ActionHash>) -> usize {
        let mut added = 0;
        for hash in hashes {
            if self.seen.insert(hash.clone()) {
                self.order.push(hash.clone());
                added += 1;
            }
        }
        added
    }

    /// The union of this set followed by `fetched`, without mutating.
    pub fn merged_with<'a>(
        &self,
        fetched: impl IntoIterator<Item = &'a ActionHash>,
    ) -> Vec<ActionHash> {
        let mut merged = self.clone();
        merged.absorb(fetched);
        merged.order
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.seen.clear();
    }
}
