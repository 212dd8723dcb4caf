//! Per-peer unread counters.
//!
//! The counter is seeded once from the roster snapshot and then only moves
//! forward through [`UnseenCounter::increment`]. There is no decrement; a
//! peer's entry returns to zero only through [`UnseenCounter::reset`].

use parley_chat_types::PeerId;
use std::collections::{BTreeMap, HashMap};

/// Mapping of peer id to the number of messages not yet viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnseenCounter {
    counts: HashMap<PeerId, u32>,
}

impl UnseenCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter from a server snapshot.
    pub fn from_snapshot(snapshot: HashMap<PeerId, u32>) -> Self {
        Self { counts: snapshot }
    }

    /// Add one unseen message for `peer` and return the new count.
    ///
    /// Absent entries start at zero.
    pub fn increment(&mut self, peer: &PeerId) -> u32 {
        let count = self.counts.entry(peer.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Current count for `peer` (zero when absent).
    pub fn get(&self, peer: &PeerId) -> u32 {
        self.counts.get(peer).copied().unwrap_or(0)
    }

    /// Zero the entry for `peer`.
    pub fn reset(&mut self, peer: &PeerId) {
        self.counts.remove(peer);
    }

    /// Replace every entry with a new snapshot (not merged).
    pub fn replace(&mut self, snapshot: HashMap<PeerId, u32>) {
        self.counts = snapshot;
    }

    /// Owned, ordered copy for rendering. Zero entries are omitted.
    pub fn snapshot(&self) -> BTreeMap<PeerId, u32> {
        self.counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(peer, n)| (peer.clone(), *n))
            .collect()
    }

    /// Sum over all peers.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&n| u64::from(n)).sum()
    }

    /// True when no peer has unseen messages.
    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&n| n == 0)
    }
}
