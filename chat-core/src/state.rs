//! Conversation state and the reconciliation rules.
//!
//! [`ChatState`] owns everything the presentation layer renders: the peer
//! directory, the active conversation, its message list and the unseen
//! counters. Every mutation is a plain method call that returns what
//! happened; any resulting I/O (acknowledging a read) is left to the caller.

use parley_chat_types::{Message, MessageId, Peer, PeerId};
use std::collections::HashMap;

use crate::{MessageList, NormalizedHistory, UnseenCounter};

/// Where an incoming message ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// Appended to the active conversation; the caller must acknowledge it.
    Appended {
        /// Message to mark as read on the server.
        ack: MessageId,
    },
    /// Counted as unseen for its sender.
    CountedUnseen {
        /// Sender whose counter moved.
        peer: PeerId,
        /// Counter value after the increment.
        count: u32,
    },
}

/// Result of applying a fetched history batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// The list was replaced with this many messages.
    Applied(usize),
    /// The batch was for a peer that is no longer active and was dropped.
    Stale {
        /// Peer the batch was fetched for.
        requested: PeerId,
        /// Peer active when it arrived.
        active: Option<PeerId>,
    },
}

/// Local view of the user's conversations.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    peers: Vec<Peer>,
    active: Option<PeerId>,
    messages: MessageList,
    unseen: UnseenCounter,
    reset_unseen_on_select: bool,
}

impl ChatState {
    /// Create an empty state: no peers, no active conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero a peer's unseen count whenever it becomes active.
    pub fn with_reset_unseen_on_select(mut self, enabled: bool) -> Self {
        self.reset_unseen_on_select = enabled;
        self
    }

    // ===========================================
    // Directory
    // ===========================================

    /// Replace the peer list and the unseen counters with a roster snapshot.
    pub fn apply_roster(&mut self, peers: Vec<Peer>, unseen: HashMap<PeerId, u32>) {
        self.peers = peers;
        self.unseen.replace(unseen);
        if self.reset_unseen_on_select {
            if let Some(active) = &self.active {
                self.unseen.reset(active);
            }
        }
    }

    /// All known peers in server order.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Look up a peer by id.
    pub fn peer(&self, id: &PeerId) -> Option<&Peer> {
        self.peers.iter().find(|p| &p.id == id)
    }

    /// The unseen counters.
    pub fn unseen(&self) -> &UnseenCounter {
        &self.unseen
    }

    /// Zero the unseen count for `peer`.
    pub fn clear_unseen(&mut self, peer: &PeerId) {
        self.unseen.reset(peer);
    }

    // ===========================================
    // Conversation Selector
    // ===========================================

    /// Currently active peer.
    pub fn active(&self) -> Option<&PeerId> {
        self.active.as_ref()
    }

    /// Change the active conversation. Returns `true` if it changed.
    ///
    /// A change drops the materialized list; the next history load fills it.
    pub fn select(&mut self, peer: Option<PeerId>) -> bool {
        if self.active == peer {
            return false;
        }
        self.active = peer;
        self.messages.unload();
        if self.reset_unseen_on_select {
            if let Some(active) = &self.active {
                self.unseen.reset(active);
            }
        }
        true
    }

    /// Messages of the active conversation.
    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    // ===========================================
    // Reconciliation
    // ===========================================

    /// Route one incoming message.
    ///
    /// `bound` is the conversation the push handler was bound for. A message
    /// from that peer is marked seen and appended, provided it is still the
    /// active conversation; anything else bumps the sender's unseen count.
    /// Exactly one of the two happens.
    pub fn reconcile(&mut self, bound: Option<&PeerId>, mut message: Message) -> Reconciled {
        match bound {
            Some(peer) if *peer == message.sender_id && self.active.as_ref() == Some(peer) => {
                message.seen = true;
                let ack = message.id.clone();
                self.messages.append(message);
                Reconciled::Appended { ack }
            }
            _ => {
                let count = self.unseen.increment(&message.sender_id);
                Reconciled::CountedUnseen {
                    peer: message.sender_id,
                    count,
                }
            }
        }
    }

    /// Replace the list with a history batch fetched for `requested`.
    ///
    /// Batches for a peer that is no longer active are dropped.
    pub fn apply_history(
        &mut self,
        requested: &PeerId,
        history: NormalizedHistory,
    ) -> HistoryOutcome {
        if self.active.as_ref() != Some(requested) {
            return HistoryOutcome::Stale {
                requested: requested.clone(),
                active: self.active.clone(),
            };
        }
        let count = history.messages.len();
        self.messages.replace(history.messages);
        HistoryOutcome::Applied(count)
    }

    /// Append the server's echo of a message we sent to `recipient`.
    ///
    /// Returns `false` (and leaves the list alone) if the user switched away
    /// from `recipient` while the send was in flight.
    pub fn apply_sent(&mut self, recipient: &PeerId, message: Message) -> bool {
        if self.active.as_ref() != Some(recipient) {
            return false;
        }
        self.messages.append(message);
        true
    }
}
