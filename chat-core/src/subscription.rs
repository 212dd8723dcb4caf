//! Push subscription state machine for Parley.
//!
//! This module provides a pure, side-effect-free state machine for the single
//! "new message" handler bound to the live push channel. It takes events
//! (channel replaced, conversation changed, teardown) and produces a new state
//! plus the attach/detach actions to execute.
//!
//! The actual `on`/`off` calls are performed by chat-client, not by this
//! module. Actions always come out detach-first, so executing them in order
//! never leaves two handlers attached.

use parley_chat_types::PeerId;

/// Identity of one push channel instance.
///
/// A reconnect produces a new channel and therefore a new id, even if it talks
/// to the same server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Create a channel id from a raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel#{}", self.0)
    }
}

/// Subscription state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// No channel available; remembers the conversation for the next bind.
    Unbound {
        /// Active conversation, if any.
        conversation: Option<PeerId>,
    },
    /// A handler is attached to `channel`, bound for `conversation`.
    Bound {
        /// Channel the handler is attached to.
        channel: ChannelId,
        /// Conversation captured when the handler was attached.
        conversation: Option<PeerId>,
    },
    /// Torn down permanently; ignores every further event.
    Closed,
}

/// Inputs to the subscription state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// The live channel was replaced (or lost, with `None`).
    ChannelChanged(Option<ChannelId>),
    /// The active conversation changed (or was cleared, with `None`).
    ConversationChanged(Option<PeerId>),
    /// Permanent shutdown.
    Teardown,
}

/// Channel operations to execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionAction {
    /// Remove the handler from `channel` (`off`).
    Detach {
        /// Channel to detach from.
        channel: ChannelId,
    },
    /// Attach a handler to `channel` (`on`) that reconciles against `conversation`.
    Attach {
        /// Channel to attach to.
        channel: ChannelId,
        /// Conversation the new handler is bound for.
        conversation: Option<PeerId>,
    },
}

impl Subscription {
    /// Create a new state machine: unbound, no conversation.
    pub fn new() -> Self {
        Self::Unbound { conversation: None }
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// Events that do not change the (channel, conversation) pair produce no
    /// actions.
    pub fn on_event(self, event: SubscriptionEvent) -> (Self, Vec<SubscriptionAction>) {
        match (self, event) {
            (Self::Closed, _) => (Self::Closed, vec![]),

            // From Unbound
            (Self::Unbound { conversation }, SubscriptionEvent::ChannelChanged(Some(channel))) => (
                Self::Bound {
                    channel,
                    conversation: conversation.clone(),
                },
                vec![SubscriptionAction::Attach {
                    channel,
                    conversation,
                }],
            ),
            (state @ Self::Unbound { .. }, SubscriptionEvent::ChannelChanged(None)) => {
                (state, vec![])
            }
            (Self::Unbound { .. }, SubscriptionEvent::ConversationChanged(conversation)) => {
                (Self::Unbound { conversation }, vec![])
            }
            (Self::Unbound { .. }, SubscriptionEvent::Teardown) => (Self::Closed, vec![]),

            // From Bound
            (
                Self::Bound {
                    channel,
                    conversation,
                },
                SubscriptionEvent::ChannelChanged(next),
            ) => {
                if next == Some(channel) {
                    return (
                        Self::Bound {
                            channel,
                            conversation,
                        },
                        vec![],
                    );
                }
                let detach = SubscriptionAction::Detach { channel };
                match next {
                    Some(next) => (
                        Self::Bound {
                            channel: next,
                            conversation: conversation.clone(),
                        },
                        vec![
                            detach,
                            SubscriptionAction::Attach {
                                channel: next,
                                conversation,
                            },
                        ],
                    ),
                    None => (Self::Unbound { conversation }, vec![detach]),
                }
            }
            (
                Self::Bound {
                    channel,
                    conversation,
                },
                SubscriptionEvent::ConversationChanged(next),
            ) => {
                if next == conversation {
                    return (
                        Self::Bound {
                            channel,
                            conversation,
                        },
                        vec![],
                    );
                }
                (
                    Self::Bound {
                        channel,
                        conversation: next.clone(),
                    },
                    vec![
                        SubscriptionAction::Detach { channel },
                        SubscriptionAction::Attach {
                            channel,
                            conversation: next,
                        },
                    ],
                )
            }
            (Self::Bound { channel, .. }, SubscriptionEvent::Teardown) => {
                (Self::Closed, vec![SubscriptionAction::Detach { channel }])
            }
        }
    }

    /// Check if a handler is currently attached.
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound { .. })
    }

    /// Check if the subscription was torn down.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Channel the handler is attached to, if any.
    pub fn bound_channel(&self) -> Option<ChannelId> {
        match self {
            Self::Bound { channel, .. } => Some(*channel),
            _ => None,
        }
    }

    /// Conversation the attached handler reconciles against.
    pub fn bound_conversation(&self) -> Option<&PeerId> {
        match self {
            Self::Bound { conversation, .. } => conversation.as_ref(),
            _ => None,
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}
