//! # chat-core
//!
//! Pure logic for Parley (no I/O, instant tests).
//!
//! This crate implements the reconciliation rules and the push subscription
//! state machine without any network access, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`ChatState`] decides where an incoming message lands and reports the
//!   follow-up (an acknowledgment) as a value instead of performing it.
//! - [`Subscription`] turns channel/conversation changes into attach and
//!   detach actions.
//!
//! The actual I/O is performed by `chat-client`, which interprets these
//! outcomes and actions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod history;
pub mod list;
pub mod state;
pub mod subscription;
pub mod unseen;

pub use history::{normalize_history, NormalizedHistory, FALLBACK_FIELD, PRIMARY_FIELD};
pub use list::MessageList;
pub use state::{ChatState, HistoryOutcome, Reconciled};
pub use subscription::{ChannelId, Subscription, SubscriptionAction, SubscriptionEvent};
pub use unseen::UnseenCounter;
