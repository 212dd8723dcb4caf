//! # chat-types
//!
//! Wire format types for the Parley chat synchronization client.
//!
//! This crate provides the foundational types used across all Parley crates:
//! - [`PeerId`], [`MessageId`] - Server-assigned identifiers
//! - [`Message`], [`Payload`] - Chat message records and their content
//! - [`Peer`] - Directory entries for the other side of a conversation
//! - [`RosterResponse`], [`SendResponse`] - Server response envelopes
//! - [`ChatError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod messages;

pub use error::ChatError;
pub use ids::{MessageId, PeerId};
pub use messages::{Draft, Message, Payload, Peer, RosterResponse, SendResponse};
