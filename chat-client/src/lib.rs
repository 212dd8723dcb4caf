//! # chat-client
//!
//! Client library for the Parley real-time chat engine.
//!
//! This is the main library that chat front ends use to keep their view of
//! the conversation in step with the server.
//!
//! ## Features
//!
//! - **Reconciliation**: pushed messages land in the open conversation or the
//!   unseen counters, never both
//! - **Single Subscription**: at most one push handler attached, rebound on
//!   every conversation or channel change
//! - **Transport Abstraction**: Pluggable transport layer (HTTP, mock)
//! - **Pure State Machine**: Uses chat-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use parley_chat_client::{ChatConfig, ChatSession, HttpTransport};
//!
//! let config = ChatConfig::from_file(Path::new("parley.toml"))?;
//! let transport = HttpTransport::new(config.server.clone())?;
//! let session = ChatSession::new(config, transport);
//!
//! session.load_roster().await?;
//! session.open_conversation(PeerId::from("alice")).await?;
//! session.send_message(Draft::text("hello")).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod report;
pub mod session;
pub mod transport;

pub use channel::{MockChannel, PushChannel, PushHandler};
pub use config::{ChatConfig, ConfigError, ConversationConfig, EndpointConfig, PushConfig};
pub use report::{CollectingReporter, FailureReporter, Operation, TracingReporter};
pub use session::{ChatSession, ClientError};
pub use transport::{
    HttpTransport, HttpTransportConfig, Method, MockTransport, RecordedRequest, Release,
    Transport, TransportError,
};
