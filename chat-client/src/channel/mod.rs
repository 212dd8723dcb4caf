//! Push channel abstraction for Parley.
//!
//! The push channel is the persistent connection that delivers
//! server-originated events. Only its subscription primitives are used:
//!
//! - `on(event, handler)` registers a handler for an event name
//! - `off(event)` removes every handler registered for that event name
//!
//! Like the socket libraries it models, `on` does not replace an existing
//! handler; it adds another one. Keeping at most one handler attached is the
//! session's responsibility.

mod mock;

pub use mock::MockChannel;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Receives the payload of one pushed event.
#[async_trait]
pub trait PushHandler: Send + Sync {
    /// Handle one event payload. Must not panic on malformed input.
    async fn handle(&self, payload: Value);
}

/// Subscription primitives of a live push connection.
pub trait PushChannel: Send + Sync {
    /// Register `handler` for `event`.
    fn on(&self, event: &str, handler: Arc<dyn PushHandler>);

    /// Remove all handlers for `event`.
    fn off(&self, event: &str);
}
