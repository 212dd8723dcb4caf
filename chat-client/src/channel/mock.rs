//! Mock push channel for testing.
//!
//! Keeps every registered handler (so a double `on` is observable), counts
//! attach/detach calls, and delivers events on demand with [`MockChannel::emit`].

use super::{PushChannel, PushHandler};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Mock push channel for testing.
#[derive(Default)]
pub struct MockChannel {
    inner: Arc<Mutex<MockChannelInner>>,
}

#[derive(Default)]
struct MockChannelInner {
    handlers: HashMap<String, Vec<Arc<dyn PushHandler>>>,
    attach_count: usize,
    detach_count: usize,
    max_handlers: usize,
}

impl MockChannel {
    /// Create a new mock channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `payload` to every handler registered for `event`.
    ///
    /// Returns the number of handlers invoked.
    pub async fn emit(&self, event: &str, payload: Value) -> usize {
        let handlers = {
            let inner = self.inner.lock().unwrap();
            inner.handlers.get(event).cloned().unwrap_or_default()
        };
        for handler in &handlers {
            handler.handle(payload.clone()).await;
        }
        handlers.len()
    }

    /// Number of handlers currently registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.handlers.get(event).map_or(0, Vec::len)
    }

    /// Highest number of handlers ever registered for one event at once.
    pub fn max_handlers(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.max_handlers
    }

    /// Total `on` calls.
    pub fn attach_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.attach_count
    }

    /// Total `off` calls.
    pub fn detach_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.detach_count
    }
}

impl Clone for MockChannel {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for MockChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap();
        let counts: HashMap<&str, usize> = inner
            .handlers
            .iter()
            .map(|(event, hs)| (event.as_str(), hs.len()))
            .collect();
        f.debug_struct("MockChannel")
            .field("handlers", &counts)
            .field("attach_count", &inner.attach_count)
            .field("detach_count", &inner.detach_count)
            .finish()
    }
}

impl PushChannel for MockChannel {
    fn on(&self, event: &str, handler: Arc<dyn PushHandler>) {
        let mut inner = self.inner.lock().unwrap();
        inner.attach_count += 1;
        let slot = inner.handlers.entry(event.to_string()).or_default();
        slot.push(handler);
        let len = slot.len();
        inner.max_handlers = inner.max_handlers.max(len);
    }

    fn off(&self, event: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.detach_count += 1;
        inner.handlers.remove(event);
    }
}
