//! Mock transport for testing.
//!
//! Allows queueing responses per route, forcing failures, holding a request
//! in flight, and capturing every request for verification.

use super::{Transport, TransportError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Request method, as seen by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `get()`
    Get,
    /// `post()`
    Post,
    /// `put()`
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
            Method::Put => f.write_str("PUT"),
        }
    }
}

/// A request captured by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Method used.
    pub method: Method,
    /// Path requested.
    pub path: String,
    /// Body, for `post()`.
    pub body: Option<Value>,
}

/// Handle that lets a held request complete.
#[derive(Debug, Clone)]
pub struct Release(Arc<Notify>);

impl Release {
    /// Let the held request proceed. Safe to call before the request arrives.
    pub fn release(&self) {
        self.0.notify_one();
    }
}

type Route = (Method, String);

/// Mock transport for testing.
///
/// Responses are queued per (method, path). A `put()` with nothing queued
/// succeeds with `{"success": true}` so read acknowledgements need no setup;
/// a `get()` or `post()` with nothing queued fails.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    responses: HashMap<Route, VecDeque<Result<Value, String>>>,
    holds: HashMap<Route, Arc<Notify>>,
    requests: Vec<RecordedRequest>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a body to be returned by the next call to `method path`.
    pub fn queue_response(&self, method: Method, path: &str, body: Value) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .responses
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Ok(body));
    }

    /// Cause the next call to `method path` to fail with the given error.
    pub fn fail_next(&self, method: Method, path: &str, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .responses
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Err(error.to_string()));
    }

    /// Keep the next call to `method path` in flight until released.
    pub fn hold(&self, method: Method, path: &str) -> Release {
        let notify = Arc::new(Notify::new());
        let mut inner = self.inner.lock().unwrap();
        inner
            .holds
            .insert((method, path.to_string()), Arc::clone(&notify));
        Release(notify)
    }

    /// Get all requests that were made, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Get the requests made with one method.
    pub fn requests_with(&self, method: Method) -> Vec<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Count the calls made to `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Clear all state (queued responses, holds, captured requests).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockTransportInner::default();
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let route = (method, path.to_string());
        let hold = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(RecordedRequest {
                method,
                path: path.to_string(),
                body,
            });
            inner.holds.remove(&route)
        };

        if let Some(notify) = hold {
            notify.notified().await;
        }

        let mut inner = self.inner.lock().unwrap();
        match inner.responses.get_mut(&route).and_then(VecDeque::pop_front) {
            Some(Ok(body)) => Ok(body),
            Some(Err(error)) => Err(TransportError::RequestFailed(error)),
            None if method == Method::Put => Ok(json!({ "success": true })),
            None => Err(TransportError::RequestFailed(format!(
                "no response queued for {} {}",
                method, path
            ))),
        }
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.call(Method::Get, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.call(Method::Post, path, Some(body)).await
    }

    async fn put(&self, path: &str) -> Result<Value, TransportError> {
        self.call(Method::Put, path, None).await
    }
}
