//! Request/response transport abstraction for Parley.
//!
//! This module provides a pluggable transport layer for the three calls the
//! chat engine makes against the server (HTTP, mock for testing).
//!
//! # Design
//!
//! The transport trait is async and path-oriented:
//! - `get()` fetches a resource (roster, history)
//! - `post()` creates a resource (send a message)
//! - `put()` updates a resource (mark a message as read)
//!
//! Every call returns the decoded JSON body (`null` when there is none).
//! Interpreting the body (the `success` flag, field names) is the session's
//! job, not the transport's.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.queue_response(Method::Get, "/api/messages/user", json!({ "success": true, "users": [] }));
//! let body = transport.get("/api/messages/user").await?;
//! ```

mod http;
mod mock;

pub use http::{HttpTransport, HttpTransportConfig};
pub use mock::{Method, MockTransport, RecordedRequest, Release};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The server could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The server answered with a non-success status.
    #[error("server returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The request did not complete in time.
    #[error("request timeout")]
    Timeout,
}

/// Transport trait for the request/response half of the chat protocol.
///
/// Implementations handle the underlying mechanism (HTTP, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the resource at `path`.
    async fn get(&self, path: &str) -> Result<Value, TransportError>;

    /// Create a resource at `path` with a JSON body.
    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError>;

    /// Update the resource at `path` (no body).
    async fn put(&self, path: &str) -> Result<Value, TransportError>;
}
