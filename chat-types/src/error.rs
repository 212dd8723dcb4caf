//! Error types for Parley wire types.

use thiserror::Error;

/// Errors that can occur while decoding Parley wire types.
#[derive(Debug, Error)]
pub enum ChatError {
    /// JSON decoding failed
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// JSON encoding failed
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}
