//! CLI command implementations.

pub mod history;
pub mod replay;
pub mod roster;
pub mod send;

use anyhow::{Context, Result};
use parley_chat_client::{ChatConfig, ChatSession, HttpTransport};
use parley_chat_types::Message;

/// Build a session that talks to the configured server.
pub fn connect(config: &ChatConfig) -> Result<ChatSession<HttpTransport>> {
    let transport =
        HttpTransport::new(config.server.clone()).context("Failed to create HTTP transport")?;
    tracing::debug!("Using server {}", transport.base_url());
    Ok(ChatSession::new(config.clone(), transport))
}

/// One display line for a message.
pub fn format_message(message: &Message) -> String {
    let mut line = String::new();
    if let Some(at) = &message.created_at {
        line.push_str(&format!("[{}] ", at));
    }
    line.push_str(&format!("{}:", message.sender_id));
    if let Some(text) = &message.payload.text {
        line.push_str(&format!(" {}", text));
    }
    if message.payload.image.is_some() {
        line.push_str(" [image]");
    }
    line
}
