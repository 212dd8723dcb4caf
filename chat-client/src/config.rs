//! Configuration for the chat session.
//!
//! Configuration can be loaded from a TOML file; every field has a default,
//! so an empty document yields [`ChatConfig::default`].
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:5000"
//! token = "..."
//! timeout_secs = 30
//!
//! [endpoints]
//! roster = "/api/messages/user"
//! history = "/api/messages"
//! send = "/api/messages/send"
//! mark_read = "/api/messages/mark"
//!
//! [push]
//! new_message_event = "newMessage"
//!
//! [conversation]
//! reset_unseen_on_select = false
//! ```

use parley_chat_types::{MessageId, PeerId};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::transport::HttpTransportConfig;

/// Root configuration for a [`ChatSession`](crate::ChatSession).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatConfig {
    /// Where the server lives and how to authenticate.
    #[serde(default)]
    pub server: HttpTransportConfig,
    /// Server routes.
    #[serde(default)]
    pub endpoints: EndpointConfig,
    /// Push channel settings.
    #[serde(default)]
    pub push: PushConfig,
    /// Conversation policies.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Server routes used by the session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    /// Roster route (default: `/api/messages/user`).
    #[serde(default = "default_roster")]
    pub roster: String,
    /// History route prefix; the peer id is appended (default: `/api/messages`).
    #[serde(default = "default_history")]
    pub history: String,
    /// Send route prefix; the peer id is appended (default: `/api/messages/send`).
    #[serde(default = "default_send")]
    pub send: String,
    /// Mark-as-read route prefix; the message id is appended (default: `/api/messages/mark`).
    #[serde(default = "default_mark_read")]
    pub mark_read: String,
}

/// Push channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushConfig {
    /// Event name carrying new messages (default: `newMessage`).
    #[serde(default = "default_new_message_event")]
    pub new_message_event: String,
}

/// Conversation policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConversationConfig {
    /// Zero a peer's unseen count when it becomes active (default: false).
    #[serde(default)]
    pub reset_unseen_on_select: bool,
}

// Default value functions
fn default_roster() -> String {
    "/api/messages/user".to_string()
}

fn default_history() -> String {
    "/api/messages".to_string()
}

fn default_send() -> String {
    "/api/messages/send".to_string()
}

fn default_mark_read() -> String {
    "/api/messages/mark".to_string()
}

fn default_new_message_event() -> String {
    "newMessage".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            history: default_history(),
            send: default_send(),
            mark_read: default_mark_read(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            new_message_event: default_new_message_event(),
        }
    }
}

impl EndpointConfig {
    /// Route for one peer's history.
    pub fn history_path(&self, peer: &PeerId) -> String {
        join(&self.history, peer.as_str())
    }

    /// Route for sending to one peer.
    pub fn send_path(&self, peer: &PeerId) -> String {
        join(&self.send, peer.as_str())
    }

    /// Route for marking one message as read.
    pub fn mark_read_path(&self, message: &MessageId) -> String {
        join(&self.mark_read, message.as_str())
    }
}

fn join(prefix: &str, id: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), id)
}

impl ChatConfig {
    /// Set the push event name.
    pub fn with_new_message_event(mut self, event: &str) -> Self {
        self.push.new_message_event = event.to_string();
        self
    }

    /// Enable or disable zeroing the unseen count on selection.
    pub fn with_reset_unseen_on_select(mut self, enabled: bool) -> Self {
        self.conversation.reset_unseen_on_select = enabled;
        self
    }

    /// Set the server connection settings.
    pub fn with_server(mut self, server: HttpTransportConfig) -> Self {
        self.server = server;
        self
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::InvalidToml)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to parse inline configuration.
    #[error("invalid config: {0}")]
    InvalidToml(#[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_matches_server_routes() {
        let config = ChatConfig::default();
        assert_eq!(config.endpoints.roster, "/api/messages/user");
        assert_eq!(config.endpoints.history, "/api/messages");
        assert_eq!(config.push.new_message_event, "newMessage");
        assert!(!config.conversation.reset_unseen_on_select);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ChatConfig::from_toml_str("").unwrap(), ChatConfig::default());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[endpoints]
history = "/v2/history/"

[push]
new_message_event = "message:new"

[conversation]
reset_unseen_on_select = true
"#;

        let config = ChatConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.server, HttpTransportConfig::default());
        assert_eq!(config.endpoints.history, "/v2/history/");
        assert_eq!(config.endpoints.roster, "/api/messages/user");
        assert_eq!(config.push.new_message_event, "message:new");
        assert!(config.conversation.reset_unseen_on_select);
    }

    #[test]
    fn server_section_is_read() {
        let toml = r#"
[server]
base_url = "https://chat.example.com"
token = "abc"
"#;

        let config = ChatConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.server.base_url, "https://chat.example.com");
        assert_eq!(config.server.token.as_deref(), Some("abc"));
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.endpoints, EndpointConfig::default());
    }

    #[test]
    fn route_builders_append_ids() {
        let endpoints = EndpointConfig {
            history: "/v2/history/".to_string(),
            ..EndpointConfig::default()
        };
        assert_eq!(endpoints.history_path(&PeerId::from("A")), "/v2/history/A");
        assert_eq!(endpoints.send_path(&PeerId::from("A")), "/api/messages/send/A");
        assert_eq!(
            endpoints.mark_read_path(&MessageId::from("x")),
            "/api/messages/mark/x"
        );
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::default()
            .with_server(HttpTransportConfig::new("http://10.0.0.2:5000"))
            .with_new_message_event("evt")
            .with_reset_unseen_on_select(true);
        assert_eq!(config.server.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.push.new_message_event, "evt");
        assert!(config.conversation.reset_unseen_on_select);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let result = ChatConfig::from_toml_str("[push]\nnew_message_event = 5");
        assert!(matches!(result, Err(ConfigError::InvalidToml(_))));
    }

    #[test]
    fn config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[push]\nnew_message_event = \"chat\"").unwrap();

        let config = ChatConfig::from_file(file.path()).unwrap();
        assert_eq!(config.push.new_message_event, "chat");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\ntimeout_secs = \"soon\"").unwrap();

        let result = ChatConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ChatConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
