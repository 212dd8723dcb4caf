//! HTTP transport backed by `reqwest`.
//!
//! Paths passed to the [`Transport`] methods are appended to `base_url`. The
//! session token, when configured, travels in a `token` header on every
//! request.

use super::{Transport, TransportError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpTransportConfig {
    /// Server origin, e.g. `https://chat.example.com` (default: `http://localhost:5000`).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Session token issued at login.
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpTransportConfig {
    /// Create a config for `base_url` with defaults elsewhere.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Set the session token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Transport that talks JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: HttpTransportConfig,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Build the absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.config.token {
            Some(token) => builder.header("token", token),
            None => builder,
        }
    }

    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
        expect: Body,
    ) -> Result<Value, TransportError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        decode_body(&bytes, expect)
    }
}

/// What a successful response must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    /// A JSON document; anything else is a decode error.
    Json,
    /// Whatever the server sends; a missing or non-JSON body reads as `null`.
    Ignored,
}

/// Decode a successful response body. An empty body is `null`.
fn decode_body(bytes: &[u8], expect: Body) -> Result<Value, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(_) if expect == Body::Ignored => Ok(Value::Null),
        Err(e) => Err(TransportError::Decode(e.to_string())),
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else {
            TransportError::RequestFailed(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.execute(self.request(reqwest::Method::GET, path), Body::Json)
            .await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.execute(self.request(reqwest::Method::POST, path).json(&body), Body::Json)
            .await
    }

    async fn put(&self, path: &str) -> Result<Value, TransportError> {
        // Read acknowledgements answer with anything from 204 to a JSON status.
        self.execute(self.request(reqwest::Method::PUT, path), Body::Ignored)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = HttpTransportConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_none());
    }

    #[test]
    fn config_builder_pattern() {
        let config = HttpTransportConfig::new("https://chat.example.com")
            .with_token("tok")
            .with_timeout_secs(5);

        assert_eq!(config.base_url, "https://chat.example.com");
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let transport =
            HttpTransport::new(HttpTransportConfig::new("https://chat.example.com/")).unwrap();
        assert_eq!(
            transport.url("/api/messages/user"),
            "https://chat.example.com/api/messages/user"
        );
        assert_eq!(
            transport.url("api/messages/user"),
            "https://chat.example.com/api/messages/user"
        );
    }

    #[test]
    fn config_from_toml_with_defaults() {
        let config: HttpTransportConfig = toml::from_str(r#"token = "abc""#).unwrap();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.token.as_deref(), Some("abc"));
    }

    #[test]
    fn empty_body_decodes_as_null() {
        assert_eq!(decode_body(b"", Body::Json).unwrap(), Value::Null);
        assert_eq!(decode_body(b" \r\n", Body::Ignored).unwrap(), Value::Null);
    }

    #[test]
    fn json_body_is_decoded() {
        let value = decode_body(br#"{"success":true}"#, Body::Ignored).unwrap();
        assert_eq!(value["success"], Value::Bool(true));
    }

    #[test]
    fn non_json_body_is_ignored_for_acknowledgements_only() {
        assert_eq!(decode_body(b"OK", Body::Ignored).unwrap(), Value::Null);
        assert!(matches!(
            decode_body(b"OK", Body::Json),
            Err(TransportError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let transport = HttpTransport::new(
            HttpTransportConfig::new("http://127.0.0.1:9").with_timeout_secs(2),
        )
        .unwrap();

        let result = transport.get("/api/messages/user").await;
        assert!(result.is_err());
    }
}
