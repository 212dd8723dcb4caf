//! Configuration loading for parley.

use anyhow::Result;
use parley_chat_client::ChatConfig;
use std::path::Path;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "parley.toml";

/// Load configuration.
///
/// An explicit path must exist. Without one, `parley.toml` in the working
/// directory is used if present, otherwise defaults.
pub fn load(path: Option<&Path>) -> Result<ChatConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
        None => return Ok(ChatConfig::default()),
    };
    let config = ChatConfig::from_file(path)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}
