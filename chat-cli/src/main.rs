//! # parley
//!
//! CLI tool for exercising the Parley chat engine.
//!
//! ## Commands
//!
//! - `roster`: List peers with their unseen counts
//! - `history`: Show one conversation
//! - `send`: Send a message to a peer
//! - `replay`: Run a scripted scenario against the mock server
//!
//! ## Example
//!
//! ```bash
//! # List peers
//! parley --token "$TOKEN" roster
//!
//! # Read and reply
//! parley history 6650a1c2e4b0
//! parley send 6650a1c2e4b0 "on my way"
//!
//! # Offline scenario (no server needed)
//! parley replay scenario.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{history, replay, roster, send};

/// CLI tool for exercising the Parley chat engine.
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./parley.toml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Server origin, overrides the config file
    #[arg(long, global = true)]
    server: Option<String>,

    /// Session token, overrides the config file
    #[arg(long, global = true)]
    token: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List peers and unseen counts
    Roster,

    /// Show the messages exchanged with a peer
    History {
        /// Peer identifier
        peer: String,
    },

    /// Send a message to a peer
    Send {
        /// Peer identifier
        peer: String,

        /// Message text
        text: Option<String>,

        /// Image reference (URL or data URI)
        #[arg(long)]
        image: Option<String>,
    },

    /// Replay a scripted scenario against the mock server
    Replay {
        /// Scenario file (JSON)
        scenario: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    if let Some(token) = cli.token {
        config.server.token = Some(token);
    }

    match cli.command {
        Commands::Roster => {
            roster::run(&config).await?;
        }
        Commands::History { peer } => {
            history::run(&config, &peer).await?;
        }
        Commands::Send { peer, text, image } => {
            if text.is_none() && image.is_none() {
                anyhow::bail!("Must specify message text or --image");
            }
            send::run(&config, &peer, text, image).await?;
        }
        Commands::Replay { scenario } => {
            replay::run(&config, &scenario).await?;
        }
    }

    Ok(())
}
