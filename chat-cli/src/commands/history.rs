//! Show one conversation.

use anyhow::Result;
use parley_chat_client::ChatConfig;
use parley_chat_types::PeerId;

use super::{connect, format_message};

/// Run the history command.
pub async fn run(config: &ChatConfig, peer: &str) -> Result<()> {
    let session = connect(config)?;
    session.open_conversation(PeerId::from(peer)).await?;

    let messages = session.messages().await;
    if messages.is_empty() {
        println!("No messages with {}", peer);
        return Ok(());
    }
    for message in &messages {
        println!("{}", format_message(message));
    }

    Ok(())
}
