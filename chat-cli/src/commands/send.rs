//! Send a message to a peer.

use anyhow::Result;
use parley_chat_client::ChatConfig;
use parley_chat_types::{Draft, PeerId};

use super::{connect, format_message};

/// Run the send command.
pub async fn run(
    config: &ChatConfig,
    peer: &str,
    text: Option<String>,
    image: Option<String>,
) -> Result<()> {
    let session = connect(config)?;
    let draft = Draft { text, image };

    let sent = session.send_message_to(&PeerId::from(peer), draft).await?;

    println!("Sent {}", sent.id);
    println!("  {}", format_message(&sent));

    Ok(())
}
