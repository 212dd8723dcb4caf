//! List peers and unseen counts.

use anyhow::Result;
use parley_chat_client::ChatConfig;

use super::connect;

/// Run the roster command.
pub async fn run(config: &ChatConfig) -> Result<()> {
    let session = connect(config)?;
    session.load_roster().await?;

    let peers = session.peers().await;
    let unseen = session.unseen_snapshot().await;

    println!("=== {} peers ===", peers.len());
    for peer in &peers {
        match unseen.get(&peer.id) {
            Some(count) => println!("  {} ({})  {} unseen", peer.display_name(), peer.id, count),
            None => println!("  {} ({})", peer.display_name(), peer.id),
        }
    }
    println!();
    println!("Total unseen: {}", session.total_unseen().await);

    Ok(())
}
