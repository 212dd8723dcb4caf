//! ChatSession - the main interface for Parley.
//!
//! This module provides [`ChatSession`], the object the presentation layer
//! drives: load the roster, open a conversation, send messages, and read back
//! the reconciled state.
//!
//! # Architecture
//!
//! ChatSession uses the pure state (from chat-core) for every decision and
//! performs the I/O those decisions call for via the injected collaborators.
//!
//! ```text
//! Presentation → ChatSession → Transport   → Server
//!                    ↓    ↑
//!                    ↓    └── PushChannel ← Server (newMessage)
//!              chat-core (ChatState, Subscription)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use parley_chat_client::{ChatConfig, ChatSession, MockChannel, MockTransport};
//!
//! let session = ChatSession::new(ChatConfig::default(), MockTransport::new());
//! session.set_channel(Some(Arc::new(MockChannel::new()))).await;
//! session.load_roster().await?;
//! session.open_conversation(PeerId::from("alice")).await?;
//! session.send_message(Draft::text("hi")).await?;
//! ```

use async_trait::async_trait;
use parley_chat_core::{
    normalize_history, ChannelId, ChatState, HistoryOutcome, Reconciled, Subscription,
    SubscriptionAction, SubscriptionEvent,
};
use parley_chat_types::{ChatError, Draft, Message, Peer, PeerId, RosterResponse, SendResponse};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::channel::{PushChannel, PushHandler};
use crate::config::ChatConfig;
use crate::report::{FailureReporter, Operation, TracingReporter};
use crate::transport::{Transport, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with `success: false`.
    #[error("rejected by server: {0}")]
    Rejected(String),

    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] ChatError),

    /// An operation needed an active conversation and there was none.
    #[error("no active conversation")]
    NoActiveConversation,

    /// The draft had neither text nor an image.
    #[error("draft has no text or image")]
    EmptyDraft,
}

/// Push channel binding: the state machine plus the live channel it refers to.
struct Binding {
    subscription: Subscription,
    channel: Option<(ChannelId, Arc<dyn PushChannel>)>,
    next_id: ChannelId,
}

/// The main chat session.
///
/// Owns the reconciled state and the push subscription.
pub struct ChatSession<T: Transport + 'static> {
    config: ChatConfig,
    transport: Arc<T>,
    state: Arc<Mutex<ChatState>>,
    binding: Mutex<Binding>,
    reporter: Arc<dyn FailureReporter>,
}

impl<T: Transport + 'static> ChatSession<T> {
    /// Create a new ChatSession that reports failures through `tracing`.
    pub fn new(config: ChatConfig, transport: T) -> Self {
        let state = ChatState::new()
            .with_reset_unseen_on_select(config.conversation.reset_unseen_on_select);
        Self {
            config,
            transport: Arc::new(transport),
            state: Arc::new(Mutex::new(state)),
            binding: Mutex::new(Binding {
                subscription: Subscription::new(),
                channel: None,
                next_id: ChannelId::new(1),
            }),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Use `reporter` as the user-visible failure channel.
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    // ===========================================
    // Directory
    // ===========================================

    /// Fetch the peer list and the unseen snapshot, replacing both.
    ///
    /// On failure the error is reported and the previous state is kept.
    pub async fn load_roster(&self) -> Result<usize, ClientError> {
        match self.fetch_roster().await {
            Ok(roster) => {
                let (peers, unseen) = roster.into_parts();
                let count = peers.len();
                self.state.lock().await.apply_roster(peers, unseen);
                tracing::info!("Roster loaded: {} peers", count);
                Ok(count)
            }
            Err(e) => self.fail(Operation::LoadRoster, e),
        }
    }

    async fn fetch_roster(&self) -> Result<RosterResponse, ClientError> {
        let body = self.transport.get(&self.config.endpoints.roster).await?;
        ensure_success(&body)?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(ChatError::Decode(e)))
    }

    // ===========================================
    // Conversation Selector
    // ===========================================

    /// Change the active conversation and rebind the push handler.
    ///
    /// Returns `true` if the active conversation changed. The message list is
    /// emptied on change; call [`load_history`](Self::load_history) (or use
    /// [`open_conversation`](Self::open_conversation)) to fill it.
    pub async fn select_conversation(&self, peer: Option<PeerId>) -> bool {
        let mut binding = self.binding.lock().await;
        let mut state = self.state.lock().await;
        if !state.select(peer.clone()) {
            return false;
        }
        tracing::debug!("Active conversation: {:?}", peer);
        // No await from here until the handler is rebound.
        self.apply_event(&mut binding, SubscriptionEvent::ConversationChanged(peer), None);
        drop(state);
        true
    }

    /// Select `peer` and load its history.
    pub async fn open_conversation(&self, peer: PeerId) -> Result<HistoryOutcome, ClientError> {
        self.select_conversation(Some(peer.clone())).await;
        self.load_history(&peer).await
    }

    /// Fetch `peer`'s history and replace the message list with it.
    ///
    /// If another conversation became active while the request was in
    /// flight, the response is dropped and [`HistoryOutcome::Stale`] returned.
    pub async fn load_history(&self, peer: &PeerId) -> Result<HistoryOutcome, ClientError> {
        let path = self.config.endpoints.history_path(peer);
        let body = match self.transport.get(&path).await {
            Ok(body) => body,
            Err(e) => return self.fail(Operation::LoadHistory, e.into()),
        };
        if let Err(e) = ensure_success(&body) {
            return self.fail(Operation::LoadHistory, e);
        }

        let history = normalize_history(&body);
        if history.skipped > 0 {
            tracing::debug!(
                "Skipped {} undecodable messages in history for {}",
                history.skipped,
                peer
            );
        }

        let outcome = self.state.lock().await.apply_history(peer, history);
        match &outcome {
            HistoryOutcome::Applied(count) => {
                tracing::info!("History loaded for {}: {} messages", peer, count)
            }
            HistoryOutcome::Stale { requested, active } => tracing::debug!(
                "Discarding stale history for {} (active: {:?})",
                requested,
                active
            ),
        }
        Ok(outcome)
    }

    // ===========================================
    // Send Path
    // ===========================================

    /// Send `draft` to the active conversation.
    pub async fn send_message(&self, draft: Draft) -> Result<Message, ClientError> {
        let active = self.state.lock().await.active().cloned();
        match active {
            Some(peer) => self.send_message_to(&peer, draft).await,
            None => self.fail(Operation::SendMessage, ClientError::NoActiveConversation),
        }
    }

    /// Send `draft` to `peer`.
    ///
    /// Only the server's canonical record is appended, and only if `peer` is
    /// still the active conversation when the response arrives.
    pub async fn send_message_to(
        &self,
        peer: &PeerId,
        draft: Draft,
    ) -> Result<Message, ClientError> {
        if draft.is_empty() {
            return self.fail(Operation::SendMessage, ClientError::EmptyDraft);
        }
        let message = match self.post_message(peer, &draft).await {
            Ok(message) => message,
            Err(e) => return self.fail(Operation::SendMessage, e),
        };

        let appended = self
            .state
            .lock()
            .await
            .apply_sent(peer, message.clone());
        if !appended {
            tracing::debug!(
                "Sent {} to {}, not the active conversation; not appended",
                message.id,
                peer
            );
        }
        Ok(message)
    }

    async fn post_message(&self, peer: &PeerId, draft: &Draft) -> Result<Message, ClientError> {
        let body = serde_json::to_value(draft).map_err(ChatError::Encode)?;
        let response = self
            .transport
            .post(&self.config.endpoints.send_path(peer), body)
            .await?;
        ensure_success(&response)?;
        let sent: SendResponse = serde_json::from_value(response).map_err(ChatError::Decode)?;
        Ok(sent.new_message)
    }

    // ===========================================
    // Push Subscription
    // ===========================================

    /// Install (or remove, with `None`) the live push channel.
    ///
    /// Passing the channel that is already installed is a no-op; any other
    /// channel moves the handler over.
    pub async fn set_channel(&self, channel: Option<Arc<dyn PushChannel>>) {
        let mut binding = self.binding.lock().await;

        if let (Some(next), Some((_, current))) = (&channel, &binding.channel) {
            if Arc::ptr_eq(next, current) {
                return;
            }
        }

        let previous = binding.channel.take();
        let next_id = match channel {
            Some(channel) => {
                let id = binding.next_id;
                binding.next_id = id.next();
                binding.channel = Some((id, channel));
                Some(id)
            }
            None => None,
        };
        tracing::debug!("Push channel replaced: {:?}", next_id);
        self.apply_event(
            &mut binding,
            SubscriptionEvent::ChannelChanged(next_id),
            previous,
        );
    }

    /// Detach the handler permanently. Later channel or conversation
    /// changes no longer bind anything.
    pub async fn teardown(&self) {
        let mut binding = self.binding.lock().await;
        self.apply_event(&mut binding, SubscriptionEvent::Teardown, None);
        binding.channel = None;
        tracing::debug!("Push subscription torn down");
    }

    /// Check if a push handler is currently attached.
    pub async fn is_subscribed(&self) -> bool {
        self.binding.lock().await.subscription.is_bound()
    }

    /// Run the subscription state machine and execute its actions in order.
    ///
    /// `previous` is the channel that was replaced by this event, if any;
    /// detach actions may refer to it.
    fn apply_event(
        &self,
        binding: &mut Binding,
        event: SubscriptionEvent,
        previous: Option<(ChannelId, Arc<dyn PushChannel>)>,
    ) {
        let subscription = std::mem::take(&mut binding.subscription);
        let (next, actions) = subscription.on_event(event);
        binding.subscription = next;

        let event_name = &self.config.push.new_message_event;
        for action in actions {
            match action {
                SubscriptionAction::Detach { channel } => {
                    if let Some(ch) = resolve(channel, &binding.channel, &previous) {
                        ch.off(event_name);
                        tracing::debug!("Detached {} handler from {}", event_name, channel);
                    }
                }
                SubscriptionAction::Attach {
                    channel,
                    conversation,
                } => {
                    if let Some(ch) = resolve(channel, &binding.channel, &previous) {
                        tracing::debug!(
                            "Attached {} handler to {} for {:?}",
                            event_name,
                            channel,
                            conversation
                        );
                        ch.on(event_name, self.handler_for(conversation));
                    }
                }
            }
        }
    }

    fn handler_for(&self, conversation: Option<PeerId>) -> Arc<dyn PushHandler> {
        Arc::new(MessageHandler {
            conversation,
            state: Arc::clone(&self.state),
            transport: Arc::clone(&self.transport),
            reporter: Arc::clone(&self.reporter),
            config: self.config.clone(),
        })
    }

    // ===========================================
    // Read Access
    // ===========================================

    /// Messages of the active conversation, in order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages().as_slice().to_vec()
    }

    /// All known peers.
    pub async fn peers(&self) -> Vec<Peer> {
        self.state.lock().await.peers().to_vec()
    }

    /// Look up a peer by id.
    pub async fn peer(&self, id: &PeerId) -> Option<Peer> {
        self.state.lock().await.peer(id).cloned()
    }

    /// Currently active peer.
    pub async fn active(&self) -> Option<PeerId> {
        self.state.lock().await.active().cloned()
    }

    /// Unseen counts, ordered by peer id, zeros omitted.
    pub async fn unseen_snapshot(&self) -> BTreeMap<PeerId, u32> {
        self.state.lock().await.unseen().snapshot()
    }

    /// Unseen count for one peer.
    pub async fn unseen_count(&self, peer: &PeerId) -> u32 {
        self.state.lock().await.unseen().get(peer)
    }

    /// Unseen count across all peers.
    pub async fn total_unseen(&self) -> u64 {
        self.state.lock().await.unseen().total()
    }

    /// Zero one peer's unseen count.
    pub async fn clear_unseen(&self, peer: &PeerId) {
        self.state.lock().await.clear_unseen(peer);
    }

    /// Get a reference to the underlying transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the session configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn fail<R>(&self, operation: Operation, error: ClientError) -> Result<R, ClientError> {
        self.reporter.report(operation, &error);
        Err(error)
    }
}

fn resolve<'a>(
    id: ChannelId,
    current: &'a Option<(ChannelId, Arc<dyn PushChannel>)>,
    previous: &'a Option<(ChannelId, Arc<dyn PushChannel>)>,
) -> Option<&'a Arc<dyn PushChannel>> {
    [current, previous]
        .into_iter()
        .flatten()
        .find(|(candidate, _)| *candidate == id)
        .map(|(_, channel)| channel)
}

/// Reject responses whose `success` flag is missing or false.
fn ensure_success(body: &Value) -> Result<(), ClientError> {
    match body.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        _ => Err(ClientError::Rejected(
            body.get("message")
                .and_then(Value::as_str)
                .unwrap_or("request rejected by server")
                .to_string(),
        )),
    }
}

/// Push handler bound to one conversation.
///
/// The conversation is fixed at bind time; the session rebinds a fresh
/// handler whenever the active conversation changes.
struct MessageHandler<T: Transport> {
    conversation: Option<PeerId>,
    state: Arc<Mutex<ChatState>>,
    transport: Arc<T>,
    reporter: Arc<dyn FailureReporter>,
    config: ChatConfig,
}

#[async_trait]
impl<T: Transport + 'static> PushHandler for MessageHandler<T> {
    async fn handle(&self, payload: Value) {
        let message = match Message::from_value(payload) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping malformed push event: {}", e);
                return;
            }
        };

        let outcome = self
            .state
            .lock()
            .await
            .reconcile(self.conversation.as_ref(), message);

        match outcome {
            Reconciled::Appended { ack } => {
                let path = self.config.endpoints.mark_read_path(&ack);
                if let Err(e) = self.transport.put(&path).await {
                    // The append stands; the server will still report it unseen.
                    self.reporter
                        .report(Operation::AcknowledgeRead, &ClientError::Transport(e));
                }
            }
            Reconciled::CountedUnseen { peer, count } => {
                tracing::debug!("Unseen from {}: {}", peer, count);
            }
        }
    }
}
