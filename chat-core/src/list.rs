//! Message list for the active conversation.
//!
//! The list starts out unloaded (no history fetched yet). Appending to an
//! unloaded list is allowed and treats it as empty, so a push that beats the
//! history fetch never faults.

use parley_chat_types::{Message, MessageId};

/// Ordered messages of the currently active conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList {
    /// `None` until history is loaded or something is appended.
    messages: Option<Vec<Message>>,
}

impl MessageList {
    /// Create an unloaded list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents wholesale (history load).
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = Some(messages);
    }

    /// Append one message at the end.
    pub fn append(&mut self, message: Message) {
        self.messages.get_or_insert_with(Vec::new).push(message);
    }

    /// Drop the contents and return to the unloaded state.
    pub fn unload(&mut self) {
        self.messages = None;
    }

    /// True once history was loaded or a message was appended.
    pub fn is_loaded(&self) -> bool {
        self.messages.is_some()
    }

    /// Messages in arrival order (empty when unloaded).
    pub fn as_slice(&self) -> &[Message] {
        self.messages.as_deref().unwrap_or(&[])
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True when there are no messages.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Check whether a message with `id` is present.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.as_slice().iter().any(|m| &m.id == id)
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.as_slice().last()
    }
}
