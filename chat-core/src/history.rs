//! History response normalization.
//!
//! Servers have shipped the message collection under two field names. The
//! primary field wins whenever it holds an array; the fallback is used only
//! when the primary is absent or not an array. Anything else normalizes to an
//! empty history instead of an error.

use parley_chat_types::Message;
use serde_json::Value;

/// Field name used by current servers.
pub const PRIMARY_FIELD: &str = "messages";

/// Field name used by older servers.
pub const FALLBACK_FIELD: &str = "message";

/// Result of normalizing one history response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedHistory {
    /// Decoded messages in server order.
    pub messages: Vec<Message>,
    /// Elements that were present but could not be decoded.
    pub skipped: usize,
}

/// Pick the message collection out of a history response.
pub fn normalize_history(response: &Value) -> NormalizedHistory {
    let Some(elements) = select_collection(response) else {
        return NormalizedHistory::default();
    };

    let mut history = NormalizedHistory {
        messages: Vec::with_capacity(elements.len()),
        skipped: 0,
    };
    for element in elements {
        match Message::from_value(element.clone()) {
            Ok(message) => history.messages.push(message),
            Err(_) => history.skipped += 1,
        }
    }
    history
}

fn select_collection(response: &Value) -> Option<&Vec<Value>> {
    response
        .get(PRIMARY_FIELD)
        .and_then(Value::as_array)
        .or_else(|| response.get(FALLBACK_FIELD).and_then(Value::as_array))
}
