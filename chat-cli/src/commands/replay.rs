//! Replay a scripted scenario against the mock server.
//!
//! A scenario file describes what the server knows and what happens on the
//! wire, step by step:
//!
//! ```json
//! {
//!   "roster": { "success": true, "users": [{ "_id": "A" }], "unseenMessages": { "A": 1 } },
//!   "histories": { "A": { "success": true, "messages": [] } },
//!   "steps": [
//!     { "open": "A" },
//!     { "push": { "_id": "m1", "senderId": "A", "text": "hi" } },
//!     { "send": { "text": "hello", "echo": { "success": true, "newMessage": { "_id": "m2", "senderId": "me", "text": "hello" } } } },
//!     { "select": null },
//!     "reconnect",
//!     "teardown"
//!   ]
//! }
//! ```
//!
//! No network is used: requests go to a mock transport and pushes are
//! delivered through a mock channel.

use anyhow::{Context, Result};
use parley_chat_client::{
    ChatConfig, ChatSession, CollectingReporter, Method, MockChannel, MockTransport, Operation,
};
use parley_chat_types::{Draft, Message, PeerId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use super::format_message;

/// A scripted session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    /// Roster response, loaded before the first step.
    #[serde(default)]
    pub roster: Option<Value>,
    /// History responses by peer, served on every `open`.
    #[serde(default)]
    pub histories: HashMap<PeerId, Value>,
    /// What happens, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Change the active conversation without loading history.
    Select(Option<PeerId>),
    /// Select a conversation and load its history.
    Open(PeerId),
    /// Deliver a push event carrying this payload.
    Push(Value),
    /// Send to the active conversation; `echo` is the server's answer.
    Send {
        /// Message text.
        #[serde(default)]
        text: Option<String>,
        /// Image reference.
        #[serde(default)]
        image: Option<String>,
        /// Send response.
        echo: Value,
    },
    /// Fail the next request to `path` (GET, POST or PUT as given).
    Fail {
        /// HTTP method name.
        method: String,
        /// Route.
        path: String,
    },
    /// Replace the push channel with a fresh one.
    Reconnect,
    /// Tear the subscription down.
    Teardown,
}

/// What a replay ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Active conversation.
    pub active: Option<PeerId>,
    /// Message list of the active conversation.
    pub messages: Vec<Message>,
    /// Unseen counts.
    pub unseen: BTreeMap<PeerId, u32>,
    /// Messages acknowledged as read.
    pub acknowledged: Vec<String>,
    /// Largest number of handlers ever attached to one channel.
    pub max_handlers: usize,
    /// Reported failures.
    pub failures: Vec<(Operation, String)>,
}

/// Run the replay command.
pub async fn run(config: &ChatConfig, path: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&contents).context("Invalid scenario")?;

    let report = replay(config.clone(), scenario).await?;

    println!("=== replay: {} ===", path.display());
    match &report.active {
        Some(peer) => println!("Active: {}", peer),
        None => println!("Active: (none)"),
    }
    println!("Messages: {}", report.messages.len());
    for message in &report.messages {
        println!("  {}", format_message(message));
    }
    println!("Unseen:");
    for (peer, count) in &report.unseen {
        println!("  {}: {}", peer, count);
    }
    println!("Acknowledged: {}", report.acknowledged.join(", "));
    println!("Max handlers: {}", report.max_handlers);
    if !report.failures.is_empty() {
        println!("Failures:");
        for (operation, error) in &report.failures {
            println!("  {}: {}", operation, error);
        }
    }

    Ok(())
}

/// Drive a session through `scenario` and collect the final state.
///
/// Operation failures are part of the outcome and end up in
/// [`ReplayReport::failures`]; only malformed scenarios are errors.
pub async fn replay(config: ChatConfig, scenario: Scenario) -> Result<ReplayReport> {
    let ack_prefix = config.endpoints.mark_read.trim_end_matches('/').to_string();
    let transport = MockTransport::new();
    let reporter = CollectingReporter::new();
    let session = ChatSession::new(config, transport.clone())
        .with_reporter(Arc::new(reporter.clone()));

    let mut channels = vec![MockChannel::new()];
    let mut channel = channels[0].clone();
    session.set_channel(Some(Arc::new(channel.clone()))).await;

    if let Some(roster) = scenario.roster {
        let route = session.config().endpoints.roster.clone();
        transport.queue_response(Method::Get, &route, roster);
        let _ = session.load_roster().await;
    }

    for (index, step) in scenario.steps.into_iter().enumerate() {
        tracing::debug!("Step {}: {:?}", index, step);
        match step {
            Step::Select(peer) => {
                session.select_conversation(peer).await;
            }
            Step::Open(peer) => {
                let body = scenario
                    .histories
                    .get(&peer)
                    .cloned()
                    .unwrap_or_else(|| json!({ "success": true, "messages": [] }));
                let route = session.config().endpoints.history_path(&peer);
                transport.queue_response(Method::Get, &route, body);
                let _ = session.open_conversation(peer).await;
            }
            Step::Push(payload) => {
                let event = session.config().push.new_message_event.clone();
                channel.emit(&event, payload).await;
            }
            Step::Send { text, image, echo } => {
                if let Some(peer) = session.active().await {
                    let route = session.config().endpoints.send_path(&peer);
                    transport.queue_response(Method::Post, &route, echo);
                }
                let _ = session.send_message(Draft { text, image }).await;
            }
            Step::Fail { method, path } => {
                let method = parse_method(&method)
                    .with_context(|| format!("Step {}: unknown method {}", index, method))?;
                transport.fail_next(method, &path, "scripted failure");
            }
            Step::Reconnect => {
                channel = MockChannel::new();
                channels.push(channel.clone());
                session.set_channel(Some(Arc::new(channel.clone()))).await;
            }
            Step::Teardown => {
                session.teardown().await;
            }
        }
    }

    let acknowledged = transport
        .requests_with(Method::Put)
        .into_iter()
        .filter_map(|r| {
            r.path
                .strip_prefix(&ack_prefix)
                .map(|id| id.trim_start_matches('/').to_string())
        })
        .collect();

    Ok(ReplayReport {
        active: session.active().await,
        messages: session.messages().await,
        unseen: session.unseen_snapshot().await,
        acknowledged,
        max_handlers: channels.iter().map(MockChannel::max_handlers).max().unwrap_or(0),
        failures: reporter.failures(),
    })
}

fn parse_method(name: &str) -> Option<Method> {
    match name.to_ascii_uppercase().as_str() {
        "GET" => Some(Method::Get),
        "POST" => Some(Method::Post),
        "PUT" => Some(Method::Put),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(value: Value) -> Scenario {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn scenario_file_format() {
        let parsed = scenario(json!({
            "steps": [
                { "select": "A" },
                { "select": null },
                { "open": "B" },
                { "push": { "_id": "1", "senderId": "B" } },
                { "send": { "text": "x", "echo": {} } },
                { "fail": { "method": "put", "path": "/api/messages/mark/1" } },
                "reconnect",
                "teardown"
            ]
        }));
        assert_eq!(parsed.steps.len(), 8);
        assert!(matches!(parsed.steps[1], Step::Select(None)));
        assert!(matches!(parsed.steps[6], Step::Reconnect));
    }

    #[tokio::test]
    async fn replay_conversation() {
        let report = replay(
            ChatConfig::default(),
            scenario(json!({
                "roster": { "success": true, "users": [{ "_id": "A" }, { "_id": "B" }], "unseenMessages": { "B": 2 } },
                "histories": { "A": { "success": true, "messages": [{ "_id": "h1", "senderId": "A", "text": "old" }] } },
                "steps": [
                    { "open": "A" },
                    { "push": { "_id": "p1", "senderId": "A", "text": "new" } },
                    { "push": { "_id": "p2", "senderId": "B", "text": "elsewhere" } },
                    { "send": { "text": "reply", "echo": { "success": true, "newMessage": { "_id": "s1", "senderId": "me", "receiverId": "A", "text": "reply" } } } }
                ]
            })),
        )
        .await
        .unwrap();

        let ids: Vec<&str> = report.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "p1", "s1"]);
        assert_eq!(report.unseen.get(&PeerId::from("B")), Some(&3));
        assert_eq!(report.acknowledged, vec!["p1".to_string()]);
        assert_eq!(report.max_handlers, 1);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn replay_reconnect_and_teardown() {
        let report = replay(
            ChatConfig::default(),
            scenario(json!({
                "steps": [
                    { "select": "A" },
                    "reconnect",
                    { "push": { "_id": "1", "senderId": "A" } },
                    "teardown",
                    { "push": { "_id": "2", "senderId": "A" } }
                ]
            })),
        )
        .await
        .unwrap();

        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.max_handlers, 1);
    }

    #[tokio::test]
    async fn replay_collects_failures() {
        let report = replay(
            ChatConfig::default(),
            scenario(json!({
                "steps": [
                    { "send": { "text": "nobody to send to", "echo": {} } },
                    { "select": "A" },
                    { "fail": { "method": "PUT", "path": "/api/messages/mark/1" } },
                    { "push": { "_id": "1", "senderId": "A" } }
                ]
            })),
        )
        .await
        .unwrap();

        let operations: Vec<Operation> = report.failures.iter().map(|(op, _)| *op).collect();
        assert_eq!(
            operations,
            vec![Operation::SendMessage, Operation::AcknowledgeRead]
        );
        assert_eq!(report.messages.len(), 1);
    }

    #[tokio::test]
    async fn unknown_method_is_an_error() {
        let result = replay(
            ChatConfig::default(),
            scenario(json!({ "steps": [{ "fail": { "method": "PATCH", "path": "/x" } }] })),
        )
        .await;
        assert!(result.is_err());
    }
}
