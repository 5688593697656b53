//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered pool events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionFilter;
use crate::domain::{PoolEvent, PoolId};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<PoolEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut filter = SubscriptionFilter::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut filter);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(pool_event) => {
                        if filter.matches(pool_event.pool_id()) {
                            let msg = WsMessage {
                                id: uuid::Uuid::new_v4().to_string(),
                                msg_type: WsMessageType::Event,
                                timestamp: chrono::Utc::now(),
                                payload: serde_json::to_value(&pool_event).unwrap_or_default(),
                            };
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, filter: &mut SubscriptionFilter) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        let err = WsMessage {
            id: String::new(),
            msg_type: WsMessageType::Error,
            timestamp: chrono::Utc::now(),
            payload: serde_json::json!({
                "code": 400,
                "message": "malformed JSON"
            }),
        };
        return serde_json::to_string(&err).ok();
    };

    match serde_json::from_value::<WsCommand>(msg.payload.clone()) {
        Ok(WsCommand::Subscribe { pool_ids }) => {
            let (ids, wildcard) = parse_pool_ids(&pool_ids);
            filter.subscribe(&ids, wildcard);
            let response = WsMessage {
                id: msg.id,
                msg_type: WsMessageType::Response,
                timestamp: chrono::Utc::now(),
                payload: serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": filter.count(),
                    "wildcard": filter.is_all(),
                }),
            };
            serde_json::to_string(&response).ok()
        }
        Ok(WsCommand::Unsubscribe { pool_ids }) => {
            let (ids, _) = parse_pool_ids(&pool_ids);
            filter.unsubscribe(&ids);
            let response = WsMessage {
                id: msg.id,
                msg_type: WsMessageType::Response,
                timestamp: chrono::Utc::now(),
                payload: serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": filter.count(),
                }),
            };
            serde_json::to_string(&response).ok()
        }
        Err(_) => {
            let err = WsMessage {
                id: msg.id,
                msg_type: WsMessageType::Error,
                timestamp: chrono::Utc::now(),
                payload: serde_json::json!({
                    "code": 404,
                    "message": "unknown command"
                }),
            };
            serde_json::to_string(&err).ok()
        }
    }
}

/// Parses pool-id strings, treating `"*"` as the wildcard. Unparseable
/// entries are dropped.
fn parse_pool_ids(raw: &[String]) -> (Vec<PoolId>, bool) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    for entry in raw {
        if entry == "*" {
            wildcard = true;
        } else if let Ok(uuid) = entry.parse::<uuid::Uuid>() {
            ids.push(PoolId::from_uuid(uuid));
        }
    }
    (ids, wildcard)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn command_json(command: &str, pool_ids: &[String]) -> String {
        let msg = serde_json::json!({
            "id": "req-1",
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": {
                "command": command,
                "pool_ids": pool_ids,
            }
        });
        msg.to_string()
    }

    #[test]
    fn subscribe_command_narrows_filter() {
        let mut filter = SubscriptionFilter::new();
        let id = PoolId::new();
        let text = command_json("subscribe", &[id.to_string()]);

        let Some(response) = handle_text_message(&text, &mut filter) else {
            panic!("expected response");
        };
        let Ok(parsed) = serde_json::from_str::<WsMessage>(&response) else {
            panic!("malformed response");
        };
        assert_eq!(parsed.msg_type, WsMessageType::Response);
        assert!(filter.matches(id));
        assert!(!filter.matches(PoolId::new()));
    }

    #[test]
    fn wildcard_subscribe_keeps_everything() {
        let mut filter = SubscriptionFilter::new();
        let text = command_json("subscribe", &["*".to_string()]);
        let _ = handle_text_message(&text, &mut filter);
        assert!(filter.is_all());
        assert!(filter.matches(PoolId::new()));
    }

    #[test]
    fn malformed_json_yields_error_message() {
        let mut filter = SubscriptionFilter::new();
        let Some(response) = handle_text_message("not json", &mut filter) else {
            panic!("expected error response");
        };
        let Ok(parsed) = serde_json::from_str::<WsMessage>(&response) else {
            panic!("malformed response");
        };
        assert_eq!(parsed.msg_type, WsMessageType::Error);
    }

    #[test]
    fn unknown_command_yields_error_message() {
        let mut filter = SubscriptionFilter::new();
        let text = serde_json::json!({
            "id": "req-2",
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": { "command": "launch" }
        })
        .to_string();
        let Some(response) = handle_text_message(&text, &mut filter) else {
            panic!("expected error response");
        };
        let Ok(parsed) = serde_json::from_str::<WsMessage>(&response) else {
            panic!("malformed response");
        };
        assert_eq!(parsed.msg_type, WsMessageType::Error);
    }
}
