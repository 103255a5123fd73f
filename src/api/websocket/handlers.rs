//! # WebSocket Handlers
//!
//! Real-time channel relaying contract events to connected clients.
//!
//! Each connection registers with the [`SubscriberRegistry`] on upgrade and
//! unregisters when it closes. Every event the bridge broadcasts is sent as
//! one text frame.
//!
//! # Message Format
//!
//! ```json
//! {
//!   "type": "event",
//!   "event": "EtherTransfer",
//!   "payload": { ... raw log ... }
//! }
//! ```
//!
//! The payload is written exactly as the provider delivered it. Text frames
//! from the client are ignored.

use crate::application::services::{SubscriberRegistry, Subscription};
use crate::domain::events::ChainEvent;
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use serde_json::value::RawValue;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

// ============================================================================
// Application State
// ============================================================================

/// Shared state for WebSocket connections.
#[derive(Debug, Clone, Default)]
pub struct WebSocketState {
    /// Subscribers receiving relayed events.
    pub registry: SubscriberRegistry,
}

impl WebSocketState {
    /// Creates a state over an existing registry.
    #[must_use]
    pub fn new(registry: SubscriberRegistry) -> Self {
        Self { registry }
    }
}

// ============================================================================
// WebSocket Messages
// ============================================================================

/// Message type for WebSocket communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Event notification.
    Event,
}

/// Outgoing WebSocket message.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage<'a> {
    /// Message type.
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    /// Event name.
    pub event: &'a str,
    /// Raw event payload.
    pub payload: &'a RawValue,
}

impl<'a> OutgoingMessage<'a> {
    /// Creates an event message borrowing from the chain event.
    #[must_use]
    pub fn event(event: &'a ChainEvent) -> Self {
        Self {
            msg_type: MessageType::Event,
            event: event.name(),
            payload: event.payload(),
        }
    }
}

// ============================================================================
// WebSocket Handler
// ============================================================================

/// WebSocket upgrade handler.
#[instrument(skip(state, ws))]
pub async fn ws_handler(
    State(state): State<Arc<WebSocketState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    debug!("WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WebSocketState>) {
    let subscription = state.registry.register().await;
    let subscriber_id = subscription.id();
    let active = state.registry.len().await;
    info!(subscriber_id = %subscriber_id, active, "WebSocket connected");

    let (sender, mut receiver) = socket.split();
    let mut send_task = tokio::spawn(forward_events(subscription, sender));

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(_))) | Some(Ok(Message::Binary(_))) => {
                    debug!(subscriber_id = %subscriber_id, "Ignoring client frame");
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    error!(subscriber_id = %subscriber_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    state.registry.unregister(subscriber_id).await;
    let active = state.registry.len().await;
    info!(subscriber_id = %subscriber_id, active, "WebSocket disconnected");
}

/// Writes every event received by the subscription to the socket.
async fn forward_events<S>(mut subscription: Subscription, mut sender: S)
where
    S: Sink<Message> + Unpin,
{
    while let Some(event) = subscription.recv().await {
        let json = match serde_json::to_string(&OutgoingMessage::event(&event)) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to encode event frame");
                continue;
            }
        };
        if sender.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Creates the WebSocket router.
pub fn create_ws_router(state: Arc<WebSocketState>) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn socket_task_is_send() {
        fn assert_send<F: std::future::Future + Send>(_: F) {}
        let _ = |socket: WebSocket, state: Arc<WebSocketState>| {
            assert_send(handle_socket(socket, state));
        };
    }

    #[test]
    fn event_frame_embeds_payload_verbatim() {
        let raw = r#"{"address":"0x1de0","topics":["0xaa"],  "data":"0x"}"#;
        let event = ChainEvent::from_json("EtherTransfer", raw).unwrap();
        let json = serde_json::to_string(&OutgoingMessage::event(&event)).unwrap();

        assert_eq!(
            json,
            format!(r#"{{"type":"event","event":"EtherTransfer","payload":{raw}}}"#)
        );
    }

    #[tokio::test]
    async fn forward_events_writes_text_frames() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.register().await;
        let id = subscription.id();
        let (sink, mut frames) = futures::channel::mpsc::unbounded::<Message>();

        let task = tokio::spawn(forward_events(subscription, sink));
        registry
            .broadcast(ChainEvent::from_json("EtherTransfer", r#"{"n":1}"#).unwrap())
            .await;

        let Message::Text(text) = frames.next().await.unwrap() else {
            panic!("expected text frame");
        };
        assert_eq!(
            text.as_str(),
            r#"{"type":"event","event":"EtherTransfer","payload":{"n":1}}"#
        );

        registry.unregister(id).await;
        task.await.unwrap();
    }
}
