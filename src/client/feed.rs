//! # Event Feed
//!
//! Real-time contract events as seen by the transaction view.
//!
//! [`EventFeed`] reads the relay's `/ws` channel. A registry
//! [`Subscription`] also works as an inbox for in-process views.

use super::error::{ClientError, ClientResult};
use crate::application::services::Subscription;
use crate::domain::events::ChainEvent;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// A source of received events the view drains.
pub trait EventInbox: Send + fmt::Debug {
    /// Returns the next queued event without waiting.
    fn try_next(&mut self) -> Option<ChainEvent>;
}

impl EventInbox for Subscription {
    fn try_next(&mut self) -> Option<ChainEvent> {
        self.try_recv().map(Arc::unwrap_or_clone)
    }
}

#[derive(Debug, Deserialize)]
struct EventFrame<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    event: String,
    #[serde(borrow)]
    payload: &'a RawValue,
}

/// Decodes an event frame, keeping the payload bytes as sent.
///
/// Returns `None` for frames that are not events.
#[must_use]
pub fn decode_frame(text: &str) -> Option<ChainEvent> {
    let frame: EventFrame<'_> = serde_json::from_str(text).ok()?;
    if frame.kind != "event" {
        return None;
    }
    ChainEvent::from_json(frame.event, frame.payload.get()).ok()
}

/// Derives the WebSocket endpoint from a relay base URL.
#[must_use]
pub fn ws_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/ws")
}

/// Connection to the relay's event channel.
pub struct EventFeed {
    events: mpsc::UnboundedReceiver<ChainEvent>,
    reader: JoinHandle<()>,
}

impl EventFeed {
    /// Connects to `<base_url>/ws` and starts reading frames.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Relay` if the handshake fails.
    pub async fn connect(base_url: &str) -> ClientResult<Self> {
        let url = ws_url(base_url);
        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::relay(format!("event channel {url}: {e}")))?;
        info!(%url, "Event feed connected");

        let (tx, events) = mpsc::unbounded_channel();
        let reader = tokio::spawn(async move {
            let (_sink, mut frames) = socket.split();
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(Message::Text(text)) => match decode_frame(text.as_str()) {
                        Some(event) => {
                            if tx.send(event).is_err() {
                                break;
                            }
                        }
                        None => debug!("Ignoring non-event frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Event feed error");
                        break;
                    }
                }
            }
            info!("Event feed closed");
        });

        Ok(Self { events, reader })
    }

    /// Waits for the next event. Returns `None` once the channel closed.
    pub async fn recv(&mut self) -> Option<ChainEvent> {
        self.events.recv().await
    }

    /// Closes the connection.
    pub fn close(&self) {
        self.reader.abort();
    }
}

impl EventInbox for EventFeed {
    fn try_next(&mut self) -> Option<ChainEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for EventFeed {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl fmt::Debug for EventFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFeed")
            .field("closed", &self.reader.is_finished())
            .finish()
    }
}
