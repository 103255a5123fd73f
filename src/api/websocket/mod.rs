//! # WebSocket API
//!
//! Real-time channel for relayed contract events.
//!
//! # Endpoint
//!
//! - `GET /ws` - WebSocket connection endpoint
//!
//! # Usage
//!
//! ```ignore
//! use ether_relay::api::websocket::{create_ws_router, WebSocketState};
//! use std::sync::Arc;
//!
//! let ws_state = Arc::new(WebSocketState::new(registry.clone()));
//! let ws_router = create_ws_router(ws_state);
//! ```

pub mod handlers;

pub use handlers::{MessageType, OutgoingMessage, WebSocketState, create_ws_router};
