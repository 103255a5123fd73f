//! # API Layer
//!
//! External interfaces of the relay.
//!
//! ## Protocols
//!
//! - **REST**: liveness and the `POST /sendEther` relay endpoint
//! - **WebSocket**: real-time contract events
//!
//! ## Middleware
//!
//! - Request logging with request ids
//! - CORS restricted to one origin

pub mod middleware;
pub mod rest;
#[cfg(test)]
mod tests;
pub mod websocket;
