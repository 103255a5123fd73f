//! # REST API
//!
//! HTTP endpoints of the relay.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, FailureResponse};
pub use routes::{cors_layer, create_router};
