//! # API Middleware
//!
//! Cross-cutting concerns for API requests.

pub mod logging;
