//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion providers (Groq over HTTP, scripted mock)
//! - HTTP API (axum router, chat controller, data stream framing)

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
