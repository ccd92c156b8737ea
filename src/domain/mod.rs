//! # Domain Layer
//!
//! Chat models, the bot persona, system prompt construction and origin rules.
//! This layer is independent of the HTTP server and the completion provider.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
