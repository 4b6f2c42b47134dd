//! Interaction Relay - signed interaction webhook receiver.
//!
//! This library provides the modules behind the `relay-web` binary:
//! - `web`: signature verification, request handling and routing
//! - `interaction`: envelope parsing, dispatch and redaction
//! - `sink`: fire-and-forget publishing of redacted interactions
//!
//! ## Architecture
//!
//! ```text
//! Platform → Web Server → verify → parse → dispatch → response
//!                                              └→ redact → Pub/Sub (background)
//! ```

pub mod config;
pub mod interaction;
pub mod sink;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError, SinkConfig};
pub use interaction::{InteractionEnvelope, InteractionResponse, RedactedEnvelope};
pub use sink::{MessageSink, Publisher, PubsubRestSink, SinkError};
pub use web::AppState;
