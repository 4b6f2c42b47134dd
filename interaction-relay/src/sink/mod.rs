//! Sink module for forwarding interactions to Pub/Sub.
//!
//! This module provides:
//! - Message types and attribute derivation
//! - A pluggable transport trait with a Pub/Sub REST implementation
//! - A fire-and-forget publisher used by the request path
//!
//! ## Architecture
//!
//! ```text
//! Request handler → Publisher::spawn → (background) redact → MessageSink → Pub/Sub
//! ```

pub mod publisher;
pub mod transport;
pub mod types;

pub use publisher::Publisher;
pub use transport::{MessageSink, PubsubRestSink};
pub use types::{PublishAttempt, PublishRequest, PubsubMessage, SinkError};
