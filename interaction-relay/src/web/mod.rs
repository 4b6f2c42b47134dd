//! Web server module for handling signed interaction callbacks.
//!
//! This module provides a thin, fast web server that:
//! - Verifies the Ed25519 signature on every interaction
//! - Answers pings and defers application commands synchronously
//! - Hands application commands to the publisher without waiting on it
//!
//! The platform enforces a short response deadline, so nothing on the
//! request path depends on the sink.

pub mod handlers;
pub mod router;
pub mod signature;

#[cfg(test)]
pub(crate) mod testkeys;

pub use handlers::{
    health, interaction_webhook, AppState, ErrorResponse, HealthResponse, RejectReason,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use signature::{verify_signature, verify_signature_at, MAX_TIMESTAMP_AGE_SECS};
