//! Interaction routing.
//!
//! Maps the interaction type to the synchronous response. Application
//! commands are also handed to the publisher, which forwards them in the
//! background; the response never waits on it.

use thiserror::Error;
use tracing::{info, warn};

use super::envelope::{InteractionEnvelope, InteractionResponse, InteractionType, ResponseType};
use crate::sink::Publisher;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unsupported interaction type {0}")]
    UnsupportedType(i64),
}

/// Select the response for an interaction, scheduling a publish if needed.
pub fn dispatch(
    envelope: InteractionEnvelope,
    publisher: &Publisher,
) -> Result<InteractionResponse, DispatchError> {
    match envelope.interaction_type() {
        Some(InteractionType::Ping) => {
            info!("interaction_ping");
            Ok(ResponseType::Pong.into())
        }
        Some(InteractionType::ApplicationCommand) => {
            info!(publisher_enabled = publisher.is_enabled(), "interaction_application_command");
            publisher.spawn(envelope);
            Ok(ResponseType::DeferredChannelMessage.into())
        }
        None => {
            warn!(interaction_type = envelope.kind(), "interaction_type_unsupported");
            Err(DispatchError::UnsupportedType(envelope.kind()))
        }
    }
}
