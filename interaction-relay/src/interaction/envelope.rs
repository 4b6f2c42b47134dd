//! Interaction envelope parsing.
//!
//! The body is untrusted JSON. Parsing only checks what routing needs: a
//! top-level object with an integer `type`. All other fields are kept as-is
//! until redaction.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Interaction type tags sent by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
}

impl InteractionType {
    pub const PING: i64 = 1;
    pub const APPLICATION_COMMAND: i64 = 2;

    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            Self::PING => Some(Self::Ping),
            Self::APPLICATION_COMMAND => Some(Self::ApplicationCommand),
            _ => None,
        }
    }
}

/// Interaction response type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Pong,
    DeferredChannelMessage,
}

impl ResponseType {
    pub fn tag(self) -> u8 {
        match self {
            ResponseType::Pong => 1,
            ResponseType::DeferredChannelMessage => 5,
        }
    }
}

/// Synchronous interaction response body, e.g. `{"type":1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
}

impl From<ResponseType> for InteractionResponse {
    fn from(kind: ResponseType) -> Self {
        Self { kind: kind.tag() }
    }
}

/// Reasons a body cannot be turned into an [`InteractionEnvelope`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("top-level JSON value is not an object")]
    InvalidShape,

    #[error("`type` is missing or not an integer")]
    MissingType,
}

/// A parsed, un-redacted interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEnvelope {
    kind: i64,
    fields: Map<String, Value>,
}

impl InteractionEnvelope {
    /// The raw `type` tag. Not necessarily a known [`InteractionType`].
    pub fn kind(&self) -> i64 {
        self.kind
    }

    pub fn interaction_type(&self) -> Option<InteractionType> {
        InteractionType::from_tag(self.kind)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Parse a raw request body into an interaction envelope.
pub fn parse_envelope(body: &[u8]) -> Result<InteractionEnvelope, ParseError> {
    let value: Value = serde_json::from_slice(body)?;

    let Value::Object(fields) = value else {
        return Err(ParseError::InvalidShape);
    };

    let kind = fields
        .get("type")
        .and_then(Value::as_i64)
        .ok_or(ParseError::MissingType)?;

    Ok(InteractionEnvelope { kind, fields })
}
