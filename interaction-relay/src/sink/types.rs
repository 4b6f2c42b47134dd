//! Sink message types.
//!
//! A [`PublishAttempt`] is derived entirely from a redacted interaction plus
//! the publish time. The Pub/Sub REST body wraps one attempt in a
//! `messages` array.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::interaction::RedactedEnvelope;

/// Failures while encoding or delivering a message.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid sink endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sink responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("publish timed out after {0:?}")]
    Timeout(Duration),
}

/// One message ready for the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAttempt {
    pub topic: String,
    /// Standard base64 of the compact JSON redacted interaction.
    pub data: String,
    pub attributes: BTreeMap<String, String>,
}

impl PublishAttempt {
    /// Build an attempt for `topic` from a redacted interaction.
    pub fn new(
        topic: &str,
        redacted: &RedactedEnvelope,
        published_at: DateTime<Utc>,
    ) -> Result<Self, SinkError> {
        let json = serde_json::to_vec(redacted)?;

        Ok(Self {
            topic: topic.to_string(),
            data: BASE64.encode(json),
            attributes: attributes(redacted, published_at),
        })
    }

    #[cfg(test)]
    pub fn decode_payload(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        let bytes = BASE64.decode(&self.data).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Derive message attributes. String-valued ids are copied when present;
/// `interaction_type` and `timestamp` are always set.
fn attributes(redacted: &RedactedEnvelope, published_at: DateTime<Utc>) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();

    for (field, attribute) in [
        ("id", "interaction_id"),
        ("application_id", "application_id"),
        ("guild_id", "guild_id"),
        ("channel_id", "channel_id"),
    ] {
        if let Some(value) = redacted.get_str(field) {
            attributes.insert(attribute.to_string(), value.to_string());
        }
    }

    if let Some(kind) = redacted.get("type").and_then(|v| v.as_i64()) {
        attributes.insert("interaction_type".to_string(), kind.to_string());
    }

    if let Some(name) = redacted
        .get("data")
        .and_then(|data| data.get("name"))
        .and_then(|name| name.as_str())
    {
        attributes.insert("command_name".to_string(), name.to_string());
    }

    attributes.insert(
        "timestamp".to_string(),
        published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    );

    attributes
}

/// Pub/Sub REST `topics.publish` request body.
#[derive(Debug, Serialize)]
pub struct PublishRequest<'a> {
    pub messages: [PubsubMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct PubsubMessage<'a> {
    pub data: &'a str,
    pub attributes: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a PublishAttempt> for PublishRequest<'a> {
    fn from(attempt: &'a PublishAttempt) -> Self {
        Self {
            messages: [PubsubMessage {
                data: &attempt.data,
                attributes: &attempt.attributes,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{parse_envelope, redact};
    use chrono::TimeZone;
    use serde_json::json;

    fn redacted(value: serde_json::Value) -> RedactedEnvelope {
        redact(&parse_envelope(value.to_string().as_bytes()).unwrap())
    }

    fn published_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_attempt_attributes() {
        let redacted = redacted(json!({
            "type": 2,
            "id": "123",
            "application_id": "456",
            "guild_id": "789",
            "channel_id": "012",
            "token": "secret",
            "data": {"name": "hello"},
        }));

        let attempt = PublishAttempt::new("interactions", &redacted, published_at()).unwrap();
        let expected: BTreeMap<String, String> = [
            ("interaction_id", "123"),
            ("interaction_type", "2"),
            ("application_id", "456"),
            ("guild_id", "789"),
            ("channel_id", "012"),
            ("command_name", "hello"),
            ("timestamp", "2024-01-02T03:04:05Z"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(attempt.topic, "interactions");
        assert_eq!(attempt.attributes, expected);
    }

    #[test]
    fn test_attempt_attributes_skip_missing_fields() {
        let redacted = redacted(json!({"type": 2, "data": {"id": "cmd"}, "guild_id": 5}));
        let attempt = PublishAttempt::new("t", &redacted, published_at()).unwrap();

        let keys: Vec<&str> = attempt.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["interaction_type", "timestamp"]);
    }

    #[test]
    fn test_attempt_data_is_compact_base64_json() {
        let redacted = redacted(json!({"type": 2, "id": "1", "token": "secret"}));
        let attempt = PublishAttempt::new("t", &redacted, published_at()).unwrap();

        let raw = String::from_utf8(BASE64.decode(&attempt.data).unwrap()).unwrap();
        assert!(!raw.contains(' '));
        assert!(!raw.contains("token"));

        let payload: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(payload, json!({"type": 2, "id": "1"}));
    }

    #[test]
    fn test_publish_request_shape() {
        let redacted = redacted(json!({"type": 2, "id": "1"}));
        let attempt = PublishAttempt::new("t", &redacted, published_at()).unwrap();

        let body = serde_json::to_value(PublishRequest::from(&attempt)).unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [{
                    "data": attempt.data,
                    "attributes": {
                        "interaction_id": "1",
                        "interaction_type": "2",
                        "timestamp": "2024-01-02T03:04:05Z",
                    },
                }]
            })
        );
    }
}
