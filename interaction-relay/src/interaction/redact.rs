//! Interaction redaction.
//!
//! Only allow-listed fields survive. `token` is a short-lived credential for
//! responding to the interaction and must never leave this service, so it is
//! absent from the allow-list along with every unknown field.

use serde::Serialize;
use serde_json::{Map, Value};

use super::envelope::InteractionEnvelope;

/// Fields copied from an interaction into its redacted form.
pub const ALLOWED_FIELDS: [&str; 10] = [
    "type",
    "id",
    "application_id",
    "data",
    "guild_id",
    "channel_id",
    "member",
    "user",
    "locale",
    "guild_locale",
];

/// An interaction restricted to [`ALLOWED_FIELDS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RedactedEnvelope(Map<String, Value>);

impl RedactedEnvelope {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A field's value when it is a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Project an interaction onto the allow-listed fields.
pub fn redact(envelope: &InteractionEnvelope) -> RedactedEnvelope {
    let source = envelope.fields();
    let fields = ALLOWED_FIELDS
        .iter()
        .filter_map(|&name| source.get(name).map(|value| (name.to_string(), value.clone())))
        .collect();

    RedactedEnvelope(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::envelope::parse_envelope;
    use serde_json::json;

    fn envelope(value: Value) -> InteractionEnvelope {
        parse_envelope(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_redact_drops_token() {
        let inputs = [
            json!({"type": 2, "token": "secret-token"}),
            json!({"type": 2, "id": "1", "token": ""}),
            json!({"type": 2, "token": null}),
            json!({"type": 2, "token": {"nested": "secret"}}),
            json!({
                "type": 2,
                "id": "123",
                "application_id": "456",
                "token": "secret-token",
                "data": {"name": "hello", "token": "kept-inside-data"},
                "guild_id": "789",
                "channel_id": "012",
            }),
        ];

        for input in inputs {
            let redacted = redact(&envelope(input.clone()));
            assert!(!redacted.contains("token"), "token leaked from {input}");

            let json = serde_json::to_value(&redacted).unwrap();
            assert!(json.get("token").is_none());
        }
    }

    #[test]
    fn test_redact_drops_unknown_fields() {
        let redacted = redact(&envelope(json!({
            "type": 2,
            "id": "123",
            "version": 1,
            "app_permissions": "0",
            "entitlements": [],
        })));

        assert_eq!(redacted.fields().len(), 2);
        assert_eq!(redacted.get_str("id"), Some("123"));
        assert!(!redacted.contains("version"));
        assert!(!redacted.contains("app_permissions"));
    }

    #[test]
    fn test_redact_allow_listed_fields_are_identical() {
        let input = json!({
            "type": 2,
            "id": "123",
            "application_id": "456",
            "data": {"id": "cmd", "name": "hello", "options": [{"name": "a", "value": 1}]},
            "guild_id": "789",
            "channel_id": "012",
            "member": {"user": {"id": "u1"}, "roles": ["r1"]},
            "user": {"id": "u1", "username": "someone"},
            "locale": "en-US",
            "guild_locale": "en-GB",
        });

        let redacted = redact(&envelope(input.clone()));
        assert_eq!(serde_json::to_value(&redacted).unwrap(), input);
    }

    #[test]
    fn test_redact_absent_fields_stay_absent() {
        let redacted = redact(&envelope(json!({"type": 1})));
        assert_eq!(serde_json::to_value(&redacted).unwrap(), json!({"type": 1}));
    }

    #[test]
    fn test_redact_preserves_null_values() {
        let redacted = redact(&envelope(json!({"type": 2, "guild_id": null})));
        assert_eq!(redacted.get("guild_id"), Some(&Value::Null));
        assert_eq!(redacted.get_str("guild_id"), None);
    }
}
