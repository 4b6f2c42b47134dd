//! Configuration module for environment variable parsing.
//!
//! Configuration is read once at startup. The resulting [`Config`] is shared
//! read-only by every request task and is never mutated afterwards.

use std::env;
use std::time::Duration;

use ed25519_dalek::VerifyingKey;
use thiserror::Error;
use tracing::warn;

/// Default publish timeout for the sink transport.
pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 5;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DISCORD_PUBLIC_KEY environment variable is required")]
    MissingPublicKey,

    #[error("DISCORD_PUBLIC_KEY is not valid hex: {0}")]
    PublicKeyHex(#[from] hex::FromHexError),

    #[error("DISCORD_PUBLIC_KEY must decode to 32 bytes, got {0}")]
    PublicKeyLength(usize),

    #[error("DISCORD_PUBLIC_KEY is not a valid Ed25519 public key")]
    PublicKeyPoint,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Ed25519 key the platform signs interactions with
    pub public_key: VerifyingKey,

    /// Pub/Sub sink settings
    pub sink: SinkConfig,
}

/// Pub/Sub connection parameters. Every field is optional; the sink is only
/// used when project, topic and emulator host are all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Google Cloud project owning the topic
    pub project_id: Option<String>,

    /// Topic interactions are published to
    pub topic: Option<String>,

    /// `host:port` of a Pub/Sub emulator reached over plain HTTP
    pub emulator_host: Option<String>,

    /// Hard upper bound on a single publish call
    pub publish_timeout: Duration,
}

/// Resolved sink target, available only when the configuration is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkTarget<'a> {
    pub emulator_host: &'a str,
    pub project_id: &'a str,
    pub topic: &'a str,
}

impl SinkConfig {
    /// Return the publish target if project, topic and host are all set.
    pub fn target(&self) -> Option<SinkTarget<'_>> {
        match (&self.emulator_host, &self.project_id, &self.topic) {
            (Some(host), Some(project), Some(topic)) => Some(SinkTarget {
                emulator_host: host,
                project_id: project,
                topic,
            }),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.target().is_some()
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            topic: None,
            emulator_host: None,
            publish_timeout: Duration::from_secs(DEFAULT_PUBLISH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let public_key_hex = var("DISCORD_PUBLIC_KEY").ok_or(ConfigError::MissingPublicKey)?;
        let public_key = parse_public_key(&public_key_hex)?;

        let port = parse_or_default("PORT", var("PORT"), 8080);

        let publish_timeout_secs = parse_or_default(
            "PUBSUB_PUBLISH_TIMEOUT_SECS",
            var("PUBSUB_PUBLISH_TIMEOUT_SECS"),
            DEFAULT_PUBLISH_TIMEOUT_SECS,
        );

        Ok(Config {
            port,
            public_key,
            sink: SinkConfig {
                project_id: var("GOOGLE_CLOUD_PROJECT"),
                topic: var("PUBSUB_TOPIC"),
                emulator_host: var("PUBSUB_EMULATOR_HOST"),
                publish_timeout: Duration::from_secs(publish_timeout_secs),
            },
        })
    }
}

/// Decode a hex-encoded 32-byte Ed25519 public key.
pub fn parse_public_key(raw: &str) -> Result<VerifyingKey, ConfigError> {
    let bytes = hex::decode(raw)?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ConfigError::PublicKeyLength(bytes.len()))?;

    VerifyingKey::from_bytes(&bytes).map_err(|_| ConfigError::PublicKeyPoint)
}

fn parse_or_default<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::web::testkeys;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_minimal_config() {
        let key_hex = testkeys::public_key_hex();
        let config = Config::from_lookup(lookup(&[("DISCORD_PUBLIC_KEY", &key_hex)])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.public_key, testkeys::signing_key().verifying_key());
        assert_eq!(config.sink, SinkConfig::default());
        assert!(!config.sink.is_complete());
    }

    #[test]
    fn test_full_config() {
        let key_hex = testkeys::public_key_hex();
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_PUBLIC_KEY", &key_hex),
            ("PORT", "9090"),
            ("GOOGLE_CLOUD_PROJECT", "test-project"),
            ("PUBSUB_TOPIC", "interactions"),
            ("PUBSUB_EMULATOR_HOST", "localhost:8085"),
            ("PUBSUB_PUBLISH_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.sink.publish_timeout, Duration::from_secs(2));
        assert_eq!(
            config.sink.target(),
            Some(SinkTarget {
                emulator_host: "localhost:8085",
                project_id: "test-project",
                topic: "interactions",
            })
        );
    }

    #[test]
    fn test_invalid_port_uses_default() {
        let key_hex = testkeys::public_key_hex();
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_PUBLIC_KEY", &key_hex),
            ("PORT", "not-a-port"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_sink_values_are_unset() {
        let key_hex = testkeys::public_key_hex();
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_PUBLIC_KEY", &key_hex),
            ("GOOGLE_CLOUD_PROJECT", "test-project"),
            ("PUBSUB_TOPIC", "   "),
            ("PUBSUB_EMULATOR_HOST", "localhost:8085"),
        ]))
        .unwrap();

        assert_eq!(config.sink.topic, None);
        assert!(!config.sink.is_complete());
    }

    #[test]
    fn test_missing_public_key() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPublicKey));

        let err = Config::from_lookup(lookup(&[("DISCORD_PUBLIC_KEY", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPublicKey));
    }

    #[test]
    fn test_public_key_not_hex() {
        let err = parse_public_key("zz-not-hex").unwrap_err();
        assert!(matches!(err, ConfigError::PublicKeyHex(_)));
    }

    #[test]
    fn test_public_key_wrong_length() {
        let err = parse_public_key("abcd").unwrap_err();
        assert!(matches!(err, ConfigError::PublicKeyLength(2)));

        let too_long = "00".repeat(33);
        let err = parse_public_key(&too_long).unwrap_err();
        assert!(matches!(err, ConfigError::PublicKeyLength(33)));
    }
}
