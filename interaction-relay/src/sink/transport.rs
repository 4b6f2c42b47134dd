//! Sink transports.
//!
//! [`MessageSink`] is the seam the publisher talks to. The production
//! implementation speaks the Pub/Sub REST API to an emulator over plain HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};
use url::Url;

use super::types::{PublishAttempt, PublishRequest, SinkError};
use crate::config::SinkTarget;

/// A destination that accepts one message per call.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver a single message, succeeding only on a 2xx-equivalent ack.
    async fn publish(&self, attempt: &PublishAttempt) -> Result<(), SinkError>;

    /// Transport name for logging (e.g. "pubsub_rest")
    fn name(&self) -> &str;
}

/// Pub/Sub REST client targeting `http://{host}/v1/projects/{project}/topics/...`.
#[derive(Clone)]
pub struct PubsubRestSink {
    client: Client,
    base_url: Url,
    project_id: String,
    timeout: Duration,
}

impl PubsubRestSink {
    pub fn new(
        client: Client,
        emulator_host: &str,
        project_id: &str,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let base_url = Url::parse(&format!("http://{}/", emulator_host))?;

        Ok(Self {
            client,
            base_url,
            project_id: project_id.to_string(),
            timeout,
        })
    }

    /// Build a sink from a complete target.
    pub fn from_target(client: Client, target: SinkTarget<'_>, timeout: Duration) -> Result<Self, SinkError> {
        Self::new(client, target.emulator_host, target.project_id, timeout)
    }

    /// `.../v1/projects/{project}/topics/{topic}` plus an optional `:verb`.
    pub fn topic_url(&self, topic: &str, verb: Option<&str>) -> Result<Url, SinkError> {
        let last = match verb {
            Some(verb) => format!("{}:{}", topic, verb),
            None => topic.to_string(),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SinkError::Endpoint(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["v1", "projects", self.project_id.as_str(), "topics", last.as_str()]);

        Ok(url)
    }

    /// Create the topic if it does not exist yet.
    ///
    /// An emulator starts empty, so publishes fail until the topic is
    /// created. HTTP 409 means the topic is already there.
    pub async fn ensure_topic(&self, topic: &str) -> Result<(), SinkError> {
        let url = self.topic_url(topic, None)?;

        let resp = self
            .client
            .put(url)
            .timeout(self.timeout)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => {
                info!(topic = topic, "pubsub_topic_created");
                Ok(())
            }
            StatusCode::CONFLICT => {
                info!(topic = topic, "pubsub_topic_exists");
                Ok(())
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                warn!(topic = topic, status_code = status.as_u16(), "pubsub_topic_create_failed");
                Err(SinkError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl MessageSink for PubsubRestSink {
    async fn publish(&self, attempt: &PublishAttempt) -> Result<(), SinkError> {
        let url = self.topic_url(&attempt.topic, Some("publish"))?;

        let resp = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&PublishRequest::from(attempt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout(self.timeout)
                } else {
                    SinkError::Transport(e)
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(SinkError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &str {
        "pubsub_rest"
    }
}
