//! Fire-and-forget interaction publisher.
//!
//! The request path calls [`Publisher::spawn`] and returns immediately. The
//! spawned task redacts, encodes and publishes once; failures are logged and
//! dropped. There is no retry, no queue and no join handle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use super::transport::MessageSink;
use super::types::{PublishAttempt, SinkError};
use crate::interaction::{redact, InteractionEnvelope, RedactedEnvelope};

/// Cloneable handle shared by every request task.
#[derive(Clone)]
pub struct Publisher {
    inner: Option<Arc<PublisherInner>>,
}

struct PublisherInner {
    sink: Arc<dyn MessageSink>,
    topic: String,
    timeout: Duration,
}

impl Publisher {
    /// Create a publisher sending to `topic` through `sink`.
    pub fn new(sink: Arc<dyn MessageSink>, topic: impl Into<String>, timeout: Duration) -> Self {
        Self {
            inner: Some(Arc::new(PublisherInner {
                sink,
                topic: topic.into(),
                timeout,
            })),
        }
    }

    /// A publisher for an unconfigured sink. Every call is a no-op.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Redact and publish `envelope` on a detached background task.
    ///
    /// Does nothing when the publisher is disabled.
    pub fn spawn(&self, envelope: InteractionEnvelope) {
        if !self.is_enabled() {
            return;
        }

        let publisher = self.clone();
        tokio::spawn(async move {
            let redacted = redact(&envelope);
            // Failures are already logged inside publish.
            let _ = publisher.publish(&redacted).await;
        });
    }

    /// Publish a redacted interaction, bounded by the configured timeout.
    pub async fn publish(&self, redacted: &RedactedEnvelope) -> Result<(), SinkError> {
        match &self.inner {
            Some(inner) => inner.publish(redacted).await,
            None => Ok(()),
        }
    }
}

impl PublisherInner {
    async fn publish(&self, redacted: &RedactedEnvelope) -> Result<(), SinkError> {
        let result = match PublishAttempt::new(&self.topic, redacted, Utc::now()) {
            Ok(attempt) => self.send(&attempt).await,
            Err(e) => Err(e),
        };

        let interaction_id = redacted.get_str("id").unwrap_or_default();
        match &result {
            Ok(()) => info!(
                sink = self.sink.name(),
                topic = %self.topic,
                interaction_id = %interaction_id,
                "pubsub_publish_succeeded"
            ),
            Err(e) => error!(
                sink = self.sink.name(),
                topic = %self.topic,
                interaction_id = %interaction_id,
                error = %e,
                "pubsub_publish_failed"
            ),
        }

        result
    }

    async fn send(&self, attempt: &PublishAttempt) -> Result<(), SinkError> {
        match tokio::time::timeout(self.timeout, self.sink.publish(attempt)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout(self.timeout)),
        }
    }
}
