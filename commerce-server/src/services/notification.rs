//! Notification Service adapter
//!
//! The core only emits one event: a session went live. Fan-out to the host's
//! followers is the notification service's job; we hand it the event over a
//! webhook and move on. Delivery is best-effort — a failed notification never
//! fails the state transition that produced it.

use async_trait::async_trait;
use serde_json::json;
use shared::models::LiveSession;
use std::sync::Arc;
use std::time::Duration;

use crate::core::Config;

/// Outbound notification seam
#[async_trait]
pub trait StreamNotifier: Send + Sync {
    /// A session moved to LIVE; notify the host's followers
    async fn stream_started(&self, session: &LiveSession);
}

/// Posts StreamStarted events to the configured notification webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl StreamNotifier for WebhookNotifier {
    async fn stream_started(&self, session: &LiveSession) {
        let payload = json!({
            "event": "STREAM_STARTED",
            "session_id": session.id,
            "host_id": session.host_id,
            "title": session.title,
            "room_id": session.room_id,
            "started_at": session.started_at,
        });

        match self.client.post(&self.url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(target: "notification", session_id = session.id, "Stream-started notification delivered");
            }
            Ok(resp) => {
                tracing::warn!(target: "notification", session_id = session.id, status = %resp.status(), "Notification service rejected stream-started event");
            }
            Err(e) => {
                tracing::warn!(target: "notification", session_id = session.id, error = %e, "Failed to deliver stream-started notification");
            }
        }
    }
}

/// Used when no webhook is configured (development, tests)
pub struct NoopNotifier;

#[async_trait]
impl StreamNotifier for NoopNotifier {
    async fn stream_started(&self, session: &LiveSession) {
        tracing::debug!(target: "notification", session_id = session.id, "No notifier configured, dropping stream-started event");
    }
}

/// Build the notifier the config asks for
pub fn from_config(config: &Config) -> Arc<dyn StreamNotifier> {
    match &config.notify_webhook_url {
        Some(url) => match WebhookNotifier::new(url) {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build webhook notifier, notifications disabled");
                Arc::new(NoopNotifier)
            }
        },
        None => Arc::new(NoopNotifier),
    }
}
