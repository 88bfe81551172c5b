//! Webhook listener

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::events::{DeployEvent, EventHandler, HookError};
use crate::http::client::HttpClient;

/// Posts the event payload as JSON to a URL.
///
/// A non-2xx answer is an error carrying the hook's status code, so a hook
/// refusing `deploy.start` decides the status the caller sees.
pub struct WebhookHandler {
    url: String,
    client: Arc<HttpClient>,
}

impl WebhookHandler {
    pub fn new(url: impl Into<String>, client: Arc<HttpClient>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl EventHandler for WebhookHandler {
    fn name(&self) -> &str {
        &self.url
    }

    async fn on_event(&self, event: &DeployEvent) -> Result<(), HookError> {
        let status = self
            .client
            .post_json(&self.url, &event.payload())
            .await
            .map_err(|e| HookError::new(format!("webhook {} unreachable: {}", self.url, e)))?;

        if !status.is_success() {
            let message = format!("webhook {} rejected {}: {}", self.url, event.kind, status);
            // Only error codes are passed through as the deployment status
            if status.is_client_error() || status.is_server_error() {
                return Err(HookError::with_status(status, message));
            }
            return Err(HookError::new(message));
        }

        debug!("Webhook {} accepted {}", self.url, event.kind);
        Ok(())
    }
}
