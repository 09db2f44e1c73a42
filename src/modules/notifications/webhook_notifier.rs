use std::time::Duration;

use crate::core::error::{AppError, Result};
use crate::modules::notifications::{Notifier, TicketEvent};

/// Posts every event as JSON to a webhook from a spawned task
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, event: TicketEvent) {
        let client = self.client.clone();
        let url = self.url.clone();

        tokio::spawn(async move {
            let result = client
                .post(&url)
                .json(&event)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match result {
                Ok(_) => tracing::debug!(
                    "Delivered {:?} event for ticket {}",
                    event.kind,
                    event.ticket_number
                ),
                Err(e) => tracing::warn!(
                    "Failed to deliver {:?} event for ticket {}: {}",
                    event.kind,
                    event.ticket_number,
                    e
                ),
            }
        });
    }
}
