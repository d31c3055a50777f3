use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::services::NotificationGateway;
use crate::types::NotificationPayload;

/// Client for the notification gateway's prophet endpoint.
///
/// No timeout on the client itself; the fan-out wraps each dispatch
/// with its own independent timeout.
pub struct NotificationServiceClient {
    client: Client,
    base_url: String,
}

impl NotificationServiceClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent("Augur/1.0 (Stock Forecast Service)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }
}

#[async_trait]
impl NotificationGateway for NotificationServiceClient {
    async fn send_prophet_alert(&self, payload: &NotificationPayload) -> Result<()> {
        let url = format!("{}/api/internal/notifications/ai/prophet", self.base_url);

        let response = self.client.post(&url).json(payload).send().await?;

        // 200 and 201 both count as delivered.
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AppError::ExternalApi(format!(
                "notification gateway returned {} for user {}",
                response.status(),
                payload.user_id
            )))
        }
    }
}
