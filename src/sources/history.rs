use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::BarSource;
use crate::types::RawBar;

/// Client for the historical bar service.
pub struct HistoryClient {
    client: Client,
    base_url: String,
}

impl HistoryClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent("Augur/1.0 (Stock Forecast Service)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }
}

#[async_trait]
impl BarSource for HistoryClient {
    async fn fetch_bars(&self, symbol: &str, days: u32) -> Result<Vec<RawBar>> {
        let url = format!(
            "{}/api/internal/history/{}",
            self.base_url,
            symbol.to_uppercase()
        );

        let response = self
            .client
            .get(&url)
            .query(&[("days", days)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "history service returned {} for {}",
                response.status(),
                symbol
            )));
        }

        let bars: Vec<RawBar> = response.json().await?;
        debug!("Fetched {} bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}
