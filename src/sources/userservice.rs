use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::WatchlistDirectory;

/// Client for the user service's internal watchlist directory.
pub struct UserServiceClient {
    client: Client,
    base_url: String,
}

impl UserServiceClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent("Augur/1.0 (Stock Forecast Service)")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }
}

#[async_trait]
impl WatchlistDirectory for UserServiceClient {
    async fn users_watching(&self, symbol: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/internal/watchlist/users/{}",
            self.base_url,
            symbol.to_uppercase()
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "watchlist lookup returned {} for {}",
                response.status(),
                symbol
            )));
        }

        let user_ids: Vec<String> = response.json().await?;
        debug!("Found {} users watching {}", user_ids.len(), symbol);
        Ok(user_ids)
    }
}
