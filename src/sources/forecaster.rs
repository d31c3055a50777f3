use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::services::Forecaster;
use crate::types::{ForecastPoint, ForecastRequest};

/// Client for the external time-series forecaster.
///
/// The fit can block on computation for a while, so this client
/// carries its own request timeout, separate from the notification
/// fan-out timeouts.
pub struct ForecasterClient {
    client: Client,
    base_url: String,
}

impl ForecasterClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Augur/1.0 (Stock Forecast Service)")
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }
}

#[async_trait]
impl Forecaster for ForecasterClient {
    async fn forecast(&self, request: &ForecastRequest) -> Result<Vec<ForecastPoint>> {
        let url = format!("{}/forecast", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "forecaster returned {}",
                response.status()
            )));
        }

        let points: Vec<ForecastPoint> = response.json().await?;
        debug!(
            "Forecaster returned {} points for horizon {}d",
            points.len(),
            request.horizon_days
        );
        Ok(points)
    }
}
