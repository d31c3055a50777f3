//! Best-effort notification fan-out to users watching a symbol.
//!
//! One dispatch per subscriber with an independent timeout, no retries,
//! and per-subscriber failure isolation: one timeout never aborts the
//! others. Overall result is success iff at least one dispatch
//! succeeded or there was nobody to notify.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::config::FanoutConfig;
use crate::error::Result;
use crate::types::{NotificationPayload, PredictionResult};

/// Resolves which users are watching a symbol.
#[async_trait]
pub trait WatchlistDirectory: Send + Sync {
    async fn users_watching(&self, symbol: &str) -> Result<Vec<String>>;
}

/// Delivers one prophet notification to one user.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_prophet_alert(&self, payload: &NotificationPayload) -> Result<()>;
}

pub struct NotificationFanout {
    directory: Arc<dyn WatchlistDirectory>,
    gateway: Arc<dyn NotificationGateway>,
    config: FanoutConfig,
}

impl NotificationFanout {
    pub fn new(
        directory: Arc<dyn WatchlistDirectory>,
        gateway: Arc<dyn NotificationGateway>,
        config: FanoutConfig,
    ) -> Self {
        Self {
            directory,
            gateway,
            config,
        }
    }

    /// Notify every watcher of the prediction's symbol. Returns `true`
    /// iff at least one dispatch succeeded or the watchlist was empty.
    pub async fn notify_watchers(&self, prediction: &PredictionResult) -> bool {
        let symbol = prediction.symbol.clone();

        // Directory failure degrades to zero subscribers, never fatal.
        let user_ids = match self.directory.users_watching(&symbol).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Watchlist lookup failed for {}: {}", symbol, e);
                Vec::new()
            }
        };

        if user_ids.is_empty() {
            info!("No users watching {}, skipping notification", symbol);
            return true;
        }

        let total = user_ids.len();
        let timeout = Duration::from_secs(self.config.dispatch_timeout_secs);

        let success_count = stream::iter(user_ids)
            .map(|user_id| {
                let payload = NotificationPayload {
                    user_id: user_id.clone(),
                    symbol: symbol.clone(),
                    predicted_change: prediction.change_percent,
                    predicted_price: format!("${:+.2}%", prediction.change_percent),
                    forecast_days: prediction.forecast_days,
                    confidence: prediction.confidence(),
                };
                async move {
                    match tokio::time::timeout(timeout, self.gateway.send_prophet_alert(&payload))
                        .await
                    {
                        Ok(Ok(())) => true,
                        Ok(Err(e)) => {
                            warn!("Failed to notify user {}: {}", payload.user_id, e);
                            false
                        }
                        Err(_) => {
                            error!(
                                "Notification to user {} timed out after {:?}",
                                payload.user_id, timeout
                            );
                            false
                        }
                    }
                }
            })
            .buffer_unordered(self.config.max_in_flight.max(1))
            .filter(|ok| futures_util::future::ready(*ok))
            .count()
            .await;

        info!(
            "Sent {}/{} prophet notifications for {}",
            success_count, total, symbol
        );
        success_count > 0
    }
}
