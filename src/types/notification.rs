use serde::{Deserialize, Serialize};

/// Payload sent to the notification gateway for one subscriber.
/// Transient; never persisted by this service.
///
/// `predicted_price` is a display string (e.g. "$+2.45%") per the
/// gateway's prophet endpoint contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub user_id: String,
    pub symbol: String,
    pub predicted_change: f64,
    pub predicted_price: String,
    pub forecast_days: u32,
    pub confidence: f64,
}
