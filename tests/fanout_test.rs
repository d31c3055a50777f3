//! Notification fan-out behavior over stubbed directory and gateway.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use augur::config::FanoutConfig;
use augur::services::{NotificationFanout, NotificationGateway, WatchlistDirectory};
use augur::types::{NotificationPayload, PredictionResult, Recommendation};
use augur::{AppError, Result};

fn prediction(change_percent: f64) -> PredictionResult {
    let current_price = 100.0;
    PredictionResult {
        symbol: "FPT".to_string(),
        forecast_days: 7,
        prediction_date: NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
        current_price,
        predicted_price: current_price * (1.0 + change_percent / 100.0),
        change_percent,
        confidence_lower: 95.0,
        confidence_upper: 108.0,
        recommendation: Recommendation::Buy,
        rsi: Some(58.0),
        macd: Some(0.2),
        ema20: Some(99.0),
        ema50: Some(97.0),
        created_at: Utc::now(),
    }
}

struct FixedDirectory {
    users: Vec<String>,
}

#[async_trait]
impl WatchlistDirectory for FixedDirectory {
    async fn users_watching(&self, _symbol: &str) -> Result<Vec<String>> {
        Ok(self.users.clone())
    }
}

/// Gateway recording every delivered payload; fails for listed users
/// and optionally hangs for others.
struct RecordingGateway {
    failing: Vec<String>,
    hanging: Vec<String>,
    attempts: AtomicUsize,
    delivered: Mutex<Vec<NotificationPayload>>,
}

impl RecordingGateway {
    fn new(failing: &[&str], hanging: &[&str]) -> Self {
        Self {
            failing: failing.iter().map(|s| s.to_string()).collect(),
            hanging: hanging.iter().map(|s| s.to_string()).collect(),
            attempts: AtomicUsize::new(0),
            delivered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send_prophet_alert(&self, payload: &NotificationPayload) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.hanging.contains(&payload.user_id) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if self.failing.contains(&payload.user_id) {
            return Err(AppError::ExternalApi("gateway returned 503".to_string()));
        }
        self.delivered.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

fn fanout(users: &[&str], gateway: Arc<RecordingGateway>) -> NotificationFanout {
    NotificationFanout::new(
        Arc::new(FixedDirectory {
            users: users.iter().map(|s| s.to_string()).collect(),
        }),
        gateway,
        FanoutConfig {
            dispatch_timeout_secs: 10,
            max_in_flight: 4,
        },
    )
}

#[tokio::test]
async fn test_empty_watchlist_succeeds_without_dispatching() {
    let gateway = Arc::new(RecordingGateway::new(&[], &[]));
    let f = fanout(&[], gateway.clone());

    assert!(f.notify_watchers(&prediction(3.0)).await);
    assert_eq!(gateway.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_one_failing_user_does_not_affect_the_others() {
    let gateway = Arc::new(RecordingGateway::new(&["u2"], &[]));
    let f = fanout(&["u1", "u2", "u3"], gateway.clone());

    assert!(f.notify_watchers(&prediction(3.0)).await);

    // u2 attempted once, never retried, never delivered.
    assert_eq!(gateway.attempts.load(Ordering::SeqCst), 3);
    let delivered = gateway.delivered.lock().unwrap();
    let mut user_ids: Vec<String> = delivered.iter().map(|p| p.user_id.clone()).collect();
    user_ids.sort();
    assert_eq!(user_ids, vec!["u1", "u3"]);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_dispatch_times_out_in_isolation() {
    let gateway = Arc::new(RecordingGateway::new(&[], &["u1"]));
    let f = fanout(&["u1", "u2"], gateway.clone());

    assert!(f.notify_watchers(&prediction(3.0)).await);

    let delivered = gateway.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].user_id, "u2");
}

#[tokio::test]
async fn test_payload_carries_forecast_fields() {
    let gateway = Arc::new(RecordingGateway::new(&[], &[]));
    let f = fanout(&["u1"], gateway.clone());

    assert!(f.notify_watchers(&prediction(3.0)).await);

    let delivered = gateway.delivered.lock().unwrap();
    let payload = &delivered[0];
    assert_eq!(payload.symbol, "FPT");
    assert_eq!(payload.forecast_days, 7);
    assert_eq!(payload.predicted_change, 3.0);
    assert_eq!(payload.predicted_price, "$+3.00%");
    assert_eq!(payload.confidence, 0.15);
}

#[tokio::test]
async fn test_every_dispatch_failing_reports_failure() {
    let gateway = Arc::new(RecordingGateway::new(&["u1", "u2", "u3"], &[]));
    let f = fanout(&["u1", "u2", "u3"], gateway.clone());

    assert!(!f.notify_watchers(&prediction(-2.0)).await);
    assert_eq!(gateway.attempts.load(Ordering::SeqCst), 3);
}
