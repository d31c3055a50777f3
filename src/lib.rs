//! Augur - hybrid stock price forecasting and recommendation server.
//!
//! Turns a symbol's historical price series into a directional trading
//! recommendation and a chart-ready forecast, then best-effort notifies
//! subscribed users. The statistical forecaster itself is an external
//! collaborator consumed through a request/response contract.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::{NotificationFanout, PredictionService, RecommendationStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub predictor: Arc<PredictionService>,
    pub fanout: Arc<NotificationFanout>,
    pub store: Arc<RecommendationStore>,
}

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::*;
