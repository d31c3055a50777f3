//! Prediction API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::types::{ForecastChart, PredictionResult, RecommendationRecord};
use crate::AppState;

/// Query parameters for prediction endpoints.
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    /// Forecast horizon in days; defaults from config.
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub days: Option<u32>,
    /// Trailing historical window for the chart; defaults from config.
    pub history: Option<usize>,
}

/// Create the predictions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_prediction))
        .route("/:symbol/chart", get(get_forecast_chart))
        .route("/:symbol/recommendation", post(generate_recommendation))
}

/// Predict the price move for a symbol.
async fn get_prediction(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PredictionQuery>,
) -> Result<Json<PredictionResult>> {
    let days = query.days.unwrap_or(state.config.forecast_days);

    let prediction = state
        .predictor
        .predict(&symbol, days)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No prediction available for {}", symbol)))?;

    Ok(Json(prediction))
}

/// Merged actual/forecast chart series for a symbol.
async fn get_forecast_chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ForecastChart>> {
    let days = query.days.unwrap_or(state.config.forecast_days);
    let history = query.history.unwrap_or(state.config.history_days);

    let chart = state
        .predictor
        .forecast_chart(&symbol, days, history)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No forecast available for {}", symbol)))?;

    Ok(Json(chart))
}

/// Generate, persist and fan out a recommendation for a symbol.
async fn generate_recommendation(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PredictionQuery>,
) -> Result<Json<RecommendationRecord>> {
    let days = query.days.unwrap_or(state.config.forecast_days);

    let Some((record, prediction)) = state
        .predictor
        .generate_recommendation(&symbol, days)
        .await?
    else {
        return Err(AppError::NotFound(format!(
            "No recommendation available for {}",
            symbol
        )));
    };

    // Best-effort side effect; delivery problems never fail the request.
    if !state.fanout.notify_watchers(&prediction).await {
        warn!("No notifications delivered for {}", record.symbol);
    }

    Ok(Json(record))
}
