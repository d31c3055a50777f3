//! The prediction pipeline: sanitize, compute indicators, forecast,
//! and reconcile into a recommendation. One sequential pass per
//! request over its own immutable snapshot.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::chart::ChartAssembler;
use crate::services::forecast::ForecastAdapter;
use crate::services::indicators::{self, IndicatorBackend};
use crate::services::preparer::DataPreparer;
use crate::services::recommend::{AnalystCountSimulator, RecommendationEngine};
use crate::services::store::RecommendationStore;
use crate::services::Cache;
use crate::types::{
    ForecastChart, IndicatorFrame, PredictionResult, RawBar, RecommendationMetadata,
    RecommendationRecord,
};

/// Historical bar source, consumed read-only.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch raw daily bars for the trailing `days` window.
    async fn fetch_bars(&self, symbol: &str, days: u32) -> Result<Vec<RawBar>>;
}

pub struct PredictionService {
    bars: Arc<dyn BarSource>,
    adapter: ForecastAdapter,
    backend: Box<dyn IndicatorBackend>,
    preparer: DataPreparer,
    engine: RecommendationEngine,
    assembler: ChartAssembler,
    store: Arc<RecommendationStore>,
    cache: Cache<PredictionResult>,
    lookback_days: u32,
}

impl PredictionService {
    pub fn new(
        config: &Config,
        bars: Arc<dyn BarSource>,
        adapter: ForecastAdapter,
        store: Arc<RecommendationStore>,
    ) -> Self {
        let backend = indicators::backend_for(config.indicator_backend);
        info!(
            "Prediction service using {} indicators, {} volume policy",
            backend.name(),
            adapter.policy().name()
        );

        Self {
            bars,
            adapter,
            backend,
            preparer: DataPreparer::new(),
            engine: RecommendationEngine::new(config.thresholds),
            assembler: ChartAssembler::new(),
            store,
            cache: Cache::new(StdDuration::from_secs(config.cache_ttl_secs)),
            lookback_days: config.lookback_days,
        }
    }

    /// Predict the price `forecast_days` out and label the move.
    /// Returns `None` when history is insufficient or the forecaster
    /// cannot fit; either way there is no prediction this cycle.
    pub async fn predict(
        &self,
        symbol: &str,
        forecast_days: u32,
    ) -> Result<Option<PredictionResult>> {
        let cache_key = format!("{}:{}", symbol.to_uppercase(), forecast_days);
        if let Some(hit) = self.cache.get(&cache_key) {
            return Ok(Some(hit));
        }

        let Some((series, frame)) = self.prepare_frame(symbol, false).await? else {
            return Ok(None);
        };

        let outcome = match self.adapter.fit_and_forecast(&series, forecast_days).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Forecast unavailable for {}: {}", symbol, e);
                return Ok(None);
            }
        };

        let result = self.build_result(symbol, forecast_days, &frame, &outcome)?;
        self.cache.set(cache_key, result.clone());
        Ok(Some(result))
    }

    /// Produce the merged actual/forecast chart series along with the
    /// headline prediction numbers.
    pub async fn forecast_chart(
        &self,
        symbol: &str,
        forecast_days: u32,
        history_days: usize,
    ) -> Result<Option<ForecastChart>> {
        // The chart overlays EMA-50-warmed indicators, so it holds the
        // stricter row requirement.
        let Some((series, frame)) = self.prepare_frame(symbol, true).await? else {
            return Ok(None);
        };

        let outcome = match self.adapter.fit_and_forecast(&series, forecast_days).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Forecast unavailable for {}: {}", symbol, e);
                return Ok(None);
            }
        };

        let result = self.build_result(symbol, forecast_days, &frame, &outcome)?;
        let data = self.assembler.assemble(&frame, history_days, &outcome);

        Ok(Some(ForecastChart {
            symbol: result.symbol,
            forecast_days,
            current_price: result.current_price,
            predicted_price: result.predicted_price,
            change_percent: result.change_percent,
            recommendation: result.recommendation,
            data,
            created_at: Utc::now(),
        }))
    }

    /// Generate and persist a recommendation record with simulated
    /// analyst counts. Persistence failure is reported to the caller;
    /// the prediction itself is not recomputed.
    pub async fn generate_recommendation(
        &self,
        symbol: &str,
        forecast_days: u32,
    ) -> Result<Option<(RecommendationRecord, PredictionResult)>> {
        let Some(prediction) = self.predict(symbol, forecast_days).await? else {
            return Ok(None);
        };

        let counts =
            AnalystCountSimulator::counts(prediction.recommendation, prediction.change_percent);
        let now = Utc::now();

        let record = RecommendationRecord {
            id: Uuid::new_v4(),
            symbol: prediction.symbol.clone(),
            period: prediction.prediction_date,
            counts,
            recommendation: prediction.recommendation,
            metadata: RecommendationMetadata {
                predicted_price: prediction.predicted_price,
                current_price: prediction.current_price,
                change_percent: prediction.change_percent,
                rsi: prediction.rsi,
                ema20: prediction.ema20,
                macd: prediction.macd,
            },
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.save_recommendation(&record) {
            error!("Failed to persist recommendation for {}: {}", symbol, e);
            return Err(AppError::Persistence(format!(
                "could not save recommendation for {}",
                symbol
            )));
        }
        if let Err(e) = self.store.save_prediction(&prediction) {
            // Prediction history is secondary to the recommendation row.
            error!("Failed to archive prediction for {}: {}", symbol, e);
        }

        Ok(Some((record, prediction)))
    }

    /// Fetch, clean and compute indicators. `None` means insufficient
    /// history (already logged by the preparer).
    async fn prepare_frame(
        &self,
        symbol: &str,
        require_indicators: bool,
    ) -> Result<Option<(crate::types::PreparedSeries, IndicatorFrame)>> {
        let bars = self.bars.fetch_bars(symbol, self.lookback_days).await?;
        if bars.len() < crate::services::preparer::MIN_FORECAST_ROWS {
            info!(
                "Skipping {}: insufficient data ({} bars)",
                symbol,
                bars.len()
            );
            return Ok(None);
        }

        let Some(series) = self.preparer.prepare(&bars, require_indicators) else {
            return Ok(None);
        };
        let frame = self.backend.compute(&series);
        Ok(Some((series, frame)))
    }

    fn build_result(
        &self,
        symbol: &str,
        forecast_days: u32,
        frame: &IndicatorFrame,
        outcome: &crate::types::ForecastOutcome,
    ) -> Result<PredictionResult> {
        let current = frame
            .last()
            .ok_or_else(|| AppError::InsufficientHistory("empty indicator frame".to_string()))?;
        let last_future = outcome.future.last().ok_or_else(|| {
            AppError::ForecastUnavailable("no future forecast points".to_string())
        })?;

        let current_price = current.value;
        let predicted_price = last_future.yhat;
        let change_percent = (predicted_price - current_price) / current_price * 100.0;

        // Warmup gaps cannot happen with >= 50 rows, but the fallbacks
        // keep the rule engine defined regardless.
        let rsi = current.rsi14;
        let ema20 = current.ema20;
        let recommendation = self.engine.label(
            change_percent,
            rsi.unwrap_or(50.0),
            current_price,
            ema20.unwrap_or(current_price),
        );

        Ok(PredictionResult {
            symbol: symbol.to_uppercase(),
            forecast_days,
            prediction_date: Utc::now().date_naive() + Duration::days(forecast_days as i64),
            current_price,
            predicted_price,
            change_percent,
            confidence_lower: last_future.yhat_lower,
            confidence_upper: last_future.yhat_upper,
            recommendation,
            rsi,
            macd: current.macd_line,
            ema20,
            ema50: current.ema50,
            created_at: Utc::now(),
        })
    }
}
