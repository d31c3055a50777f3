//! End-to-end pipeline tests: stubbed bar source and forecaster driving
//! the real preparer, indicator, recommendation and persistence layers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde_json::json;

use augur::config::{
    Config, FanoutConfig, IndicatorBackendKind, RecommendThresholds, VolumePolicy,
};
use augur::services::{BarSource, ForecastAdapter, Forecaster, PredictionService, RecommendationStore};
use augur::types::{ForecastPoint, ForecastRequest, RawBar, Recommendation};
use augur::Result;

fn test_config(thresholds: RecommendThresholds) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        history_service_url: String::new(),
        forecaster_url: String::new(),
        user_service_url: String::new(),
        notification_service_url: String::new(),
        forecast_days: 7,
        history_days: 90,
        lookback_days: 365,
        forecaster_timeout_secs: 5,
        volume_policy: VolumePolicy::ForwardFill,
        indicator_backend: IndicatorBackendKind::Wilder,
        thresholds,
        fanout: FanoutConfig::default(),
        sqlite_path: ":memory:".to_string(),
        cache_ttl_secs: 900,
    }
}

struct StubBars {
    bars: Vec<RawBar>,
}

#[async_trait]
impl BarSource for StubBars {
    async fn fetch_bars(&self, _symbol: &str, _days: u32) -> Result<Vec<RawBar>> {
        Ok(self.bars.clone())
    }
}

/// Forecaster whose future yhat is the last historical value shifted by
/// a fixed percentage. Historical rows echo back as fitted points.
struct PercentForecaster {
    change_percent: f64,
}

#[async_trait]
impl Forecaster for PercentForecaster {
    async fn forecast(&self, request: &ForecastRequest) -> Result<Vec<ForecastPoint>> {
        let last_value = request
            .series
            .iter()
            .rev()
            .find(|row| row.value.is_finite())
            .map(|row| row.value)
            .unwrap_or(0.0);
        let predicted = last_value * (1.0 + self.change_percent / 100.0);

        Ok(request
            .series
            .iter()
            .map(|row| {
                let yhat = if row.value.is_finite() {
                    row.value
                } else {
                    predicted
                };
                ForecastPoint {
                    date: row.date,
                    yhat,
                    yhat_lower: yhat - 2.0,
                    yhat_upper: yhat + 2.0,
                }
            })
            .collect())
    }
}

fn bar(date: NaiveDate, close: f64) -> RawBar {
    RawBar {
        date: date.format("%Y-%m-%d").to_string(),
        open: json!(close),
        high: json!(close),
        low: json!(close),
        close: json!(close),
        volume: json!(1000.0),
    }
}

fn bars_from_closes(closes: &[f64]) -> Vec<RawBar> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| bar(start + Duration::days(i as i64), *close))
        .collect()
}

/// Overall-rising series with regular pullbacks, so RSI sits high but
/// well under the overbought bound.
fn rising_closes(count: usize) -> Vec<f64> {
    let mut closes = vec![100.0];
    for i in 1..count {
        let prev = closes[i - 1];
        closes.push(if i % 2 == 1 { prev + 1.0 } else { prev - 0.8 });
    }
    closes
}

fn service(
    closes: &[f64],
    change_percent: f64,
    thresholds: RecommendThresholds,
) -> PredictionService {
    let config = test_config(thresholds);
    let bars = Arc::new(StubBars {
        bars: bars_from_closes(closes),
    });
    let adapter = ForecastAdapter::new(
        Arc::new(PercentForecaster { change_percent }),
        config.volume_policy,
    );
    let store = Arc::new(RecommendationStore::new_in_memory().unwrap());
    PredictionService::new(&config, bars, adapter, store)
}

#[tokio::test]
async fn test_short_history_yields_no_prediction() {
    let svc = service(&rising_closes(20), 3.0, RecommendThresholds::balanced());
    let result = svc.predict("FPT", 7).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_thirty_rising_bars_recommend_buying() {
    let svc = service(&rising_closes(30), 3.0, RecommendThresholds::balanced());
    let prediction = svc.predict("FPT", 7).await.unwrap().unwrap();

    assert!(prediction.change_percent > 0.0);
    assert!((prediction.change_percent - 3.0).abs() < 1e-9);

    // The ramp keeps momentum high but short of overbought, and price
    // sits above its EMA20.
    let rsi = prediction.rsi.unwrap();
    assert!(rsi > 50.0 && rsi < 70.0, "rsi = {}", rsi);
    assert!(prediction.current_price > prediction.ema20.unwrap());

    assert!(matches!(
        prediction.recommendation,
        Recommendation::Buy | Recommendation::StrongBuy
    ));
}

#[tokio::test]
async fn test_sharp_drop_recommends_strong_sell() {
    // 50 bars of a strong zigzag uptrend, then ten straight losing
    // days. The crash drains RSI below 30 without pinning it under 25.
    let mut closes = vec![100.0];
    for i in 1..50 {
        let prev = closes[i - 1];
        closes.push(if i % 2 == 1 { prev + 1.2 } else { prev - 0.8 });
    }
    for _ in 0..10 {
        closes.push(closes.last().unwrap() - 1.2);
    }

    let svc = service(&closes, -3.0, RecommendThresholds::strict());
    let prediction = svc.predict("VNM", 7).await.unwrap().unwrap();

    assert!((prediction.change_percent + 3.0).abs() < 1e-9);
    let rsi = prediction.rsi.unwrap();
    assert!(rsi < 30.0, "rsi = {}", rsi);
    assert!(rsi > 25.0, "rsi = {}", rsi);
    assert!(prediction.current_price < prediction.ema20.unwrap());

    assert_eq!(prediction.recommendation, Recommendation::StrongSell);
}

#[tokio::test]
async fn test_forecaster_failure_yields_no_prediction() {
    struct BrokenForecaster;

    #[async_trait]
    impl Forecaster for BrokenForecaster {
        async fn forecast(&self, _request: &ForecastRequest) -> Result<Vec<ForecastPoint>> {
            Err(augur::AppError::ExternalApi("cannot fit".to_string()))
        }
    }

    let config = test_config(RecommendThresholds::balanced());
    let bars = Arc::new(StubBars {
        bars: bars_from_closes(&rising_closes(60)),
    });
    let adapter = ForecastAdapter::new(Arc::new(BrokenForecaster), config.volume_policy);
    let store = Arc::new(RecommendationStore::new_in_memory().unwrap());
    let svc = PredictionService::new(&config, bars, adapter, store);

    let result = svc.predict("FPT", 7).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_recommendation_record_counts_sum_to_100() {
    let svc = service(&rising_closes(60), 3.0, RecommendThresholds::balanced());
    let (record, prediction) = svc
        .generate_recommendation("FPT", 7)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.symbol, "FPT");
    assert_eq!(record.counts.total(), 100);
    assert_eq!(record.recommendation, prediction.recommendation);

    // +3% forecast: confidence 0.15.
    if record.recommendation == Recommendation::StrongBuy {
        assert_eq!(record.counts.strong_buy, 19);
        assert_eq!(record.counts.buy, 4);
        assert_eq!(record.counts.hold, 77);
    }
}

#[tokio::test]
async fn test_chart_merges_history_and_forecast() {
    let svc = service(&rising_closes(60), 3.0, RecommendThresholds::balanced());
    let chart = svc.forecast_chart("FPT", 7, 30).await.unwrap().unwrap();

    assert_eq!(chart.symbol, "FPT");
    assert_eq!(chart.forecast_days, 7);
    assert_eq!(chart.data.len(), 37);

    // Trailing window carries actuals, the horizon does not.
    for point in &chart.data[..30] {
        assert!(point.actual.is_some());
    }
    for point in &chart.data[30..] {
        assert!(point.actual.is_none());
        assert!(point.predicted.is_some());
    }

    for pair in chart.data.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
}

#[tokio::test]
async fn test_chart_requires_indicator_warmup_history() {
    // 40 bars clear the forecasting minimum but not the EMA-50 warmup
    // the chart overlay needs.
    let svc = service(&rising_closes(40), 3.0, RecommendThresholds::balanced());

    assert!(svc.predict("FPT", 7).await.unwrap().is_some());
    assert!(svc.forecast_chart("FPT", 7, 30).await.unwrap().is_none());
}

#[tokio::test]
async fn test_symbol_is_uppercased() {
    let svc = service(&rising_closes(30), 1.5, RecommendThresholds::balanced());
    let prediction = svc.predict("fpt", 7).await.unwrap().unwrap();
    assert_eq!(prediction.symbol, "FPT");
}
