//! Bridge to the external time-series forecaster.
//!
//! The adapter packages the prepared series and horizon into a
//! fit-and-forecast request, projects volume for the future dates, and
//! normalizes the response into fitted and future spans. The model's
//! internal fitting is opaque.

use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, warn};

use crate::config::VolumePolicy;
use crate::error::{AppError, Result};
use crate::types::{ForecastOutcome, ForecastPoint, ForecastRequest, PreparedSeries, SeriesRow};

/// External forecasting capability, consumed through a single
/// request/response contract.
#[async_trait]
pub trait Forecaster: Send + Sync {
    /// Fit on the historical rows and return points covering both the
    /// historical span (fitted) and the requested horizon.
    async fn forecast(&self, request: &ForecastRequest) -> Result<Vec<ForecastPoint>>;
}

pub struct ForecastAdapter {
    forecaster: std::sync::Arc<dyn Forecaster>,
    policy: VolumePolicy,
}

impl ForecastAdapter {
    pub fn new(forecaster: std::sync::Arc<dyn Forecaster>, policy: VolumePolicy) -> Self {
        Self { forecaster, policy }
    }

    /// Which volume projection policy is active.
    pub fn policy(&self) -> VolumePolicy {
        self.policy
    }

    /// Fit the series and forecast `horizon_days` calendar days past
    /// the last historical date.
    pub async fn fit_and_forecast(
        &self,
        series: &PreparedSeries,
        horizon_days: u32,
    ) -> Result<ForecastOutcome> {
        let last_date = series.last_date().ok_or_else(|| {
            AppError::ForecastUnavailable("empty prepared series".to_string())
        })?;

        let request = ForecastRequest {
            series: self.build_rows(series, horizon_days),
            horizon_days,
        };

        debug!(
            "Requesting forecast: {} rows, horizon {}d, volume policy {}",
            request.series.len(),
            horizon_days,
            self.policy.name()
        );

        let points = self.forecaster.forecast(&request).await.map_err(|e| {
            AppError::ForecastUnavailable(format!("forecaster failed to fit: {}", e))
        })?;

        let mut outcome = ForecastOutcome::default();
        for point in points {
            let normalized = normalize_bounds(point);
            if normalized.date > last_date {
                outcome.future.push(normalized);
            } else {
                outcome.fitted.push(normalized);
            }
        }
        outcome.fitted.sort_by_key(|p| p.date);
        outcome.future.sort_by_key(|p| p.date);

        if outcome.future.is_empty() {
            return Err(AppError::ForecastUnavailable(
                "forecaster returned no future points".to_string(),
            ));
        }
        if outcome.future.len() < horizon_days as usize {
            warn!(
                "Forecaster returned {} of {} requested horizon days",
                outcome.future.len(),
                horizon_days
            );
        }

        Ok(outcome)
    }

    /// Historical rows followed by one projected-volume row per future
    /// date, so the volume regressor covers the whole span.
    fn build_rows(&self, series: &PreparedSeries, horizon_days: u32) -> Vec<SeriesRow> {
        let mut rows: Vec<SeriesRow> = series
            .points
            .iter()
            .map(|p| SeriesRow {
                date: p.date,
                value: p.value,
                volume: p.volume,
            })
            .collect();

        let last = match series.last() {
            Some(p) => *p,
            None => return rows,
        };

        match self.policy {
            VolumePolicy::ForwardFill => {
                // Carry the most recent known volume forward day by day.
                let mut carried = last.volume;
                for offset in 1..=horizon_days as i64 {
                    let date = last.date + Duration::days(offset);
                    rows.push(SeriesRow {
                        date,
                        value: f64::NAN,
                        volume: carried,
                    });
                    carried = rows.last().map(|r| r.volume).unwrap_or(carried);
                }
            }
            VolumePolicy::HoldLast => {
                let held = last.volume;
                for offset in 1..=horizon_days as i64 {
                    rows.push(SeriesRow {
                        date: last.date + Duration::days(offset),
                        value: f64::NAN,
                        volume: held,
                    });
                }
            }
        }

        rows
    }
}

/// Enforce yhat_lower <= yhat <= yhat_upper by clamping the bounds.
fn normalize_bounds(point: ForecastPoint) -> ForecastPoint {
    ForecastPoint {
        date: point.date,
        yhat: point.yhat,
        yhat_lower: point.yhat_lower.min(point.yhat),
        yhat_upper: point.yhat_upper.max(point.yhat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PreparedPoint, PreparedSeries};
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct EchoForecaster;

    #[async_trait]
    impl Forecaster for EchoForecaster {
        async fn forecast(&self, request: &ForecastRequest) -> Result<Vec<ForecastPoint>> {
            // Fitted point per historical row, flat forecast afterwards.
            Ok(request
                .series
                .iter()
                .map(|row| ForecastPoint {
                    date: row.date,
                    yhat: 100.0,
                    yhat_lower: 95.0,
                    yhat_upper: 105.0,
                })
                .collect())
        }
    }

    struct FailingForecaster;

    #[async_trait]
    impl Forecaster for FailingForecaster {
        async fn forecast(&self, _request: &ForecastRequest) -> Result<Vec<ForecastPoint>> {
            Err(AppError::ExternalApi("degenerate series".to_string()))
        }
    }

    fn sample_series(days: usize) -> PreparedSeries {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        PreparedSeries {
            points: (0..days)
                .map(|i| PreparedPoint {
                    date: start + Duration::days(i as i64),
                    value: 100.0 + i as f64,
                    volume: 500.0 + i as f64,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_splits_fitted_and_future() {
        let adapter = ForecastAdapter::new(Arc::new(EchoForecaster), VolumePolicy::ForwardFill);
        let series = sample_series(30);

        let outcome = adapter.fit_and_forecast(&series, 7).await.unwrap();
        assert_eq!(outcome.fitted.len(), 30);
        assert_eq!(outcome.future.len(), 7);

        let last_hist = series.last_date().unwrap();
        assert!(outcome.fitted.iter().all(|p| p.date <= last_hist));
        assert!(outcome.future.iter().all(|p| p.date > last_hist));
    }

    #[tokio::test]
    async fn test_future_dates_are_consecutive() {
        let adapter = ForecastAdapter::new(Arc::new(EchoForecaster), VolumePolicy::HoldLast);
        let series = sample_series(30);

        let outcome = adapter.fit_and_forecast(&series, 5).await.unwrap();
        let last_hist = series.last_date().unwrap();
        for (i, point) in outcome.future.iter().enumerate() {
            assert_eq!(point.date, last_hist + Duration::days(i as i64 + 1));
        }
    }

    #[tokio::test]
    async fn test_fit_failure_maps_to_forecast_unavailable() {
        let adapter = ForecastAdapter::new(Arc::new(FailingForecaster), VolumePolicy::ForwardFill);
        let series = sample_series(30);

        let err = adapter.fit_and_forecast(&series, 7).await.unwrap_err();
        assert!(matches!(err, AppError::ForecastUnavailable(_)));
    }

    #[test]
    fn test_volume_projection_policies() {
        let series = sample_series(10);
        let last_volume = series.last().unwrap().volume;

        for policy in [VolumePolicy::ForwardFill, VolumePolicy::HoldLast] {
            let adapter = ForecastAdapter::new(Arc::new(EchoForecaster), policy);
            let rows = adapter.build_rows(&series, 4);
            assert_eq!(rows.len(), 14);
            for row in &rows[10..] {
                assert_eq!(row.volume, last_volume);
            }
        }
    }

    #[test]
    fn test_normalize_bounds_clamps() {
        let point = ForecastPoint {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            yhat: 100.0,
            yhat_lower: 102.0,
            yhat_upper: 98.0,
        };
        let fixed = normalize_bounds(point);
        assert!(fixed.yhat_lower <= fixed.yhat);
        assert!(fixed.yhat_upper >= fixed.yhat);
    }
}
