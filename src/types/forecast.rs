use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (date, value, volume) row sent to the forecaster. Volume rides
/// along as an exogenous regressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub value: f64,
    pub volume: f64,
}

/// Fit-and-forecast request for the external forecaster.
///
/// `series` covers the historical rows followed by one projected-volume
/// row per future date, so the forecaster always has a regressor value
/// for the full span it is asked to predict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub series: Vec<SeriesRow>,
    pub horizon_days: u32,
}

/// A single forecast point, covering either a fitted historical date or
/// a future horizon date. Invariant: `yhat_lower <= yhat <= yhat_upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Normalized forecaster response, split at the last historical date.
#[derive(Debug, Clone, Default)]
pub struct ForecastOutcome {
    /// Fitted values for the historical span, used for charting.
    pub fitted: Vec<ForecastPoint>,
    /// Points strictly after the last historical date.
    pub future: Vec<ForecastPoint>,
}
