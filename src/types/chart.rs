use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::types::Recommendation;

/// One point of the merged actual/forecast chart series.
///
/// `actual` is present only for historical dates; `predicted`, `lower`
/// and `upper` may be absent for historical dates outside the fitted
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// Chart payload: headline numbers plus the chronological series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastChart {
    pub symbol: String,
    pub forecast_days: u32,
    pub current_price: f64,
    pub predicted_price: f64,
    pub change_percent: f64,
    pub recommendation: Recommendation,
    pub data: Vec<ChartPoint>,
    pub created_at: DateTime<Utc>,
}
