use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw daily bar as received from the historical data source.
///
/// Upstream feeds are inconsistent about numeric fields (numbers vs.
/// numeric strings vs. nulls), so everything except the date is kept
/// loose until the preparer coerces it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBar {
    pub date: String,
    #[serde(default)]
    pub open: Value,
    #[serde(default)]
    pub high: Value,
    #[serde(default)]
    pub low: Value,
    #[serde(default)]
    pub close: Value,
    #[serde(default)]
    pub volume: Value,
}

/// A validated daily bar, keyed by (symbol, date) upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One point of a cleaned, Winsorized series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreparedPoint {
    pub date: NaiveDate,
    /// Winsorized close price.
    pub value: f64,
    pub volume: f64,
}

/// Cleaned per-date series ready for indicator computation and
/// forecasting. Dates are strictly increasing with no duplicates.
#[derive(Debug, Clone, Default)]
pub struct PreparedSeries {
    pub points: Vec<PreparedPoint>,
}

impl PreparedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PreparedPoint> {
        self.points.last()
    }

    /// Close values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}
