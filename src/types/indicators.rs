use chrono::NaiveDate;
use serde::Serialize;

/// A prepared point extended with technical indicator columns.
///
/// Indicator values are `None` until the backend's warmup length for
/// that column is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub volume: f64,
    pub rsi14: Option<f64>,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
}

/// Per-date indicator table built column-by-column on top of a
/// prepared series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&IndicatorPoint> {
        self.points.last()
    }

    /// Trailing window of at most `n` points.
    pub fn tail(&self, n: usize) -> &[IndicatorPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}
