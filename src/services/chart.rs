//! Merges historical actuals with fitted and future forecast values
//! into a single chart-ready series.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::types::{ChartPoint, ForecastOutcome, ForecastPoint, IndicatorFrame};

#[derive(Debug, Clone, Default)]
pub struct ChartAssembler;

impl ChartAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Emit the trailing `history_days` window with actuals joined by
    /// exact date to fitted forecast values, then the future points
    /// with no actual. Output is chronological with unique dates.
    pub fn assemble(
        &self,
        frame: &IndicatorFrame,
        history_days: usize,
        outcome: &ForecastOutcome,
    ) -> Vec<ChartPoint> {
        let fitted: HashMap<NaiveDate, &ForecastPoint> =
            outcome.fitted.iter().map(|p| (p.date, p)).collect();

        let window = frame.tail(history_days);
        let mut data = Vec::with_capacity(window.len() + outcome.future.len());

        for point in window {
            let matched = fitted.get(&point.date);
            data.push(ChartPoint {
                date: point.date,
                actual: Some(point.value),
                predicted: matched.map(|f| f.yhat),
                lower: matched.map(|f| f.yhat_lower),
                upper: matched.map(|f| f.yhat_upper),
            });
        }

        for point in &outcome.future {
            data.push(ChartPoint {
                date: point.date,
                actual: None,
                predicted: Some(point.yhat),
                lower: Some(point.yhat_lower),
                upper: Some(point.yhat_upper),
            });
        }

        data
    }
}
