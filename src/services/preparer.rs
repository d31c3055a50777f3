//! Raw bar sanitization: numeric coercion, dedup, and Winsorization.

use serde_json::Value;
use tracing::{debug, info};

use crate::types::{PreparedPoint, PreparedSeries, RawBar};

/// Minimum valid rows for the forecaster to fit at all.
pub const MIN_FORECAST_ROWS: usize = 30;
/// Minimum valid rows when indicator warmup (EMA-50) is required.
pub const MIN_INDICATOR_ROWS: usize = 50;

/// Cleans a raw bar series into a uniform, gap-free per-date series.
///
/// Records with unparseable dates or closes are dropped; duplicate
/// dates keep the last occurrence; close values are Winsorized (clipped
/// to the IQR fence, not dropped) so date continuity survives for the
/// forecaster.
#[derive(Debug, Clone, Default)]
pub struct DataPreparer;

impl DataPreparer {
    pub fn new() -> Self {
        Self
    }

    /// Prepare a series for forecasting. Returns `None` when fewer than
    /// 30 valid rows remain, or fewer than 50 when
    /// `require_indicators` is set.
    pub fn prepare(&self, bars: &[RawBar], require_indicators: bool) -> Option<PreparedSeries> {
        let total = bars.len();
        let mut points: Vec<PreparedPoint> = bars
            .iter()
            .filter_map(|bar| {
                let date = parse_bar_date(&bar.date)?;
                let value = coerce_numeric(&bar.close)?;
                // Missing volume degrades to zero rather than dropping
                // the row; the forecaster treats it as a regressor gap.
                let volume = coerce_numeric(&bar.volume).unwrap_or(0.0);
                Some(PreparedPoint { date, value, volume })
            })
            .collect();

        if points.len() < total {
            debug!(
                "Dropped {} of {} bars during numeric coercion",
                total - points.len(),
                total
            );
        }

        // Sort ascending; on duplicate dates the last occurrence wins.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PreparedPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        let required = if require_indicators {
            MIN_INDICATOR_ROWS
        } else {
            MIN_FORECAST_ROWS
        };
        if deduped.len() < required {
            info!(
                "Insufficient history: {} valid rows, {} required",
                deduped.len(),
                required
            );
            return None;
        }

        winsorize(&mut deduped);
        Some(PreparedSeries { points: deduped })
    }
}

/// Clip closes to [Q1 - 1.5*IQR, Q3 + 1.5*IQR] over the whole series.
fn winsorize(points: &mut [PreparedPoint]) {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let q1 = quantile(&values, 0.25);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let low = q1 - 1.5 * iqr;
    let high = q3 + 1.5 * iqr;

    for point in points.iter_mut() {
        point.value = point.value.clamp(low, high);
    }
}

/// Linearly interpolated quantile over an unsorted slice.
fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

/// Coerce a loose JSON field to f64. Accepts numbers and numeric
/// strings; rejects NaN and everything else.
fn coerce_numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

/// Parse a bar date from "YYYY-MM-DD" or an ISO datetime prefix.
fn parse_bar_date(raw: &str) -> Option<chrono::NaiveDate> {
    let head = raw.get(..10).unwrap_or(raw);
    chrono::NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_bar(date: &str, close: Value, volume: Value) -> RawBar {
        RawBar {
            date: date.to_string(),
            open: close.clone(),
            high: close.clone(),
            low: close.clone(),
            close,
            volume,
        }
    }

    fn daily_bars(count: usize, close_fn: impl Fn(usize) -> f64) -> Vec<RawBar> {
        (0..count)
            .map(|i| {
                let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                raw_bar(
                    &date.format("%Y-%m-%d").to_string(),
                    json!(close_fn(i)),
                    json!(1000.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_insufficient_history_for_forecast() {
        let preparer = DataPreparer::new();
        let bars = daily_bars(20, |i| 100.0 + i as f64);
        assert!(preparer.prepare(&bars, false).is_none());
    }

    #[test]
    fn test_insufficient_history_for_indicators() {
        let preparer = DataPreparer::new();
        let bars = daily_bars(40, |i| 100.0 + i as f64);
        // Enough for forecasting, not for EMA-50 warmup.
        assert!(preparer.prepare(&bars, false).is_some());
        assert!(preparer.prepare(&bars, true).is_none());
    }

    #[test]
    fn test_drops_unparseable_rows() {
        let preparer = DataPreparer::new();
        let mut bars = daily_bars(30, |i| 100.0 + i as f64);
        bars.push(raw_bar("2025-03-01", json!("not-a-number"), json!(10.0)));
        bars.push(raw_bar("garbage", json!(55.0), json!(10.0)));

        let series = preparer.prepare(&bars, false).unwrap();
        assert_eq!(series.len(), 30);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let preparer = DataPreparer::new();
        let mut bars = daily_bars(29, |i| 100.0 + i as f64);
        bars.push(raw_bar("2025-02-10", json!("129.5"), json!("2000")));

        let series = preparer.prepare(&bars, false).unwrap();
        assert_eq!(series.len(), 30);
        let last = series.last().unwrap();
        assert_eq!(last.value, 129.5);
        assert_eq!(last.volume, 2000.0);
    }

    #[test]
    fn test_duplicate_dates_keep_last() {
        let preparer = DataPreparer::new();
        let mut bars = daily_bars(30, |i| 100.0 + i as f64);
        bars.push(raw_bar("2025-01-05", json!(999999.0), json!(1.0)));
        bars.push(raw_bar("2025-01-05", json!(104.5), json!(500.0)));

        let series = preparer.prepare(&bars, false).unwrap();
        assert_eq!(series.len(), 30);
        let point = series.points.iter().find(|p| {
            p.date == chrono::NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        });
        assert_eq!(point.unwrap().value, 104.5);
    }

    #[test]
    fn test_dates_strictly_increasing() {
        let preparer = DataPreparer::new();
        let mut bars = daily_bars(35, |i| 100.0 + i as f64);
        bars.reverse();

        let series = preparer.prepare(&bars, false).unwrap();
        for pair in series.points.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_winsorized_values_inside_fence() {
        let preparer = DataPreparer::new();
        let mut bars = daily_bars(49, |i| 100.0 + (i % 7) as f64);
        // An outlier far above the fence gets clipped, not dropped.
        bars.push(raw_bar("2025-06-01", json!(10_000.0), json!(1000.0)));

        let series = preparer.prepare(&bars, false).unwrap();
        assert_eq!(series.len(), 50);

        let values = series.values();
        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        for v in &values {
            assert!(*v >= q1 - 1.5 * iqr - 1e-9);
            assert!(*v <= q3 + 1.5 * iqr + 1e-9);
        }
        // Clipped point still present at the fence.
        assert!(series.last().unwrap().value < 10_000.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.25), 1.75);
        assert_eq!(quantile(&values, 0.5), 2.5);
        assert_eq!(quantile(&values, 0.75), 3.25);
    }
}
