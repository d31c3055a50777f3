//! Library-style indicator backend: every smoothed average is seeded
//! with an SMA over its first period, so columns stay undefined for
//! longer than the Wilder backend.

use super::{IndicatorBackend, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD};
use crate::types::{IndicatorFrame, IndicatorPoint, PreparedSeries};

pub struct SmaSeededBackend;

impl SmaSeededBackend {
    /// EMA seeded with the SMA of the first `period` values. Undefined
    /// before index `period - 1`.
    fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if values.len() < period {
            return out;
        }

        let multiplier = 2.0 / (period as f64 + 1.0);
        let sma: f64 = values.iter().take(period).sum::<f64>() / period as f64;
        out[period - 1] = Some(sma);

        let mut ema = sma;
        for i in period..values.len() {
            ema = (values[i] - ema) * multiplier + ema;
            out[i] = Some(ema);
        }
        out
    }

    /// RSI with initial averages over the first `period` deltas and
    /// Wilder's smoothing thereafter.
    fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if values.len() < period + 1 {
            return out;
        }

        let mut gains = Vec::with_capacity(values.len() - 1);
        let mut losses = Vec::with_capacity(values.len() - 1);
        for pair in values.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
        let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;
        out[period] = Some(rsi_value(avg_gain, avg_loss));

        for i in period..gains.len() {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
            out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
        }
        out
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

impl IndicatorBackend for SmaSeededBackend {
    fn name(&self) -> &'static str {
        "sma_seeded"
    }

    fn compute(&self, series: &PreparedSeries) -> IndicatorFrame {
        let closes = series.values();

        let rsi14 = Self::rsi(&closes, RSI_PERIOD);
        let ema20 = Self::ema(&closes, 20);
        let ema50 = Self::ema(&closes, 50);

        let ema12 = Self::ema(&closes, MACD_FAST);
        let ema26 = Self::ema(&closes, MACD_SLOW);
        let macd_line: Vec<Option<f64>> = ema12
            .iter()
            .zip(ema26.iter())
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect();

        // Signal line: EMA of the defined stretch of the MACD line.
        let defined_start = macd_line.iter().position(|v| v.is_some());
        let mut macd_signal: Vec<Option<f64>> = vec![None; closes.len()];
        if let Some(start) = defined_start {
            let line_values: Vec<f64> = macd_line[start..].iter().flatten().copied().collect();
            for (offset, signal) in Self::ema(&line_values, MACD_SIGNAL).iter().enumerate() {
                macd_signal[start + offset] = *signal;
            }
        }

        IndicatorFrame {
            points: series
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let hist = match (macd_line[i], macd_signal[i]) {
                        (Some(line), Some(signal)) => Some(line - signal),
                        _ => None,
                    };
                    IndicatorPoint {
                        date: p.date,
                        value: p.value,
                        volume: p.volume,
                        rsi14: rsi14[i],
                        ema20: ema20[i],
                        ema50: ema50[i],
                        macd_line: macd_line[i],
                        macd_signal: macd_signal[i],
                        macd_hist: hist,
                    }
                })
                .collect(),
        }
    }
}
