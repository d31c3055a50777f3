//! Default indicator backend: exponential smoothing seeded from the
//! first observation (pandas `ewm(adjust=False)` semantics).

use super::{IndicatorBackend, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD};
use crate::types::{IndicatorFrame, IndicatorPoint, PreparedSeries};

pub struct WilderBackend;

impl WilderBackend {
    /// EMA with EMA_0 = p_0 and alpha = 2 / (N + 1). Defined for every
    /// index.
    fn ema(values: &[f64], period: usize) -> Vec<f64> {
        let alpha = 2.0 / (period as f64 + 1.0);
        let mut out = Vec::with_capacity(values.len());
        for (i, &v) in values.iter().enumerate() {
            if i == 0 {
                out.push(v);
            } else {
                let prev = out[i - 1];
                out.push(alpha * v + (1.0 - alpha) * prev);
            }
        }
        out
    }

    /// RSI(14) via Wilder smoothing with alpha = 1/period, seeded from
    /// the first delta. The first `period` indices are warmup.
    fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; values.len()];
        if values.len() < 2 {
            return out;
        }

        let alpha = 1.0 / period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for i in 1..values.len() {
            let delta = values[i] - values[i - 1];
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);

            if i == 1 {
                avg_gain = gain;
                avg_loss = loss;
            } else {
                avg_gain += alpha * (gain - avg_gain);
                avg_loss += alpha * (loss - avg_loss);
            }

            // min_periods: need a full period of deltas before emitting.
            if i >= period {
                out[i] = Some(if avg_loss == 0.0 {
                    100.0
                } else {
                    let rs = avg_gain / avg_loss;
                    100.0 - 100.0 / (1.0 + rs)
                });
            }
        }
        out
    }
}

impl IndicatorBackend for WilderBackend {
    fn name(&self) -> &'static str {
        "wilder"
    }

    fn compute(&self, series: &PreparedSeries) -> IndicatorFrame {
        let closes = series.values();

        let rsi14 = Self::rsi(&closes, RSI_PERIOD);
        let ema20 = Self::ema(&closes, 20);
        let ema50 = Self::ema(&closes, 50);

        let ema12 = Self::ema(&closes, MACD_FAST);
        let ema26 = Self::ema(&closes, MACD_SLOW);
        let macd_line: Vec<f64> = ema12
            .iter()
            .zip(ema26.iter())
            .map(|(f, s)| f - s)
            .collect();
        let macd_signal = Self::ema(&macd_line, MACD_SIGNAL);

        IndicatorFrame {
            points: series
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| IndicatorPoint {
                    date: p.date,
                    value: p.value,
                    volume: p.volume,
                    rsi14: rsi14[i],
                    ema20: Some(ema20[i]),
                    ema50: Some(ema50[i]),
                    macd_line: Some(macd_line[i]),
                    macd_signal: Some(macd_signal[i]),
                    macd_hist: Some(macd_line[i] - macd_signal[i]),
                })
                .collect(),
        }
    }
}
