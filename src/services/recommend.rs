//! Hybrid recommendation rules and synthetic analyst vote simulation.

use crate::config::RecommendThresholds;
use crate::types::{AnalystCounts, Recommendation};

/// Maps forecast direction and indicator state to a directional label.
/// Stateless; identical inputs always yield the identical label.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: RecommendThresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: RecommendThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RecommendThresholds {
        &self.thresholds
    }

    /// First-match rule order:
    /// 1. Forecast up, RSI not overbought, price above EMA20: STRONG_BUY.
    /// 2. Forecast down, RSI not oversold, price below EMA20: STRONG_SELL.
    /// 3. Magnitude bands with RSI / EMA20 vetoes, else HOLD.
    pub fn label(&self, change_percent: f64, rsi: f64, price: f64, ema20: f64) -> Recommendation {
        let t = &self.thresholds;

        let prophet_up = change_percent > t.prophet_up;
        let prophet_down = change_percent < t.prophet_down;

        if prophet_up && rsi < t.rsi_overbought && price > ema20 {
            return Recommendation::StrongBuy;
        }
        if prophet_down && rsi > t.rsi_oversold && price < ema20 {
            return Recommendation::StrongSell;
        }

        if change_percent >= t.strong_buy_pct {
            if rsi < 75.0 {
                Recommendation::Buy
            } else {
                Recommendation::Hold
            }
        } else if change_percent >= t.buy_pct {
            if price > ema20 {
                Recommendation::Buy
            } else {
                Recommendation::Hold
            }
        } else if change_percent <= t.strong_sell_pct {
            if rsi > 25.0 {
                Recommendation::Sell
            } else {
                Recommendation::Hold
            }
        } else if change_percent <= t.sell_pct {
            if price < ema20 {
                Recommendation::Sell
            } else {
                Recommendation::Hold
            }
        } else {
            Recommendation::Hold
        }
    }
}

/// Converts a label and forecast magnitude into deterministic synthetic
/// analyst vote counts. No real analyst data is involved.
pub struct AnalystCountSimulator;

impl AnalystCountSimulator {
    /// Confidence in [0, 1]: a 20% (or larger) predicted move is full
    /// confidence.
    pub fn confidence(change_percent: f64) -> f64 {
        (change_percent.abs() / 20.0).clamp(0.0, 1.0)
    }

    /// Simulate the five vote buckets. Each label blends two buckets
    /// linearly by confidence; the rounding remainder always lands in
    /// HOLD, so the counts sum to exactly 100.
    pub fn counts(label: Recommendation, change_percent: f64) -> AnalystCounts {
        let c = Self::confidence(change_percent);

        let mut counts = AnalystCounts {
            strong_buy: 0,
            buy: 0,
            hold: 0,
            sell: 0,
            strong_sell: 0,
        };

        match label {
            Recommendation::StrongBuy => {
                counts.strong_buy = (60.0 * c + 10.0).floor() as u32;
                counts.buy = (30.0 * c).floor() as u32;
            }
            Recommendation::Buy => {
                counts.buy = (50.0 * c + 20.0).floor() as u32;
                counts.strong_buy = (20.0 * c).floor() as u32;
            }
            Recommendation::Hold => {
                counts.buy = (15.0 * (1.0 - c)).floor() as u32;
                counts.sell = (15.0 * (1.0 - c)).floor() as u32;
            }
            Recommendation::Sell => {
                counts.sell = (50.0 * c + 20.0).floor() as u32;
                counts.strong_sell = (20.0 * c).floor() as u32;
            }
            Recommendation::StrongSell => {
                counts.strong_sell = (60.0 * c + 10.0).floor() as u32;
                counts.sell = (30.0 * c).floor() as u32;
            }
        }

        counts.hold =
            100 - counts.strong_buy - counts.buy - counts.sell - counts.strong_sell;
        counts
    }
}
