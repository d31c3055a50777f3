//! Technical indicator computation over a prepared series.
//!
//! Two interchangeable backends exist because the reference deployments
//! disagreed on warmup semantics: `WilderBackend` follows exponential
//! smoothing seeded from the first observation, `SmaSeededBackend`
//! seeds every average with an SMA over the first period.

pub mod sma_seeded;
pub mod wilder;

pub use sma_seeded::SmaSeededBackend;
pub use wilder::WilderBackend;

use crate::config::IndicatorBackendKind;
use crate::types::{IndicatorFrame, PreparedSeries};

/// RSI lookback period.
pub const RSI_PERIOD: usize = 14;
/// MACD fast/slow/signal EMA periods.
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Strategy for deriving RSI, EMA(20/50) and MACD columns.
pub trait IndicatorBackend: Send + Sync {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Compute the full indicator frame. Pure function of the series;
    /// columns are `None` during their warmup span.
    fn compute(&self, series: &PreparedSeries) -> IndicatorFrame;
}

/// Construct the configured backend.
pub fn backend_for(kind: IndicatorBackendKind) -> Box<dyn IndicatorBackend> {
    match kind {
        IndicatorBackendKind::Wilder => Box::new(WilderBackend),
        IndicatorBackendKind::SmaSeeded => Box::new(SmaSeededBackend),
    }
}
