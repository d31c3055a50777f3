//! Core services for the prediction pipeline.
//!
//! Control flow per request: DataPreparer -> IndicatorEngine ->
//! ForecastAdapter -> RecommendationEngine, then persistence and the
//! notification fan-out as side-effect paths, ChartAssembler as the
//! alternate read path.

pub mod cache;
pub mod chart;
pub mod fanout;
pub mod forecast;
pub mod indicators;
pub mod predictor;
pub mod preparer;
pub mod recommend;
pub mod store;

pub use cache::Cache;
pub use chart::ChartAssembler;
pub use fanout::{NotificationFanout, NotificationGateway, WatchlistDirectory};
pub use forecast::{ForecastAdapter, Forecaster};
pub use indicators::{IndicatorBackend, SmaSeededBackend, WilderBackend};
pub use predictor::{BarSource, PredictionService};
pub use preparer::DataPreparer;
pub use recommend::{AnalystCountSimulator, RecommendationEngine};
pub use store::RecommendationStore;
