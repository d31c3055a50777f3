pub mod bar;
pub mod chart;
pub mod forecast;
pub mod indicators;
pub mod notification;
pub mod prediction;

pub use bar::{Bar, PreparedPoint, PreparedSeries, RawBar};
pub use chart::{ChartPoint, ForecastChart};
pub use forecast::{ForecastOutcome, ForecastPoint, ForecastRequest, SeriesRow};
pub use indicators::{IndicatorFrame, IndicatorPoint};
pub use notification::NotificationPayload;
pub use prediction::{
    AnalystCounts, PredictionResult, Recommendation, RecommendationMetadata, RecommendationRecord,
};
