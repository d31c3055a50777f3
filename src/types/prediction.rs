use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Directional trading recommendation produced by the hybrid rule
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG_SELL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "STRONG_BUY" => Some(Self::StrongBuy),
            "BUY" => Some(Self::Buy),
            "HOLD" => Some(Self::Hold),
            "SELL" => Some(Self::Sell),
            "STRONG_SELL" => Some(Self::StrongSell),
            _ => None,
        }
    }
}

/// Outcome of one fit-and-forecast cycle for a symbol. Immutable after
/// creation; owned by the caller that requested it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub symbol: String,
    pub forecast_days: u32,
    pub prediction_date: NaiveDate,
    pub current_price: f64,
    pub predicted_price: f64,
    pub change_percent: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub recommendation: Recommendation,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl PredictionResult {
    /// Confidence score in [0, 1] derived from the forecast magnitude.
    /// A 20% predicted move (or more) maps to full confidence.
    pub fn confidence(&self) -> f64 {
        (self.change_percent.abs() / 20.0).clamp(0.0, 1.0)
    }
}

/// Synthetic analyst vote counts. Always sums to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystCounts {
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl AnalystCounts {
    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }
}

/// Numeric context carried alongside a recommendation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub predicted_price: f64,
    pub current_price: f64,
    pub change_percent: f64,
    pub rsi: Option<f64>,
    pub ema20: Option<f64>,
    pub macd: Option<f64>,
}

/// Persisted recommendation with simulated analyst counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
    pub id: Uuid,
    pub symbol: String,
    pub period: NaiveDate,
    #[serde(flatten)]
    pub counts: AnalystCounts,
    pub recommendation: Recommendation,
    pub metadata: RecommendationMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_round_trip() {
        for rec in [
            Recommendation::StrongBuy,
            Recommendation::Buy,
            Recommendation::Hold,
            Recommendation::Sell,
            Recommendation::StrongSell,
        ] {
            assert_eq!(Recommendation::from_str(rec.as_str()), Some(rec));
        }
        assert_eq!(Recommendation::from_str("MAYBE"), None);
    }

    #[test]
    fn test_recommendation_serde_names() {
        let json = serde_json::to_string(&Recommendation::StrongBuy).unwrap();
        assert_eq!(json, "\"STRONG_BUY\"");
    }

    #[test]
    fn test_confidence_clamps_at_one() {
        let result = PredictionResult {
            symbol: "FPT".to_string(),
            forecast_days: 7,
            prediction_date: NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
            current_price: 100.0,
            predicted_price: 150.0,
            change_percent: 50.0,
            confidence_lower: 140.0,
            confidence_upper: 160.0,
            recommendation: Recommendation::StrongBuy,
            rsi: Some(60.0),
            macd: None,
            ema20: Some(98.0),
            ema50: Some(95.0),
            created_at: Utc::now(),
        };
        assert_eq!(result.confidence(), 1.0);
    }
}
