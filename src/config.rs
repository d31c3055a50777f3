use std::env;

/// Volume projection policy for future forecast dates.
///
/// The forecaster consumes volume as an exogenous regressor, so every
/// future date in the request needs a projected volume value. Both
/// policies have been observed upstream; which one is active is logged
/// at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumePolicy {
    /// Forward-fill the last known volume across all future dates.
    ForwardFill,
    /// Hold the single last observed volume constant for the horizon.
    HoldLast,
}

impl VolumePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "forward_fill" | "ffill" => Some(Self::ForwardFill),
            "hold_last" | "last" => Some(Self::HoldLast),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ForwardFill => "forward_fill",
            Self::HoldLast => "hold_last",
        }
    }
}

/// Which indicator backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorBackendKind {
    /// Wilder smoothing seeded from the first delta (pandas ewm semantics).
    Wilder,
    /// Averages seeded with an SMA over the first period (library style).
    SmaSeeded,
}

impl IndicatorBackendKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wilder" => Some(Self::Wilder),
            "sma_seeded" | "sma" => Some(Self::SmaSeeded),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Wilder => "wilder",
            Self::SmaSeeded => "sma_seeded",
        }
    }
}

/// Thresholds driving the hybrid recommendation rules.
///
/// The reference deployments disagreed on the prophet cutoffs (0 vs 0.5)
/// and the RSI bounds (70/30 vs 75/25), so both live here as named
/// presets rather than constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendThresholds {
    /// Minimum forecast change % for "prophet indicates up".
    pub prophet_up: f64,
    /// Maximum forecast change % for "prophet indicates down".
    pub prophet_down: f64,
    /// RSI above this blocks STRONG_BUY.
    pub rsi_overbought: f64,
    /// RSI below this blocks STRONG_SELL.
    pub rsi_oversold: f64,
    /// Change % at or above which the BUY band starts strong.
    pub strong_buy_pct: f64,
    /// Change % at or above which the BUY band starts.
    pub buy_pct: f64,
    /// Change % at or below which the SELL band starts strong.
    pub strong_sell_pct: f64,
    /// Change % at or below which the SELL band starts.
    pub sell_pct: f64,
}

impl RecommendThresholds {
    /// Zero prophet cutoffs with 70/30 RSI bounds.
    pub fn balanced() -> Self {
        Self {
            prophet_up: 0.0,
            prophet_down: 0.0,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            strong_buy_pct: 2.0,
            buy_pct: 0.5,
            strong_sell_pct: -2.0,
            sell_pct: -0.5,
        }
    }

    /// Half-percent prophet cutoffs with 75/25 RSI bounds.
    pub fn strict() -> Self {
        Self {
            prophet_up: 0.5,
            prophet_down: -0.5,
            rsi_overbought: 75.0,
            rsi_oversold: 25.0,
            strong_buy_pct: 2.0,
            buy_pct: 0.5,
            strong_sell_pct: -2.0,
            sell_pct: -0.5,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "balanced" => Some(Self::balanced()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }
}

impl Default for RecommendThresholds {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Notification fan-out configuration.
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    /// Per-dispatch timeout in seconds.
    pub dispatch_timeout_secs: u64,
    /// Maximum concurrent dispatches.
    pub max_in_flight: usize,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            dispatch_timeout_secs: 10,
            max_in_flight: 4,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Base URL for the historical bar service.
    pub history_service_url: String,
    /// Base URL for the external time-series forecaster.
    pub forecaster_url: String,
    /// Base URL for the user service (watchlist directory).
    pub user_service_url: String,
    /// Base URL for the notification gateway.
    pub notification_service_url: String,
    /// Default forecast horizon in days.
    pub forecast_days: u32,
    /// Default trailing history window for chart assembly.
    pub history_days: usize,
    /// Lookback window for historical bars in days.
    pub lookback_days: u32,
    /// Forecaster request timeout in seconds.
    pub forecaster_timeout_secs: u64,
    /// Volume projection policy for future dates.
    pub volume_policy: VolumePolicy,
    /// Indicator backend strategy.
    pub indicator_backend: IndicatorBackendKind,
    /// Hybrid recommendation thresholds.
    pub thresholds: RecommendThresholds,
    /// Notification fan-out settings.
    pub fanout: FanoutConfig,
    /// SQLite database path for recommendation history.
    pub sqlite_path: String,
    /// Prediction cache TTL in seconds.
    pub cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8086);

        let mut thresholds = env::var("RECOMMEND_PRESET")
            .ok()
            .and_then(|p| RecommendThresholds::preset(&p))
            .unwrap_or_default();

        // Individual overrides on top of the preset.
        if let Some(v) = env_f64("PROPHET_UP_THRESHOLD") {
            thresholds.prophet_up = v;
        }
        if let Some(v) = env_f64("PROPHET_DOWN_THRESHOLD") {
            thresholds.prophet_down = v;
        }
        if let Some(v) = env_f64("RSI_OVERBOUGHT") {
            thresholds.rsi_overbought = v;
        }
        if let Some(v) = env_f64("RSI_OVERSOLD") {
            thresholds.rsi_oversold = v;
        }

        Self {
            host,
            port,
            history_service_url: env::var("HISTORY_SERVICE_URL")
                .unwrap_or_else(|_| "http://stockservice:8082".to_string()),
            forecaster_url: env::var("FORECASTER_URL")
                .unwrap_or_else(|_| "http://forecaster:8090".to_string()),
            user_service_url: env::var("USER_SERVICE_URL")
                .unwrap_or_else(|_| "http://userservice:8081".to_string()),
            notification_service_url: env::var("NOTIFICATION_SERVICE_URL")
                .unwrap_or_else(|_| "http://notificationservice:8085".to_string()),
            forecast_days: env::var("FORECAST_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
            history_days: env::var("HISTORY_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(90),
            lookback_days: env::var("LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(365),
            forecaster_timeout_secs: env::var("FORECASTER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            volume_policy: env::var("VOLUME_POLICY")
                .ok()
                .and_then(|v| VolumePolicy::from_str(&v))
                .unwrap_or(VolumePolicy::ForwardFill),
            indicator_backend: env::var("INDICATOR_BACKEND")
                .ok()
                .and_then(|v| IndicatorBackendKind::from_str(&v))
                .unwrap_or(IndicatorBackendKind::Wilder),
            thresholds,
            fanout: FanoutConfig {
                dispatch_timeout_secs: env::var("NOTIFY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
                max_in_flight: env::var("NOTIFY_MAX_IN_FLIGHT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(4),
            },
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "augur.db".to_string()),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
        }
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
