use std::sync::Arc;

use augur::api;
use augur::config::Config;
use augur::services::{ForecastAdapter, NotificationFanout, PredictionService, RecommendationStore};
use augur::sources::{
    ForecasterClient, HistoryClient, NotificationServiceClient, UserServiceClient,
};
use augur::AppState;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Augur server on {}:{}", config.host, config.port);
    info!(
        "Volume policy: {}, indicator backend: {}",
        config.volume_policy.name(),
        config.indicator_backend.name()
    );

    // Recommendation persistence
    let store = Arc::new(RecommendationStore::new(&config.sqlite_path)?);

    // External collaborators
    let history = Arc::new(HistoryClient::new(config.history_service_url.clone()));
    let forecaster = Arc::new(ForecasterClient::new(
        config.forecaster_url.clone(),
        config.forecaster_timeout_secs,
    ));
    let directory = Arc::new(UserServiceClient::new(config.user_service_url.clone()));
    let gateway = Arc::new(NotificationServiceClient::new(
        config.notification_service_url.clone(),
    ));

    // Pipeline services
    let adapter = ForecastAdapter::new(forecaster, config.volume_policy);
    let predictor = Arc::new(PredictionService::new(
        &config,
        history,
        adapter,
        store.clone(),
    ));
    let fanout = Arc::new(NotificationFanout::new(
        directory,
        gateway,
        config.fanout.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        predictor,
        fanout,
        store,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(api::health::health))
        .nest("/api/predictions", api::predictions::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
