//! Thin HTTP clients for the external collaborators: historical bars,
//! the time-series forecaster, the watchlist directory, and the
//! notification gateway.

pub mod forecaster;
pub mod history;
pub mod notifier;
pub mod userservice;

pub use forecaster::ForecasterClient;
pub use history::HistoryClient;
pub use notifier::NotificationServiceClient;
pub use userservice::UserServiceClient;
