//! Configuration type definitions

/// Top-level application configuration
pub mod app;
/// Broker connection configuration
pub mod broker;
/// Logging configuration
pub mod logging;
/// Subscriber flow-control configuration
pub mod subscriber;

pub use app::AppConfig;
pub use broker::{BrokerConfig, BrokerProvider};
pub use logging::LoggingConfig;
pub use subscriber::SubscriberConfig;
