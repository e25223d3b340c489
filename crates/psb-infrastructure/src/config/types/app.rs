//! Top-level application configuration

use super::{BrokerConfig, LoggingConfig, SubscriberConfig};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Broker connection settings
    pub broker: BrokerConfig,

    /// Subscriber flow-control settings
    pub subscriber: SubscriberConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}
