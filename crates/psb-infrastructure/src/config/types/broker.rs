//! Broker connection configuration types

use crate::constants::{DEFAULT_CONNECTION_TIMEOUT_MS, DEFAULT_NATS_CLIENT_NAME, DEFAULT_NATS_URL};
use serde::{Deserialize, Serialize};

/// Broker connection provider types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrokerProvider {
    /// NATS JetStream - the deployment broker
    #[default]
    Nats,
    /// In-process broker - for tests and local development
    Memory,
}

/// Broker connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Broker provider to use
    pub provider: BrokerProvider,

    /// NATS server URL (for the NATS provider)
    /// Example: "nats://localhost:4222"
    pub nats_url: Option<String>,

    /// NATS client name (for the NATS provider)
    pub nats_client_name: Option<String>,

    /// Connection timeout in milliseconds
    pub connection_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            provider: BrokerProvider::Nats,
            nats_url: Some(DEFAULT_NATS_URL.to_string()),
            nats_client_name: Some(DEFAULT_NATS_CLIENT_NAME.to_string()),
            connection_timeout_ms: DEFAULT_CONNECTION_TIMEOUT_MS,
        }
    }
}

impl BrokerConfig {
    /// Create config for NATS
    pub fn nats(url: impl Into<String>) -> Self {
        Self {
            provider: BrokerProvider::Nats,
            nats_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Create config for the in-process broker (testing)
    pub fn memory() -> Self {
        Self {
            provider: BrokerProvider::Memory,
            nats_url: None,
            ..Default::default()
        }
    }
}
