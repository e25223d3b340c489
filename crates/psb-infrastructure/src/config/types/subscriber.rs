//! Subscriber flow-control configuration types

use psb_domain::constants::{DEFAULT_CONCURRENCY, DEFAULT_MAX_OUTSTANDING, MIN_EXPIRATION_DAYS};
use psb_domain::messages::DeliveryMode;
use serde::{Deserialize, Serialize};

/// Subscriber flow-control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberConfig {
    /// Pull strategy: synchronous enforces the outstanding cap strictly,
    /// streaming may burst above it
    pub delivery_mode: DeliveryMode,

    /// Number of parallel delivery workers requested from the broker client
    pub concurrency: usize,

    /// Upper bound on unacknowledged messages held by the process
    pub max_outstanding: usize,

    /// Subscription expiration in days for created subscriptions
    /// (the broker rejects values below one day)
    pub expiration_days: u32,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::Synchronous,
            concurrency: DEFAULT_CONCURRENCY,
            max_outstanding: DEFAULT_MAX_OUTSTANDING,
            expiration_days: MIN_EXPIRATION_DAYS,
        }
    }
}
