//! Domain layer constants
//!
//! Fixed protocol parameters used by the application layer. Broker- and
//! deployment-specific constants live in the infrastructure crate.

use std::time::Duration;

// ============================================================================
// SUBSCRIPTION CONSTANTS
// ============================================================================

/// Time the broker waits for an acknowledgment before redelivering
pub const ACK_DEADLINE: Duration = Duration::from_secs(60);

/// Minimum subscription expiration allowed by the broker, in days
pub const MIN_EXPIRATION_DAYS: u32 = 1;

/// Default upper bound on unacknowledged messages held by the process
pub const DEFAULT_MAX_OUTSTANDING: usize = 10;

/// Default number of parallel delivery workers requested from the broker client
pub const DEFAULT_CONCURRENCY: usize = 4;

// ============================================================================
// MESSAGE ATTRIBUTE CONSTANTS
// ============================================================================

/// Reserved attribute key carrying the event type of a message
pub const EVENT_TYPE_ATTRIBUTE: &str = "eventType";
