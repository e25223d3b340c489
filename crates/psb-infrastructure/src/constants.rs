//! Infrastructure layer constants
//!
//! Deployment- and broker-specific constants. Protocol-level constants
//! (ack deadline, attribute keys) live in `psb_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "PSB";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "pubsub-bridge.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "pubsub-bridge";

/// Environment variable consulted for the tracing filter
pub const LOG_ENV_VAR: &str = "PSB_LOG";

// ============================================================================
// NATS CONSTANTS
// ============================================================================

/// Default NATS server URL
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Default NATS client name
pub const DEFAULT_NATS_CLIENT_NAME: &str = "pubsub-bridge";

/// Default connection timeout in milliseconds
pub const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5000;

/// Stream metadata key declaring the topic's wire encoding
pub const ENCODING_METADATA_KEY: &str = "payload-encoding";
