//! Configuration management
//!
//! Typed configuration sections plus a figment-based loader merging
//! defaults, a TOML file, and `PSB_*` environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, BrokerConfig, BrokerProvider, LoggingConfig, SubscriberConfig};
