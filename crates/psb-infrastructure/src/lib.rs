//! # Pub/Sub Bridge Infrastructure Layer
//!
//! External concerns behind the domain ports:
//!
//! - `brokers` - broker connection providers (NATS JetStream for
//!   deployments, an in-process broker for tests and local runs)
//! - `config` - figment-based configuration loading and validation
//! - `logging` - structured logging bootstrap with tracing
//! - `error_ext` - context extension methods for domain errors
//! - `constants` - deployment-specific constants

pub mod brokers;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;

pub use brokers::{MemoryBroker, NatsBroker};
pub use config::{AppConfig, BrokerConfig, BrokerProvider, ConfigLoader, LoggingConfig, SubscriberConfig};
