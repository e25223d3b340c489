//! Domain Port Interfaces
//!
//! Boundary contracts between the messaging domain and broker providers.
//! The domain defines the interfaces; infrastructure implements them
//! (NATS JetStream for deployments, an in-process broker for tests).

/// Broker control-plane and delivery ports
pub mod broker;

pub use broker::{AckToken, BrokerConnection, DeliveryStream};
