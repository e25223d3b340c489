//! # Pub/Sub Bridge Domain Layer
//!
//! Core types and contracts for the message delivery subsystem.
//!
//! This crate contains no infrastructure concerns. It defines:
//!
//! - `error` - the messaging error taxonomy and `Result` alias
//! - `constants` - fixed protocol parameters (ack deadline, attribute keys)
//! - `messages` - topic, subscription, and message value types
//! - `handler` - the caller-supplied record handler contract
//! - `ports` - boundary traits implemented by broker providers
//!
//! ## Architecture
//!
//! Ports follow the Dependency Inversion Principle: the domain defines the
//! broker contract (`BrokerConnection`, `DeliveryStream`, `AckToken`) and the
//! infrastructure layer implements it (NATS JetStream, in-process broker).
//! The application layer (`Publisher`, `Subscriber`) is written against these
//! ports only.

pub mod constants;
pub mod error;
pub mod handler;
pub mod messages;
pub mod ports;

pub use error::{Error, Result};
pub use handler::{FnHandler, RecordHandler};
pub use messages::{
    Delivery, DeliveryMode, OutboundMessage, Record, SubscriptionSettings, TopicEncoding,
};
pub use ports::{AckToken, BrokerConnection, DeliveryStream};
