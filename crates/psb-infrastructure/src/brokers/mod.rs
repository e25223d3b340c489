//! Broker connection providers
//!
//! Implementations of the domain broker ports:
//!
//! - `nats` - NATS JetStream, the deployment broker
//! - `memory` - in-process broker for tests and local development

pub mod memory;
pub mod nats;

pub use memory::MemoryBroker;
pub use nats::NatsBroker;
