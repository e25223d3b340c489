//! # Pub/Sub Bridge
//!
//! A thin integration layer between an application and a hosted
//! publish/subscribe message broker.
//!
//! The core is the message delivery subsystem: a [`Publisher`] that selects
//! wire encoding per topic and blocks until the broker confirms delivery,
//! and a [`Subscriber`] that pulls messages under configurable concurrency
//! and backpressure, invokes a caller-supplied handler under a
//! serialization guarantee, and acknowledges conditionally.
//!
//! ## Example
//!
//! ```ignore
//! use psb::application::{Publisher, Subscriber};
//! use psb::domain::FnHandler;
//! use psb::infrastructure::NatsBroker;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! async fn run() -> psb::domain::Result<()> {
//!     let broker = Arc::new(NatsBroker::connect("nats://localhost:4222").await?);
//!
//!     let publisher = Publisher::connect(broker.clone(), &["orders"]).await?;
//!     publisher
//!         .publish_raw("orders", br#"{"a":1}"#.to_vec(), HashMap::new())
//!         .await?;
//!
//!     let subscriber = Subscriber::new(broker);
//!     subscriber.create_and_bind("orders-sub", "orders", 7).await?;
//!     subscriber
//!         .start(Arc::new(FnHandler::new(|event_type, _record| {
//!             event_type == "created"
//!         })))
//!         .await
//! }
//! ```
//!
//! ## Architecture
//!
//! The codebase follows Clean Architecture principles:
//!
//! - `domain` - message types, error taxonomy, handler contract, broker ports
//! - `application` - Publisher and Subscriber services over the ports
//! - `infrastructure` - config, logging, and broker providers (NATS
//!   JetStream, in-process)

/// Domain layer - message types, errors, and broker ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use psb_domain::*;
}

/// Application layer - Publisher and Subscriber services
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use psb_application::*;
}

/// Infrastructure layer - config, logging, and broker providers
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use psb_infrastructure::*;
}
