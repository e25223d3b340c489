//! Broker Connection Port
//!
//! Defines the contract for the external publish/subscribe broker.
//!
//! ## Architecture
//!
//! The broker is an external service reached over a network API. This port
//! treats its control plane and data plane as request/response operations
//! with a broker-defined retry policy that this layer does not reimplement.
//! Topic creation, partitioning, storage, and redelivery timing all belong
//! to the broker.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | `topic_exists` | Control plane: existence check during resolution |
//! | `topic_encoding` | Control plane: declared wire encoding for a topic |
//! | `publish` | Data plane: send and block until durable acceptance |
//! | `create_subscription` | Control plane: create a subscription on a topic |
//! | `subscribe` | Data plane: open a delivery stream for a subscription |

use crate::error::Result;
use crate::messages::{Delivery, OutboundMessage, SubscriptionSettings, TopicEncoding};
use async_trait::async_trait;

/// Connection to the broker, shared by publishers and subscribers
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// Check whether a topic exists on the broker
    async fn topic_exists(&self, topic: &str) -> Result<bool>;

    /// Fetch the wire encoding declared by the topic's schema configuration
    ///
    /// Fetched fresh on every typed send, so an encoding change observed
    /// mid-run takes effect on the next call.
    async fn topic_encoding(&self, topic: &str) -> Result<TopicEncoding>;

    /// Publish a message and block until the broker confirms durable
    /// acceptance
    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<()>;

    /// Create a subscription bound to a topic
    async fn create_subscription(
        &self,
        name: &str,
        topic: &str,
        settings: &SubscriptionSettings,
    ) -> Result<()>;

    /// Open a delivery stream over an existing subscription
    ///
    /// Flow control follows `settings.delivery_mode`: synchronous streams
    /// enforce `max_outstanding` as a hard ceiling, streaming ones may pull
    /// a batch above it before pausing.
    async fn subscribe(
        &self,
        subscription: &str,
        settings: &SubscriptionSettings,
    ) -> Result<Box<dyn DeliveryStream>>;
}

/// Pull side of one open subscription
#[async_trait]
pub trait DeliveryStream: Send {
    /// Wait for the next delivery
    ///
    /// Returns `Ok(None)` when the broker closes the stream; any later call
    /// also returns `Ok(None)`. A fatal broker error surfaces as `Err`.
    async fn next(&mut self) -> Result<Option<Delivery>>;
}

/// Single-use acknowledgment capability attached to one delivery
///
/// Consuming `self` makes a double ack unrepresentable. Dropping the token
/// leaves the message to broker redelivery.
#[async_trait]
pub trait AckToken: Send {
    /// Tell the broker the delivery was processed successfully
    async fn ack(self: Box<Self>) -> Result<()>;
}
