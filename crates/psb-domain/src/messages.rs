//! Message, topic, and subscription value types
//!
//! These types carry no broker-client state. Broker handles (streams,
//! consumers, ack tokens) are reached through the traits in [`crate::ports`].

use crate::constants::{ACK_DEADLINE, EVENT_TYPE_ATTRIBUTE, MIN_EXPIRATION_DAYS};
use crate::error::Result;
use crate::ports::AckToken;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Decoded message body: a structured key/value record
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Wire encoding declared by the broker-side schema configuration of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicEncoding {
    /// Canonical binary serialization of the typed message
    Binary,
    /// Canonical JSON serialization preserving field names
    Json,
    /// No encoding declared; typed sends are rejected
    Unspecified,
}

impl std::fmt::Display for TopicEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Json => write!(f, "json"),
            Self::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Pull strategy for a subscription
///
/// `Synchronous` guarantees the outstanding-message cap is a hard ceiling.
/// `Streaming` trades that guarantee for throughput: the broker may deliver
/// a batch larger than the cap before pausing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Strict outstanding cap, one pull at a time
    #[default]
    Synchronous,
    /// Bursty batched pulls, soft outstanding target
    Streaming,
}

/// An outbound message handed to the broker
///
/// Constructed immediately before send and discarded afterwards; the caller
/// learns success only via the blocking publish confirmation.
#[derive(Debug, Clone, Default)]
pub struct OutboundMessage {
    /// Opaque payload bytes
    pub payload: Vec<u8>,
    /// Out-of-band metadata, order-irrelevant
    pub attributes: HashMap<String, String>,
}

impl OutboundMessage {
    /// Create a message from payload bytes and attributes
    pub fn new(payload: Vec<u8>, attributes: HashMap<String, String>) -> Self {
        Self {
            payload,
            attributes,
        }
    }
}

/// Flow-control and redelivery parameters for one subscription
#[derive(Debug, Clone)]
pub struct SubscriptionSettings {
    /// Time the broker waits for an ack before redelivering
    pub ack_deadline: Duration,
    /// Subscription inactivity window after which the broker may reclaim it
    pub expiration: Duration,
    /// Upper bound on unacknowledged messages held by the process
    pub max_outstanding: usize,
    /// Parallel delivery workers requested from the broker client
    pub concurrency: usize,
    /// Pull strategy
    pub delivery_mode: DeliveryMode,
}

impl SubscriptionSettings {
    /// Build settings with the fixed ack deadline and a clamped expiration
    ///
    /// The broker rejects expirations below one day, so `expiration_days`
    /// is clamped to [`MIN_EXPIRATION_DAYS`].
    pub fn new(
        expiration_days: u32,
        max_outstanding: usize,
        concurrency: usize,
        delivery_mode: DeliveryMode,
    ) -> Self {
        let days = expiration_days.max(MIN_EXPIRATION_DAYS);
        Self {
            ack_deadline: ACK_DEADLINE,
            expiration: Duration::from_secs(u64::from(days) * 24 * 60 * 60),
            max_outstanding,
            concurrency,
            delivery_mode,
        }
    }
}

/// One delivered message plus its single-use acknowledgment capability
///
/// Acknowledging consumes the delivery, so an ack can be issued at most once.
/// Dropping a `Delivery` without acknowledging is always safe: the broker
/// redelivers after the ack deadline.
pub struct Delivery {
    /// Opaque payload bytes, expected to decode as a structured record
    pub payload: Vec<u8>,
    /// Message attributes as delivered by the broker
    pub attributes: HashMap<String, String>,
    ack: Box<dyn AckToken>,
}

impl Delivery {
    /// Create a delivery from broker payload, attributes, and ack capability
    pub fn new(
        payload: Vec<u8>,
        attributes: HashMap<String, String>,
        ack: Box<dyn AckToken>,
    ) -> Self {
        Self {
            payload,
            attributes,
            ack,
        }
    }

    /// The reserved `eventType` attribute, or the empty string if absent
    pub fn event_type(&self) -> &str {
        self.attributes
            .get(EVENT_TYPE_ATTRIBUTE)
            .map_or("", String::as_str)
    }

    /// Acknowledge this delivery with the broker
    pub async fn ack(self) -> Result<()> {
        self.ack.ack().await
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("payload_len", &self.payload.len())
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
