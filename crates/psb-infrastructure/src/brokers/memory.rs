//! In-process broker provider
//!
//! A faithful test double for the external broker: per-subscription queues,
//! outstanding-message tracking, both delivery modes, and redelivery of
//! dropped un-acked deliveries. Redelivery happens on drop rather than
//! after the ack deadline, so tests observe it without waiting.
//!
//! Control-plane helpers (`create_topic`, `set_topic_encoding`) stand in
//! for broker-side administration; queue and outstanding counters are
//! exposed for test assertions.

use psb_domain::error::{Error, Result};
use psb_domain::messages::{
    Delivery, DeliveryMode, OutboundMessage, SubscriptionSettings, TopicEncoding,
};
use psb_domain::ports::{AckToken, BrokerConnection, DeliveryStream};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::debug;

#[derive(Clone)]
struct StoredMessage {
    payload: Vec<u8>,
    attributes: HashMap<String, String>,
}

struct TopicState {
    encoding: TopicEncoding,
}

struct SubscriptionState {
    topic: String,
    pending: VecDeque<StoredMessage>,
    outstanding: usize,
    notify: Arc<Notify>,
}

#[derive(Default)]
struct BrokerState {
    topics: HashMap<String, TopicState>,
    subscriptions: HashMap<String, SubscriptionState>,
}

/// In-process broker backing tests and local runs
#[derive(Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl MemoryBroker {
    /// Create an empty broker with no topics or subscriptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Control plane: create a topic with a declared encoding
    pub fn create_topic(&self, name: &str, encoding: TopicEncoding) {
        self.state
            .lock()
            .unwrap()
            .topics
            .insert(name.to_string(), TopicState { encoding });
    }

    /// Control plane: change a topic's declared encoding mid-run
    pub fn set_topic_encoding(&self, name: &str, encoding: TopicEncoding) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let topic = state
            .topics
            .get_mut(name)
            .ok_or_else(|| Error::internal(format!("no such topic: {name}")))?;
        topic.encoding = encoding;
        Ok(())
    }

    /// Number of messages queued for a subscription, not yet delivered
    pub fn pending_count(&self, subscription: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription)
            .map_or(0, |sub| sub.pending.len())
    }

    /// Number of delivered but unacknowledged messages on a subscription
    pub fn outstanding_count(&self, subscription: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription)
            .map_or(0, |sub| sub.outstanding)
    }
}

#[async_trait]
impl BrokerConnection for MemoryBroker {
    async fn topic_exists(&self, topic: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().topics.contains_key(topic))
    }

    async fn topic_encoding(&self, topic: &str) -> Result<TopicEncoding> {
        self.state
            .lock()
            .unwrap()
            .topics
            .get(topic)
            .map(|t| t.encoding)
            .ok_or_else(|| Error::publish(format!("topic configuration unavailable: {topic}")))
    }

    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.topics.contains_key(topic) {
            return Err(Error::publish(format!("no such topic: {topic}")));
        }

        let stored = StoredMessage {
            payload: message.payload,
            attributes: message.attributes,
        };

        // Fan out to every subscription bound to this topic; acceptance is
        // durable once queued, which is this broker's confirmation.
        for sub in state
            .subscriptions
            .values_mut()
            .filter(|sub| sub.topic == topic)
        {
            sub.pending.push_back(stored.clone());
            sub.notify.notify_one();
        }

        Ok(())
    }

    async fn create_subscription(
        &self,
        name: &str,
        topic: &str,
        _settings: &SubscriptionSettings,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.topics.contains_key(topic) {
            return Err(Error::subscription_create(format!(
                "no such topic: {topic}"
            )));
        }
        if state.subscriptions.contains_key(name) {
            return Err(Error::subscription_create(format!(
                "subscription already exists: {name}"
            )));
        }

        state.subscriptions.insert(
            name.to_string(),
            SubscriptionState {
                topic: topic.to_string(),
                pending: VecDeque::new(),
                outstanding: 0,
                notify: Arc::new(Notify::new()),
            },
        );

        debug!(subscription = name, topic, "subscription created");
        Ok(())
    }

    async fn subscribe(
        &self,
        subscription: &str,
        settings: &SubscriptionSettings,
    ) -> Result<Box<dyn DeliveryStream>> {
        let state = self.state.lock().unwrap();
        if !state.subscriptions.contains_key(subscription) {
            return Err(Error::receive(format!(
                "no such subscription: {subscription}"
            )));
        }

        Ok(Box::new(MemoryDeliveryStream {
            state: Arc::clone(&self.state),
            subscription: subscription.to_string(),
            delivery_mode: settings.delivery_mode,
            max_outstanding: settings.max_outstanding,
        }))
    }
}

/// Pull side of one in-process subscription
struct MemoryDeliveryStream {
    state: Arc<Mutex<BrokerState>>,
    subscription: String,
    delivery_mode: DeliveryMode,
    max_outstanding: usize,
}

#[async_trait]
impl DeliveryStream for MemoryDeliveryStream {
    async fn next(&mut self) -> Result<Option<Delivery>> {
        loop {
            let notify = {
                let mut state = self.state.lock().unwrap();
                let sub = state
                    .subscriptions
                    .get_mut(&self.subscription)
                    .ok_or_else(|| {
                        Error::receive(format!("subscription removed: {}", self.subscription))
                    })?;

                // Synchronous mode holds the outstanding cap as a hard
                // ceiling; streaming mode may burst above it.
                let capped = self.delivery_mode == DeliveryMode::Synchronous
                    && sub.outstanding >= self.max_outstanding;

                if !capped {
                    if let Some(message) = sub.pending.pop_front() {
                        sub.outstanding += 1;
                        let ack = MemoryAckToken {
                            state: Arc::clone(&self.state),
                            subscription: self.subscription.clone(),
                            message: Some(message.clone()),
                        };
                        return Ok(Some(Delivery::new(
                            message.payload,
                            message.attributes,
                            Box::new(ack),
                        )));
                    }
                }

                Arc::clone(&sub.notify)
            };

            // Wait for a publish or an ack to free the cap. notify_one
            // stores a permit, so a wakeup between unlock and await is
            // not lost.
            notify.notified().await;
        }
    }
}

/// Single-use acknowledgment for one in-process delivery
///
/// Dropping the token without acknowledging requeues the message, which
/// stands in for ack-deadline redelivery.
struct MemoryAckToken {
    state: Arc<Mutex<BrokerState>>,
    subscription: String,
    message: Option<StoredMessage>,
}

#[async_trait]
impl AckToken for MemoryAckToken {
    async fn ack(mut self: Box<Self>) -> Result<()> {
        self.message.take();
        let mut state = self.state.lock().unwrap();
        if let Some(sub) = state.subscriptions.get_mut(&self.subscription) {
            sub.outstanding = sub.outstanding.saturating_sub(1);
            sub.notify.notify_one();
        }
        Ok(())
    }
}

impl Drop for MemoryAckToken {
    fn drop(&mut self) {
        if let Some(message) = self.message.take() {
            if let Ok(mut state) = self.state.lock() {
                if let Some(sub) = state.subscriptions.get_mut(&self.subscription) {
                    sub.outstanding = sub.outstanding.saturating_sub(1);
                    sub.pending.push_back(message);
                    sub.notify.notify_one();
                }
            }
        }
    }
}
