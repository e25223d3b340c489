//! NATS JetStream broker provider
//!
//! Maps the domain broker ports onto JetStream:
//!
//! - topic -> stream (one stream per topic, subject = topic name); the
//!   declared wire encoding is carried in stream metadata under
//!   `payload-encoding`
//! - publish -> JetStream publish + awaited ack, which is the blocking
//!   durable-acceptance confirmation
//! - subscription -> durable pull consumer with explicit ack policy,
//!   `ack_wait` = ack deadline, `inactive_threshold` = expiration, and
//!   `max_ack_pending` = max outstanding
//! - attributes -> message headers
//!
//! Flow control note: `max_ack_pending` is fixed when the consumer is
//! created, so for subscriptions bound with `bind_existing` the broker-side
//! cap of the existing consumer wins over the requested one.

use crate::config::BrokerConfig;
use crate::constants::{DEFAULT_NATS_CLIENT_NAME, ENCODING_METADATA_KEY};
use crate::error_ext::ErrorContext;
use async_nats::jetstream;
use async_trait::async_trait;
use futures::StreamExt;
use psb_domain::error::{Error, Result};
use psb_domain::messages::{
    Delivery, DeliveryMode, OutboundMessage, SubscriptionSettings, TopicEncoding,
};
use psb_domain::ports::{AckToken, BrokerConnection, DeliveryStream};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// NATS JetStream broker connection
pub struct NatsBroker {
    jetstream: jetstream::Context,
}

impl NatsBroker {
    /// Connect to a NATS server
    ///
    /// # Arguments
    ///
    /// * `server_url` - NATS server URL (e.g., "nats://localhost:4222")
    pub async fn connect(server_url: &str) -> Result<Self> {
        debug!("connecting to NATS server: {}", server_url);

        let client = async_nats::ConnectOptions::new()
            .name(DEFAULT_NATS_CLIENT_NAME)
            .connect(server_url)
            .await
            .config_context("failed to connect to NATS")?;

        let jetstream = jetstream::new(client);

        debug!("connected to NATS, JetStream context ready");
        Ok(Self { jetstream })
    }

    /// Connect using a broker configuration section
    pub async fn connect_with_config(config: &BrokerConfig) -> Result<Self> {
        let url = config
            .nats_url
            .as_deref()
            .ok_or_else(|| Error::configuration("NATS URL is not configured"))?;

        let client = async_nats::ConnectOptions::new()
            .name(
                config
                    .nats_client_name
                    .as_deref()
                    .unwrap_or(DEFAULT_NATS_CLIENT_NAME),
            )
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
            .connect(url)
            .await
            .config_context("failed to connect to NATS")?;

        let jetstream = jetstream::new(client);
        Ok(Self { jetstream })
    }

    /// Control plane: create the stream backing a topic if it doesn't exist,
    /// declaring its wire encoding in stream metadata
    pub async fn ensure_topic(&self, topic: &str, encoding: TopicEncoding) -> Result<()> {
        let mut metadata = HashMap::new();
        metadata.insert(ENCODING_METADATA_KEY.to_string(), encoding.to_string());

        self.jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: stream_name(topic),
                subjects: vec![topic.to_string()],
                metadata,
                ..Default::default()
            })
            .await
            .config_context(format!("failed to create stream for {topic}"))?;

        debug!(topic, "stream ready");
        Ok(())
    }
}

#[async_trait]
impl BrokerConnection for NatsBroker {
    async fn topic_exists(&self, topic: &str) -> Result<bool> {
        match self.jetstream.get_stream(stream_name(topic)).await {
            Ok(_) => Ok(true),
            // async-nats surfaces "stream not found" through the error
            // display rather than a dedicated variant
            Err(err) if err.to_string().to_lowercase().contains("not found") => Ok(false),
            Err(err) => Err(Error::topic_not_found_with_source(topic, err)),
        }
    }

    async fn topic_encoding(&self, topic: &str) -> Result<TopicEncoding> {
        let mut stream = self
            .jetstream
            .get_stream(stream_name(topic))
            .await
            .publish_context("topic configuration fetch failed")?;

        let info = stream
            .info()
            .await
            .publish_context("topic configuration fetch failed")?;

        Ok(
            match info
                .config
                .metadata
                .get(ENCODING_METADATA_KEY)
                .map(String::as_str)
            {
                Some("binary") => TopicEncoding::Binary,
                Some("json") => TopicEncoding::Json,
                _ => TopicEncoding::Unspecified,
            },
        )
    }

    async fn publish(&self, topic: &str, message: OutboundMessage) -> Result<()> {
        let mut headers = async_nats::HeaderMap::new();
        for (key, value) in &message.attributes {
            headers.insert(key.as_str(), value.as_str());
        }

        let ack_future = self
            .jetstream
            .publish_with_headers(topic.to_string(), headers, message.payload.into())
            .await
            .publish_context("broker rejected publish")?;

        // Block until JetStream confirms durable acceptance
        let ack = ack_future
            .await
            .publish_context("publish confirmation failed")?;

        debug!(topic, sequence = ack.sequence, "publish confirmed");
        Ok(())
    }

    async fn create_subscription(
        &self,
        name: &str,
        topic: &str,
        settings: &SubscriptionSettings,
    ) -> Result<()> {
        let stream = self
            .jetstream
            .get_stream(stream_name(topic))
            .await
            .subscription_context(format!("no stream for topic {topic}"))?;

        stream
            .create_consumer(jetstream::consumer::pull::Config {
                durable_name: Some(name.to_string()),
                ack_policy: jetstream::consumer::AckPolicy::Explicit,
                ack_wait: settings.ack_deadline,
                inactive_threshold: settings.expiration,
                max_ack_pending: i64::try_from(settings.max_outstanding).unwrap_or(i64::MAX),
                ..Default::default()
            })
            .await
            .subscription_context(format!("failed to create consumer {name}"))?;

        debug!(subscription = name, topic, "consumer created");
        Ok(())
    }

    async fn subscribe(
        &self,
        subscription: &str,
        settings: &SubscriptionSettings,
    ) -> Result<Box<dyn DeliveryStream>> {
        let mut consumer: Option<jetstream::consumer::PullConsumer> = None;
        for stream_name in self.stream_names().await? {
            let stream = self
                .jetstream
                .get_stream(&stream_name)
                .await
                .receive_context("stream lookup failed")?;
            if let Ok(found) = stream.get_consumer(subscription).await {
                consumer = Some(found);
                break;
            }
        }

        let consumer = consumer.ok_or_else(|| {
            Error::receive(format!("no such subscription: {subscription}"))
        })?;

        let messages = match settings.delivery_mode {
            // Batched pulls; the broker may deliver past max_ack_pending
            // of the original consumer config before pausing
            DeliveryMode::Streaming => consumer
                .stream()
                .max_messages_per_batch(settings.max_outstanding.max(1) * 2)
                .messages()
                .await
                .receive_context("failed to open stream")?,
            DeliveryMode::Synchronous => consumer
                .stream()
                .max_messages_per_batch(1)
                .messages()
                .await
                .receive_context("failed to open stream")?,
        };

        debug!(subscription, "delivery stream opened");
        Ok(Box::new(NatsDeliveryStream { messages }))
    }
}

/// Pull side of one JetStream consumer
struct NatsDeliveryStream {
    messages: jetstream::consumer::pull::Stream,
}

#[async_trait]
impl DeliveryStream for NatsDeliveryStream {
    async fn next(&mut self) -> Result<Option<Delivery>> {
        match self.messages.next().await {
            Some(Ok(message)) => {
                let payload = message.payload.to_vec();
                let mut attributes = HashMap::new();
                if let Some(headers) = message.headers.as_ref() {
                    for (name, values) in headers.iter() {
                        if let Some(value) = values.first() {
                            attributes.insert(name.to_string(), value.to_string());
                        }
                    }
                }
                Ok(Some(Delivery::new(
                    payload,
                    attributes,
                    Box::new(NatsAckToken { message }),
                )))
            }
            Some(Err(err)) => Err(Error::receive_with_source("message pull failed", err)),
            None => Ok(None),
        }
    }
}

/// Single-use acknowledgment for one JetStream delivery
///
/// Dropping the token leaves the message to ack-deadline redelivery.
struct NatsAckToken {
    message: jetstream::Message,
}

#[async_trait]
impl AckToken for NatsAckToken {
    async fn ack(self: Box<Self>) -> Result<()> {
        self.message
            .ack()
            .await
            .map_err(|err| Error::internal(format!("ack failed: {err}")))
    }
}

impl NatsBroker {
    /// List the stream names known to this JetStream context
    async fn stream_names(&self) -> Result<Vec<String>> {
        let mut names = self.jetstream.stream_names();
        let mut out = Vec::new();
        while let Some(name) = names.next().await {
            out.push(name.receive_context("stream listing failed")?);
        }
        Ok(out)
    }
}

/// Stream name backing a topic
fn stream_name(topic: &str) -> String {
    topic.replace(['.', ' ', '*', '>'], "_").to_uppercase()
}
