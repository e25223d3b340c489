//! Publisher service
//!
//! Validates topic names at construction, serializes outbound payloads per
//! topic encoding, and publishes with synchronous confirmation. No retry is
//! performed internally; retry policy is a caller concern.

use psb_domain::error::{Error, Result};
use psb_domain::messages::{OutboundMessage, TopicEncoding};
use psb_domain::ports::BrokerConnection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Immutable reference to one resolved broker-side topic
///
/// Only usable after its existence has been confirmed: an unresolved or
/// nonexistent name is a construction-time error, never a send-time error.
/// The declared encoding is not stored here; typed sends fetch it fresh so
/// an encoding change observed mid-run takes effect on the next call.
#[derive(Debug, Clone)]
struct TopicHandle {
    name: String,
}

/// Publisher over a fixed registry of resolved topics
pub struct Publisher {
    connection: Arc<dyn BrokerConnection>,
    topics: HashMap<String, TopicHandle>,
}

impl Publisher {
    /// Resolve every topic name against the broker and build the registry
    ///
    /// Construction is all-or-nothing: if any name does not exist or its
    /// existence check errors, the whole set is rejected with
    /// [`Error::TopicNotFound`] and no partial publisher is returned.
    pub async fn connect<S: AsRef<str>>(
        connection: Arc<dyn BrokerConnection>,
        topics: &[S],
    ) -> Result<Self> {
        let mut resolved = HashMap::new();

        for name in topics {
            let name = name.as_ref();
            match connection.topic_exists(name).await {
                Ok(true) => {
                    resolved.insert(
                        name.to_string(),
                        TopicHandle {
                            name: name.to_string(),
                        },
                    );
                }
                Ok(false) => return Err(Error::topic_not_found(name)),
                Err(err) => return Err(Error::topic_not_found_with_source(name, err)),
            }
        }

        debug!(topics = resolved.len(), "publisher topic registry resolved");

        Ok(Self {
            connection,
            topics: resolved,
        })
    }

    /// Publish raw bytes to a topic and block until the broker confirms
    /// durable acceptance
    pub async fn publish_raw(
        &self,
        topic: &str,
        payload: Vec<u8>,
        attributes: HashMap<String, String>,
    ) -> Result<()> {
        let handle = self.lookup(topic)?;

        self.connection
            .publish(&handle.name, OutboundMessage::new(payload, attributes))
            .await?;

        debug!(topic = %handle.name, "message published");
        Ok(())
    }

    /// Serialize a typed message per the topic's declared encoding and
    /// publish it with blocking confirmation
    ///
    /// The encoding is fetched from the broker's topic configuration on
    /// every call. An unrecognized encoding fails with
    /// [`Error::UnsupportedEncoding`] without attempting delivery.
    pub async fn publish_typed<M: Serialize + Sync>(
        &self,
        topic: &str,
        message: &M,
        attributes: HashMap<String, String>,
    ) -> Result<()> {
        let handle = self.lookup(topic)?;
        let encoding = self.connection.topic_encoding(&handle.name).await?;

        let payload = match encoding {
            TopicEncoding::Binary => rmp_serde::to_vec_named(message)
                .map_err(|err| Error::encode("binary serialization failed", err))?,
            TopicEncoding::Json => serde_json::to_vec(message)
                .map_err(|err| Error::encode("json serialization failed", err))?,
            TopicEncoding::Unspecified => {
                return Err(Error::unsupported_encoding(&handle.name, encoding.to_string()));
            }
        };

        self.connection
            .publish(&handle.name, OutboundMessage::new(payload, attributes))
            .await?;

        debug!(topic = %handle.name, %encoding, "typed message published");
        Ok(())
    }

    /// The topic names resolved at construction
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    fn lookup(&self, topic: &str) -> Result<&TopicHandle> {
        self.topics
            .get(topic)
            .ok_or_else(|| Error::unknown_topic(topic))
    }
}
