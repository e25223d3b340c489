//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Pub/Sub Bridge
#[derive(Error, Debug)]
pub enum Error {
    /// A topic name could not be resolved against the broker at construction
    #[error("couldn't find topic {topic}")]
    TopicNotFound {
        /// The topic name that failed resolution
        topic: String,
        /// Optional source error from the existence check
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A publish call named a topic outside the resolved set
    #[error("invalid topic specified: {topic}")]
    UnknownTopic {
        /// The topic name that was not resolved at construction
        topic: String,
    },

    /// The broker-declared topic encoding is not one this layer can produce
    #[error("invalid encoding for topic {topic}: {encoding}")]
    UnsupportedEncoding {
        /// The topic whose configuration was fetched
        topic: String,
        /// The encoding value reported by the broker
        encoding: String,
    },

    /// Serialization of a typed message failed before any publish attempt
    #[error("encode error: {message}")]
    Encode {
        /// Description of the serialization failure
        message: String,
        /// The underlying codec error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The broker rejected a publish or timed out confirming it
    #[error("publish error: {message}")]
    Publish {
        /// Description of the publish failure
        message: String,
        /// Optional source error from the broker client
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The broker rejected subscription creation
    #[error("subscription create error: {message}")]
    SubscriptionCreate {
        /// Description of the creation failure
        message: String,
        /// Optional source error from the broker client
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The receive loop terminated on an unrecoverable broker error
    #[error("receive error: {message}")]
    Receive {
        /// Description of the receive failure
        message: String,
        /// Optional source error from the broker client
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration-related error
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operation was called in the wrong subscriber lifecycle state
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the state violation
        message: String,
    },

    /// Internal system error
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Topic resolution error creation methods
impl Error {
    /// Create a topic-not-found error
    pub fn topic_not_found<S: Into<String>>(topic: S) -> Self {
        Self::TopicNotFound {
            topic: topic.into(),
            source: None,
        }
    }

    /// Create a topic-not-found error with source
    pub fn topic_not_found_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        topic: S,
        source: E,
    ) -> Self {
        Self::TopicNotFound {
            topic: topic.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unknown-topic error
    pub fn unknown_topic<S: Into<String>>(topic: S) -> Self {
        Self::UnknownTopic {
            topic: topic.into(),
        }
    }

    /// Create an unsupported-encoding error
    pub fn unsupported_encoding<S: Into<String>, E: Into<String>>(topic: S, encoding: E) -> Self {
        Self::UnsupportedEncoding {
            topic: topic.into(),
            encoding: encoding.into(),
        }
    }
}

// Publish-path error creation methods
impl Error {
    /// Create an encode error with source
    pub fn encode<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Encode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a publish error
    pub fn publish<S: Into<String>>(message: S) -> Self {
        Self::Publish {
            message: message.into(),
            source: None,
        }
    }

    /// Create a publish error with source
    pub fn publish_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Publish {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Subscription-path error creation methods
impl Error {
    /// Create a subscription-create error
    pub fn subscription_create<S: Into<String>>(message: S) -> Self {
        Self::SubscriptionCreate {
            message: message.into(),
            source: None,
        }
    }

    /// Create a subscription-create error with source
    pub fn subscription_create_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::SubscriptionCreate {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a receive error
    pub fn receive<S: Into<String>>(message: S) -> Self {
        Self::Receive {
            message: message.into(),
            source: None,
        }
    }

    /// Create a receive error with source
    pub fn receive_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Receive {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration and lifecycle error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_topic() {
        let err = Error::topic_not_found("orders");
        assert_eq!(err.to_string(), "couldn't find topic orders");

        let err = Error::unknown_topic("orders");
        assert_eq!(err.to_string(), "invalid topic specified: orders");
    }

    #[test]
    fn test_unsupported_encoding_display() {
        let err = Error::unsupported_encoding("orders", "ENCODING_UNSPECIFIED");
        assert_eq!(
            err.to_string(),
            "invalid encoding for topic orders: ENCODING_UNSPECIFIED"
        );
    }

    #[test]
    fn test_error_source_is_preserved() {
        let io = std::io::Error::other("connection reset");
        let err = Error::publish_with_source("broker rejected message", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
