//! Error extension utilities
//!
//! Context extension methods mapping external errors into the domain
//! taxonomy while keeping the original error as source.
//!
//! # Example
//!
//! ```ignore
//! use psb_infrastructure::error_ext::ErrorContext;
//!
//! let client = async_nats::connect(&url)
//!     .await
//!     .config_context("failed to connect to NATS")?;
//! ```

use psb_domain::error::{Error, Result};
use std::fmt;

/// Extension trait for adding context to results from external crates
pub trait ErrorContext<T> {
    /// Add context for configuration and connection setup operations
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for publish-path operations
    fn publish_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for subscription-creation operations
    fn subscription_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for receive-path operations
    fn receive_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Configuration {
            message: format!("{}: {}", context, err),
            source: Some(Box::new(err)),
        })
    }

    fn publish_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Publish {
            message: format!("{}: {}", context, err),
            source: Some(Box::new(err)),
        })
    }

    fn subscription_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::SubscriptionCreate {
            message: format!("{}: {}", context, err),
            source: Some(Box::new(err)),
        })
    }

    fn receive_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Receive {
            message: format!("{}: {}", context, err),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing() -> std::result::Result<(), std::io::Error> {
        Err(std::io::Error::other("connection reset"))
    }

    #[test]
    fn test_config_context_maps_variant() {
        let err = failing().config_context("failed to connect").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert_eq!(
            err.to_string(),
            "configuration error: failed to connect: connection reset"
        );
    }

    #[test]
    fn test_publish_context_maps_variant() {
        let err = failing().publish_context("broker rejected publish").unwrap_err();
        assert!(matches!(err, Error::Publish { .. }));
    }

    #[test]
    fn test_subscription_context_maps_variant() {
        let err = failing()
            .subscription_context("failed to create consumer orders-sub")
            .unwrap_err();
        assert!(matches!(err, Error::SubscriptionCreate { .. }));
        assert!(err.to_string().contains("orders-sub"));
    }

    #[test]
    fn test_receive_context_preserves_source() {
        let err = failing().receive_context("stream lookup failed").unwrap_err();
        assert!(matches!(err, Error::Receive { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
