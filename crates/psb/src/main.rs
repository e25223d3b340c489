//! Pub/Sub Bridge - Entry Point
//!
//! Command-line front end for the bridge, wired through the configuration
//! loader and the logging bootstrap.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `psb create-topic` | Create the stream backing a topic with a declared encoding |
//! | `psb publish` | Publish one message and wait for broker confirmation |
//! | `psb listen` | Bind (or create) a subscription and print deliveries |

use clap::{Parser, Subcommand};
use psb_application::{Publisher, Subscriber};
use psb_domain::constants::EVENT_TYPE_ATTRIBUTE;
use psb_domain::handler::FnHandler;
use psb_domain::messages::TopicEncoding;
use psb_domain::ports::BrokerConnection;
use psb_infrastructure::config::ConfigLoader;
use psb_infrastructure::config::types::BrokerProvider;
use psb_infrastructure::brokers::NatsBroker;
use psb_infrastructure::logging::init_logging;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Command line interface for the Pub/Sub Bridge
#[derive(Parser, Debug)]
#[command(name = "psb")]
#[command(about = "Pub/Sub Bridge - publish and consume broker messages")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the stream backing a topic, declaring its wire encoding
    CreateTopic {
        /// Topic name
        #[arg(long)]
        topic: String,

        /// Declared wire encoding: binary, json, or unspecified
        #[arg(long, default_value = "json")]
        encoding: String,
    },

    /// Publish one message and block until the broker confirms it
    Publish {
        /// Topic name (must already exist)
        #[arg(long)]
        topic: String,

        /// Message payload (JSON object expected by subscribers)
        #[arg(long)]
        payload: String,

        /// Optional eventType attribute
        #[arg(long)]
        event_type: Option<String>,
    },

    /// Bind a subscription and print deliveries until Ctrl-C
    Listen {
        /// Subscription name
        #[arg(long)]
        subscription: String,

        /// Create the subscription on this topic instead of binding to an
        /// existing one
        #[arg(long)]
        topic: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load()?;

    init_logging(&config.logging)?;

    if config.broker.provider != BrokerProvider::Nats {
        return Err(Box::from(
            "the in-process broker is test-only; configure broker.provider = \"nats\"",
        ));
    }
    let broker = Arc::new(NatsBroker::connect_with_config(&config.broker).await?);

    match cli.command {
        Command::CreateTopic { topic, encoding } => {
            let encoding = match encoding.as_str() {
                "binary" => TopicEncoding::Binary,
                "json" => TopicEncoding::Json,
                _ => TopicEncoding::Unspecified,
            };
            broker.ensure_topic(&topic, encoding).await?;
            info!(topic, %encoding, "topic ready");
        }
        Command::Publish {
            topic,
            payload,
            event_type,
        } => {
            let publisher = Publisher::connect(
                Arc::clone(&broker) as Arc<dyn BrokerConnection>,
                &[topic.as_str()],
            )
            .await?;

            let mut attributes = HashMap::new();
            if let Some(event_type) = event_type {
                attributes.insert(EVENT_TYPE_ATTRIBUTE.to_string(), event_type);
            }

            publisher
                .publish_raw(&topic, payload.into_bytes(), attributes)
                .await?;
            info!(topic, "message published and confirmed");
        }
        Command::Listen {
            subscription,
            topic,
        } => {
            let subscriber = Arc::new(Subscriber::new(
                Arc::clone(&broker) as Arc<dyn BrokerConnection>
            ));

            if let Some(topic) = topic {
                subscriber
                    .create_and_bind(&subscription, &topic, config.subscriber.expiration_days)
                    .await?;
            } else {
                subscriber.bind_existing(
                    &subscription,
                    config.subscriber.delivery_mode,
                    config.subscriber.concurrency,
                    config.subscriber.max_outstanding,
                )?;
            }

            // Ctrl-C requests cooperative cancellation; an in-flight
            // delivery still completes before the loop ends.
            let stopper = Arc::clone(&subscriber);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("shutdown requested");
                    stopper.stop();
                }
            });

            subscriber
                .start(Arc::new(FnHandler::new(|event_type, record| {
                    info!(
                        event_type,
                        record = %serde_json::Value::Object(record),
                        "delivery"
                    );
                    true
                })))
                .await?;
        }
    }

    Ok(())
}
