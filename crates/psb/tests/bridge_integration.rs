//! End-to-end tests over the in-process broker
//!
//! Exercise the full path: publisher encoding selection, broker fan-out,
//! subscriber receive loop, conditional acknowledgment, and cooperative
//! stop, with the broker's queue counters as ground truth.

use psb::application::{Publisher, Subscriber};
use psb::domain::handler::FnHandler;
use psb::domain::messages::{DeliveryMode, Record, SubscriptionSettings, TopicEncoding};
use psb::domain::ports::BrokerConnection;
use psb::infrastructure::MemoryBroker;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Serialize)]
struct OrderEvent {
    a: i32,
}

fn broker_with_topic(topic: &str, encoding: TopicEncoding) -> Arc<MemoryBroker> {
    let broker = MemoryBroker::new();
    broker.create_topic(topic, encoding);
    Arc::new(broker)
}

fn event_type_attribute(event_type: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    attributes.insert("eventType".to_string(), event_type.to_string());
    attributes
}

#[tokio::test]
async fn test_typed_json_publish_reaches_handler_and_is_acked() {
    let broker = broker_with_topic("orders", TopicEncoding::Json);
    let connection: Arc<dyn BrokerConnection> = Arc::clone(&broker) as _;

    let subscriber = Arc::new(Subscriber::new(Arc::clone(&connection)));
    subscriber
        .create_and_bind("orders-sub", "orders", 7)
        .await
        .unwrap();

    let publisher = Publisher::connect(Arc::clone(&connection), &["orders"])
        .await
        .unwrap();
    publisher
        .publish_typed("orders", &OrderEvent { a: 1 }, event_type_attribute("created"))
        .await
        .unwrap();

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_by_handler = Arc::clone(&seen);
    let stopper = Arc::clone(&subscriber);
    let handler = Arc::new(FnHandler::new(move |event_type: &str, record: Record| {
        seen_by_handler
            .lock()
            .unwrap()
            .push((event_type.to_string(), record));
        stopper.stop();
        true
    }));

    tokio::time::timeout(Duration::from_secs(5), subscriber.start(handler))
        .await
        .expect("receive loop did not terminate")
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "created");
    assert_eq!(seen[0].1.get("a"), Some(&serde_json::json!(1)));

    assert_eq!(broker.pending_count("orders-sub"), 0);
    assert_eq!(broker.outstanding_count("orders-sub"), 0);
}

#[tokio::test]
async fn test_handler_false_triggers_redelivery() {
    let broker = broker_with_topic("orders", TopicEncoding::Json);
    let connection: Arc<dyn BrokerConnection> = Arc::clone(&broker) as _;

    let subscriber = Arc::new(Subscriber::new(Arc::clone(&connection)));
    subscriber
        .create_and_bind("orders-sub", "orders", 1)
        .await
        .unwrap();

    let publisher = Publisher::connect(Arc::clone(&connection), &["orders"])
        .await
        .unwrap();
    publisher
        .publish_raw("orders", br#"{"a":1}"#.to_vec(), HashMap::new())
        .await
        .unwrap();

    // Refuse the first delivery; the broker requeues it and the second
    // attempt succeeds.
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_by_handler = Arc::clone(&attempts);
    let stopper = Arc::clone(&subscriber);
    let handler = Arc::new(FnHandler::new(move |_: &str, _: Record| {
        if attempts_by_handler.fetch_add(1, Ordering::SeqCst) == 0 {
            false
        } else {
            stopper.stop();
            true
        }
    }));

    tokio::time::timeout(Duration::from_secs(5), subscriber.start(handler))
        .await
        .expect("receive loop did not terminate")
        .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(broker.pending_count("orders-sub"), 0);
}

#[tokio::test]
async fn test_undecodable_payload_stays_queued() {
    let broker = broker_with_topic("orders", TopicEncoding::Json);
    let connection: Arc<dyn BrokerConnection> = Arc::clone(&broker) as _;

    let subscriber = Arc::new(Subscriber::new(Arc::clone(&connection)));
    subscriber
        .create_and_bind("orders-sub", "orders", 1)
        .await
        .unwrap();

    let publisher = Publisher::connect(Arc::clone(&connection), &["orders"])
        .await
        .unwrap();
    publisher
        .publish_raw("orders", b"not-json".to_vec(), HashMap::new())
        .await
        .unwrap();
    publisher
        .publish_raw("orders", br#"{"ok":true}"#.to_vec(), HashMap::new())
        .await
        .unwrap();

    let invoked = Arc::new(AtomicUsize::new(0));
    let invoked_by_handler = Arc::clone(&invoked);
    let stopper = Arc::clone(&subscriber);
    let handler = Arc::new(FnHandler::new(move |_: &str, _: Record| {
        invoked_by_handler.fetch_add(1, Ordering::SeqCst);
        stopper.stop();
        true
    }));

    tokio::time::timeout(Duration::from_secs(5), subscriber.start(handler))
        .await
        .expect("receive loop did not terminate")
        .unwrap();

    // The handler only ever saw the decodable message; the bad one is back
    // in the queue awaiting redelivery.
    assert_eq!(invoked.load(Ordering::SeqCst), 1);
    assert_eq!(broker.pending_count("orders-sub"), 1);
}

#[tokio::test]
async fn test_binary_topic_carries_msgpack_payload() {
    let broker = broker_with_topic("orders", TopicEncoding::Binary);
    let connection: Arc<dyn BrokerConnection> = Arc::clone(&broker) as _;

    let settings = SubscriptionSettings::new(1, 10, 1, DeliveryMode::Synchronous);
    connection
        .create_subscription("orders-sub", "orders", &settings)
        .await
        .unwrap();

    let publisher = Publisher::connect(Arc::clone(&connection), &["orders"])
        .await
        .unwrap();
    publisher
        .publish_typed("orders", &OrderEvent { a: 7 }, HashMap::new())
        .await
        .unwrap();

    // Read the wire payload straight off the broker stream
    let mut stream = connection.subscribe("orders-sub", &settings).await.unwrap();
    let delivery = stream.next().await.unwrap().expect("message expected");
    assert_eq!(
        delivery.payload,
        rmp_serde::to_vec_named(&OrderEvent { a: 7 }).unwrap()
    );
    delivery.ack().await.unwrap();
}

#[tokio::test]
async fn test_unspecified_encoding_publishes_nothing() {
    let broker = broker_with_topic("orders", TopicEncoding::Unspecified);
    let connection: Arc<dyn BrokerConnection> = Arc::clone(&broker) as _;

    let settings = SubscriptionSettings::new(1, 10, 1, DeliveryMode::Synchronous);
    connection
        .create_subscription("orders-sub", "orders", &settings)
        .await
        .unwrap();

    let publisher = Publisher::connect(Arc::clone(&connection), &["orders"])
        .await
        .unwrap();
    let result = publisher
        .publish_typed("orders", &OrderEvent { a: 1 }, HashMap::new())
        .await;

    assert!(result.is_err());
    assert_eq!(broker.pending_count("orders-sub"), 0);
}

#[tokio::test]
async fn test_stop_bounds_residual_processing() {
    let broker = broker_with_topic("orders", TopicEncoding::Json);
    let connection: Arc<dyn BrokerConnection> = Arc::clone(&broker) as _;

    let subscriber = Arc::new(Subscriber::new(Arc::clone(&connection)));
    subscriber
        .create_and_bind("orders-sub", "orders", 1)
        .await
        .unwrap();

    let publisher = Publisher::connect(Arc::clone(&connection), &["orders"])
        .await
        .unwrap();
    for i in 0..5 {
        publisher
            .publish_raw("orders", format!(r#"{{"n":{i}}}"#).into_bytes(), HashMap::new())
            .await
            .unwrap();
    }

    // Stop on the very first delivery; with the default concurrency of 4,
    // each worker completes at most the delivery it already holds.
    let invoked = Arc::new(AtomicUsize::new(0));
    let invoked_by_handler = Arc::clone(&invoked);
    let stopper = Arc::clone(&subscriber);
    let handler = Arc::new(FnHandler::new(move |_: &str, _: Record| {
        invoked_by_handler.fetch_add(1, Ordering::SeqCst);
        stopper.stop();
        true
    }));

    tokio::time::timeout(Duration::from_secs(5), subscriber.start(handler))
        .await
        .expect("receive loop did not terminate")
        .unwrap();

    let invoked = invoked.load(Ordering::SeqCst);
    assert!(invoked >= 1 && invoked <= 4, "residual processing unbounded: {invoked}");
    assert_eq!(broker.pending_count("orders-sub"), 5 - invoked);
    assert_eq!(broker.outstanding_count("orders-sub"), 0);
}
