//! Subscriber service
//!
//! Binds to (or creates) a subscription, runs a bounded-concurrency receive
//! loop, invokes a caller-supplied handler exactly once per delivered
//! message under a serialization guard, and acknowledges conditionally.
//!
//! Cancellation is cooperative only: the stop signal is observed between
//! delivery units and never preempts an in-progress handler, so a delivery
//! already in flight when `stop` is called is still processed once.

use psb_domain::constants::{DEFAULT_CONCURRENCY, DEFAULT_MAX_OUTSTANDING, MIN_EXPIRATION_DAYS};
use psb_domain::error::{Error, Result};
use psb_domain::handler::RecordHandler;
use psb_domain::messages::{Delivery, DeliveryMode, Record, SubscriptionSettings};
use psb_domain::ports::{BrokerConnection, DeliveryStream};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Subscriber lifecycle: UNBOUND -> BOUND -> RECEIVING -> CANCELLED
///
/// Single-use per bound subscription; there is no transition back to
/// RECEIVING.
enum RunState {
    Unbound,
    Bound {
        subscription: String,
        settings: SubscriptionSettings,
    },
    Receiving,
    Cancelled,
}

/// Subscriber over one broker-side subscription
pub struct Subscriber {
    connection: Arc<dyn BrokerConnection>,
    state: Mutex<RunState>,
    cancel: CancellationToken,
}

impl Subscriber {
    /// Create a subscriber over an established broker connection
    ///
    /// Does not yet bind a subscription.
    pub fn new(connection: Arc<dyn BrokerConnection>) -> Self {
        Self {
            connection,
            state: Mutex::new(RunState::Unbound),
            cancel: CancellationToken::new(),
        }
    }

    /// Attach to a pre-existing subscription and record flow-control
    /// parameters
    ///
    /// `DeliveryMode::Synchronous` enforces `max_outstanding` as a hard cap
    /// on in-flight deliveries; `DeliveryMode::Streaming` treats it as a
    /// soft target, an accepted trade-off for throughput.
    pub fn bind_existing(
        &self,
        subscription: &str,
        delivery_mode: DeliveryMode,
        concurrency: usize,
        max_outstanding: usize,
    ) -> Result<()> {
        self.bind(
            subscription,
            SubscriptionSettings::new(
                MIN_EXPIRATION_DAYS,
                max_outstanding,
                concurrency,
                delivery_mode,
            ),
        )
    }

    /// Create a new subscription bound to `topic` and attach to it
    ///
    /// The ack deadline is fixed at 60 seconds and the expiration policy is
    /// `max(1, expiration_days)` days. Flow control uses the domain
    /// defaults. Fails with [`Error::SubscriptionCreate`] on broker
    /// rejection (duplicate name, nonexistent topic).
    pub async fn create_and_bind(
        &self,
        subscription: &str,
        topic: &str,
        expiration_days: u32,
    ) -> Result<()> {
        let settings = SubscriptionSettings::new(
            expiration_days,
            DEFAULT_MAX_OUTSTANDING,
            DEFAULT_CONCURRENCY,
            DeliveryMode::Synchronous,
        );

        self.connection
            .create_subscription(subscription, topic, &settings)
            .await?;

        self.bind(subscription, settings)
    }

    /// Run the receive loop until cancellation or a fatal broker error
    ///
    /// Blocks the caller for the lifetime of the loop. Per delivered
    /// message: decode the payload as a structured record (undecodable
    /// payloads are silently left unacknowledged), extract the `eventType`
    /// attribute, invoke the handler under the serialization guard, and
    /// acknowledge only when the handler returns `true`.
    pub async fn start(&self, handler: Arc<dyn RecordHandler>) -> Result<()> {
        let (subscription, settings) = self.begin_receiving()?;

        let stream = match self.connection.subscribe(&subscription, &settings).await {
            Ok(stream) => stream,
            Err(err) => {
                *self.state.lock().unwrap() = RunState::Cancelled;
                return Err(err);
            }
        };

        debug!(
            subscription = %subscription,
            concurrency = settings.concurrency,
            max_outstanding = settings.max_outstanding,
            "receive loop starting"
        );

        let stream = Arc::new(tokio::sync::Mutex::new(stream));
        let gate = Arc::new(tokio::sync::Mutex::new(()));

        let mut workers = JoinSet::new();
        for _ in 0..settings.concurrency.max(1) {
            workers.spawn(run_worker(
                Arc::clone(&stream),
                Arc::clone(&gate),
                Arc::clone(&handler),
                self.cancel.clone(),
            ));
        }

        let mut first_err = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    // A fatal broker error in one worker terminates the loop
                    self.cancel.cancel();
                    first_err.get_or_insert(err);
                }
                Err(err) => {
                    self.cancel.cancel();
                    first_err
                        .get_or_insert_with(|| Error::internal(format!("worker failed: {err}")));
                }
            }
        }

        *self.state.lock().unwrap() = RunState::Cancelled;
        debug!(subscription = %subscription, "receive loop terminated");

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Request cooperative cancellation of the receive loop
    ///
    /// Takes effect on the next completed delivery, not immediately; a
    /// delivery in flight at this moment is still processed once.
    pub fn stop(&self) {
        debug!("subscriber cancel requested");
        self.cancel.cancel();
    }

    fn bind(&self, subscription: &str, settings: SubscriptionSettings) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match *state {
            RunState::Unbound => {
                *state = RunState::Bound {
                    subscription: subscription.to_string(),
                    settings,
                };
                Ok(())
            }
            _ => Err(Error::invalid_state(
                "subscriber is already bound to a subscription",
            )),
        }
    }

    fn begin_receiving(&self) -> Result<(String, SubscriptionSettings)> {
        let mut state = self.state.lock().unwrap();
        match std::mem::replace(&mut *state, RunState::Receiving) {
            RunState::Bound {
                subscription,
                settings,
            } => Ok((subscription, settings)),
            previous => {
                let message = match previous {
                    RunState::Unbound => "subscriber is not bound to a subscription",
                    RunState::Receiving => "receive loop is already running",
                    RunState::Cancelled => "subscriber is single-use and already cancelled",
                    RunState::Bound { .. } => unreachable!(),
                };
                *state = previous;
                Err(Error::invalid_state(message))
            }
        }
    }
}

/// One delivery worker
///
/// Workers share the delivery stream; the broker determines which worker
/// sees which message and in what order. Waiting for a delivery races
/// against cancellation, and the cancel flag is re-checked after each
/// completed delivery.
async fn run_worker(
    stream: Arc<tokio::sync::Mutex<Box<dyn DeliveryStream>>>,
    gate: Arc<tokio::sync::Mutex<()>>,
    handler: Arc<dyn RecordHandler>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        let delivery = {
            let mut stream = stream.lock().await;
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                next = stream.next() => match next? {
                    Some(delivery) => delivery,
                    // Broker closed the stream
                    None => return Ok(()),
                },
            }
        };

        process(&gate, handler.as_ref(), delivery).await;

        if cancel.is_cancelled() {
            debug!("cancel observed after delivery");
            return Ok(());
        }
    }
}

/// Decode, dispatch, and conditionally acknowledge one delivery
async fn process(gate: &tokio::sync::Mutex<()>, handler: &dyn RecordHandler, delivery: Delivery) {
    let record: Record = match serde_json::from_slice(&delivery.payload) {
        Ok(record) => record,
        Err(err) => {
            // Left unacknowledged; the broker redelivers after the ack
            // deadline and the handler is never invoked.
            debug!(error = %err, "dropping undecodable message");
            return;
        }
    };

    let event_type = delivery.event_type().to_string();

    // Serialization guard: at most one handler execution at a time, in
    // arbitrary broker-determined delivery order.
    let _guard = gate.lock().await;
    if handler.handle(&event_type, record).await {
        if let Err(err) = delivery.ack().await {
            warn!(error = %err, "ack failed; broker will redeliver");
        }
    }
}
