//! Record handler contract
//!
//! The subscriber invokes a caller-supplied handler once per decoded
//! delivery, under a mutual-exclusion guard: at most one handler execution
//! proceeds at a time regardless of how many broker workers feed it.
//!
//! Returning `true` acknowledges the delivery. Returning `false` leaves it
//! unacknowledged and the broker redelivers after the ack deadline, so a
//! faulty handler observes redelivery rather than data loss.

use crate::messages::Record;
use async_trait::async_trait;

/// Caller-supplied processing contract for decoded deliveries
///
/// Must be safe to call repeatedly under the serialization guard. The
/// subscriber makes no ordering promises across messages: the guard only
/// guarantees non-overlap of executions, not FIFO order.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    /// Process one decoded record; return `true` to acknowledge it
    async fn handle(&self, event_type: &str, record: Record) -> bool;
}

/// Adapter turning a plain synchronous closure into a [`RecordHandler`]
///
/// ## Usage
///
/// ```
/// use psb_domain::handler::FnHandler;
///
/// let handler = FnHandler::new(|event_type, _record| event_type == "created");
/// ```
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&str, Record) -> bool + Send + Sync,
{
    /// Wrap a closure as a handler
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> RecordHandler for FnHandler<F>
where
    F: Fn(&str, Record) -> bool + Send + Sync,
{
    async fn handle(&self, event_type: &str, record: Record) -> bool {
        (self.f)(event_type, record)
    }
}
