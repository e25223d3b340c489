//! # Pub/Sub Bridge Application Layer
//!
//! Publisher and Subscriber services written against the domain broker
//! ports. The Publisher and Subscriber are independent, share no state,
//! and communicate only via the broker.
//!
//! - `publisher` - topic resolution at construction, raw and typed sends
//!   with blocking broker confirmation
//! - `subscriber` - bounded-concurrency receive loop with serialized
//!   handler invocation, conditional acknowledgment, and cooperative stop

pub mod publisher;
pub mod subscriber;

pub use publisher::Publisher;
pub use subscriber::Subscriber;
