//! Subscription registry for per-type fan-out
//!
//! The registry maps each message type to the subscribers interested in it
//! and performs the non-blocking deliveries for the relay.
//!
//! # Architecture
//!
//! ```text
//!                     Arc<SubscriptionRegistry>
//!                 ┌──────────────────────────────┐
//!                 │ Mutex<HashMap<MessageType,   │
//!                 │   Vec<Subscriber {           │
//!                 │     state, sink,             │
//!                 │   }>                         │
//!                 │ >>                           │
//!                 └──────────────┬───────────────┘
//!                                │
//!         ┌──────────────────────┼──────────────────────┐
//!         │                      │                      │
//!         ▼                      ▼                      ▼
//!    [Relay flush]          [Caller task]          [Caller task]
//!    lock().deliver()       subscribe()            rx.recv()
//!         │                                             ▲
//!         └──────────► sink.try_deliver() ──────────────┘
//! ```
//!
//! # Backpressure
//!
//! Deliveries never wait. A sink that is full is evicted (its sink dropped,
//! which the reader observes as end of stream) according to the configured
//! [`EvictionPolicy`].

pub mod error;
pub mod sink;
pub mod store;
pub mod subscriber;

pub use error::SinkError;
pub use sink::MessageSink;
pub use store::{DeliveryReport, RegistryGuard, SubscriptionRegistry};
pub use subscriber::{Delivery, EvictionPolicy, Subscriber, SubscriberState};
