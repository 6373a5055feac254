//! In-process message relay
//!
//! Reads typed messages from a source, keeps the most recent messages of
//! each type in bounded ring buffers, and fans them out to subscribers
//! without ever waiting on a slow one.
//!
//! - [`ring`]: fixed-capacity buffer that overwrites its oldest entry
//! - [`registry`]: subscribers per message type, non-blocking delivery and
//!   eviction
//! - [`relay`]: the drain/flush loop, its configuration and sources
//! - [`stats`]: relay counters

pub mod error;
pub mod message;
pub mod registry;
pub mod relay;
pub mod ring;
pub mod stats;

pub use error::{Error, Result};
pub use message::{Message, MessageType};
pub use registry::{EvictionPolicy, MessageSink, SinkError, SubscriptionRegistry};
pub use relay::{ChannelSource, MessageSource, Relay, RelayConfig, RelayHandle, SourceError};
pub use ring::BoundedRingBuffer;
pub use stats::RelayStats;
