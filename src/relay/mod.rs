//! Relay loop and its configuration
//!
//! # Architecture
//!
//! ```text
//!   [MessageSource] ──read()──► Relay ──push()──► BoundedRingBuffer per type
//!                                 │                (one drain pass)
//!                                 │
//!                      source exhausted: flush
//!                                 │
//!                                 ▼
//!          for type in priority order, for message in ring.drain():
//!              registry.deliver() ──try_deliver()──► subscriber sinks
//! ```
//!
//! The source read is the only place the loop waits. Deliveries never
//! block; a subscriber that cannot take a message is evicted.
//!
//! # Example
//!
//! ```no_run
//! use round_relay::{ChannelSource, Message, MessageType, Relay, RelayConfig};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> round_relay::Result<()> {
//! let (input, source) = ChannelSource::channel(64);
//! let relay = Relay::new(source, RelayConfig::default())?;
//! let handle = relay.handle();
//!
//! let (tx, mut rx) = mpsc::channel(8);
//! handle.subscribe(MessageType::START_NEW_ROUND, tx);
//! relay.spawn();
//!
//! let _ = input.send(Message::start_new_round("round 1")).await;
//! while let Some(message) = rx.recv().await {
//!     println!("{:?}", message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod handle;
pub mod runner;
pub mod source;

pub use config::{ChannelConfig, RelayConfig};
pub use handle::RelayHandle;
pub use runner::{PassSummary, Relay};
pub use source::{ChannelSource, MessageSource, SourceError};
