//! Relay loop
//!
//! Alternates between draining the source into per-type ring buffers and
//! flushing those buffers to subscribers in priority order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::message::{Message, MessageType};
use crate::registry::{DeliveryReport, MessageSink, SubscriptionRegistry};
use crate::ring::BoundedRingBuffer;
use crate::stats::RelayCounters;

use super::config::RelayConfig;
use super::handle::RelayHandle;
use super::source::MessageSource;

/// Result of one drain/flush cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Messages routed into a ring buffer
    pub buffered: u64,
    /// Buffered messages overwritten by newer ones of the same type
    pub overwritten: u64,
    /// Delivery counts for the flush
    pub delivery: DeliveryReport,
    /// Whether the source produced anything at all
    read_any: bool,
}

/// The message relay
///
/// Owns the source and the ring buffers. Subscriptions go through a
/// [`RelayHandle`], which can be cloned and used from any task while the
/// relay runs.
pub struct Relay<Src, S = mpsc::Sender<Message>> {
    source: Src,
    config: RelayConfig,

    /// Ring buffers in flush priority order
    buffers: Vec<(MessageType, BoundedRingBuffer)>,

    /// Message type to index into `buffers`
    routes: HashMap<MessageType, usize>,

    registry: Arc<SubscriptionRegistry<S>>,
    counters: Arc<RelayCounters>,
}

impl<Src: MessageSource, S: MessageSink> Relay<Src, S> {
    /// Create a relay reading from `source`
    ///
    /// Fails if the configuration has no channels, a zero capacity, or the
    /// same message type twice.
    pub fn new(source: Src, config: RelayConfig) -> Result<Self> {
        config.validate()?;

        let buffers: Vec<_> = config
            .channels
            .iter()
            .map(|c| (c.message_type, BoundedRingBuffer::new(c.capacity)))
            .collect();

        let routes = buffers
            .iter()
            .enumerate()
            .map(|(index, (message_type, _))| (*message_type, index))
            .collect();

        Ok(Self {
            source,
            config,
            buffers,
            routes,
            registry: Arc::new(SubscriptionRegistry::new()),
            counters: Arc::new(RelayCounters::new()),
        })
    }

    /// Get a handle for subscribing and reading statistics
    pub fn handle(&self) -> RelayHandle<S> {
        RelayHandle::new(Arc::clone(&self.registry), Arc::clone(&self.counters))
    }

    /// Subscribe a sink to a message type
    pub fn subscribe(&self, message_type: MessageType, sink: S) {
        self.registry.subscribe(message_type, sink);
    }

    /// Get the relay configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the relay
    ///
    /// Never returns; drop or abort the task to stop it, or use
    /// [`run_until`](Self::run_until).
    pub async fn run(mut self) {
        self.log_start();
        self.run_forever().await;
    }

    /// Run the relay until `shutdown` completes
    ///
    /// Stopping happens while waiting on the source or between cycles,
    /// never in the middle of a flush.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.log_start();

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
            }
            _ = self.run_forever() => {}
        }

        let stats = self.counters.snapshot();
        tracing::info!(
            passes = stats.passes,
            delivered = stats.messages_delivered,
            evicted = stats.subscribers_evicted,
            "Relay stopped"
        );
    }

    /// Spawn the relay on the current tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run a single drain pass followed by a flush
    pub async fn run_pass(&mut self) -> PassSummary {
        let mut summary = self.drain_source().await;
        summary.delivery = self.flush();

        // Buffers only ever hold the current pass
        for (_, ring) in &mut self.buffers {
            ring.clear();
        }

        self.counters
            .record_pass(summary.buffered, summary.overwritten, summary.delivery);

        tracing::trace!(
            buffered = summary.buffered,
            overwritten = summary.overwritten,
            delivered = summary.delivery.delivered,
            evicted = summary.delivery.evicted,
            "Relay pass complete"
        );

        summary
    }

    async fn run_forever(&mut self) {
        loop {
            let summary = self.run_pass().await;

            if !summary.read_any && !self.config.idle_backoff.is_zero() {
                tokio::time::sleep(self.config.idle_backoff).await;
            } else {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Read from the source until it reports an error
    async fn drain_source(&mut self) -> PassSummary {
        let mut summary = PassSummary::default();

        for (_, ring) in &mut self.buffers {
            ring.clear();
        }

        loop {
            let message = match self.source.read().await {
                Ok(message) => message,
                Err(e) => {
                    tracing::trace!(reason = %e, "Drain pass ended");
                    break;
                }
            };
            summary.read_any = true;

            // Types without a buffer are dropped
            let Some(&index) = self.routes.get(&message.message_type) else {
                continue;
            };

            summary.buffered += 1;
            if self.buffers[index].1.push(message) {
                summary.overwritten += 1;
            }
        }

        summary
    }

    /// Deliver every buffered message, highest priority type first
    ///
    /// The registry lock is held for the whole flush, so a subscriber
    /// registered meanwhile only sees later passes.
    fn flush(&self) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let mut registry = self.registry.lock();

        for (_, ring) in &self.buffers {
            for message in ring.drain() {
                report.merge(registry.deliver(&message, self.config.eviction_policy));
            }
        }

        report
    }

    fn log_start(&self) {
        let order: Vec<String> = self
            .buffers
            .iter()
            .map(|(message_type, ring)| format!("{}:{}", message_type, ring.capacity()))
            .collect();

        tracing::info!(
            channels = ?order,
            eviction_policy = ?self.config.eviction_policy,
            "Relay started"
        );
    }
}
