//! Relay handle
//!
//! A cheap, cloneable handle that lets other tasks subscribe and read
//! statistics while the relay loop runs elsewhere.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::message::{Message, MessageType};
use crate::registry::{MessageSink, SubscriptionRegistry};
use crate::stats::{RelayCounters, RelayStats};

/// Handle to a relay's subscriptions and statistics
pub struct RelayHandle<S = mpsc::Sender<Message>> {
    registry: Arc<SubscriptionRegistry<S>>,
    counters: Arc<RelayCounters>,
}

impl<S: MessageSink> RelayHandle<S> {
    pub(super) fn new(registry: Arc<SubscriptionRegistry<S>>, counters: Arc<RelayCounters>) -> Self {
        Self { registry, counters }
    }

    /// Subscribe a sink to a message type
    ///
    /// The relay owns the sink from now on and drops it if the subscriber
    /// cannot keep up. Undersized sinks get evicted on their first overflow.
    /// A channel subscribed to several types loses all of those
    /// subscriptions together.
    pub fn subscribe(&self, message_type: MessageType, sink: S) {
        self.registry.subscribe(message_type, sink);
    }

    /// Get a snapshot of relay statistics
    pub fn stats(&self) -> RelayStats {
        self.counters.snapshot()
    }

    /// Get a reference to the subscription registry
    pub fn registry(&self) -> &Arc<SubscriptionRegistry<S>> {
        &self.registry
    }
}

impl<S> Clone for RelayHandle<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            counters: Arc::clone(&self.counters),
        }
    }
}
