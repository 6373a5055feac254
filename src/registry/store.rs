//! Subscription registry implementation
//!
//! Maps each message type to the ordered list of its subscribers. A single
//! lock guards both registration and delivery, so a list is never seen
//! mid-append and an eviction is never lost. Everything done under the lock
//! is a non-blocking send, which keeps the coarse lock cheap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::mpsc;

use super::sink::MessageSink;
use super::subscriber::{Delivery, EvictionPolicy, Subscriber};
use crate::message::{Message, MessageType};

type SubscriberMap<S> = HashMap<MessageType, Vec<Subscriber<S>>>;

/// Counts from delivering one message to every subscriber of its type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Sinks that accepted the message
    pub delivered: u64,
    /// Sinks that refused the message but stayed subscribed
    pub dropped: u64,
    /// Subscribers evicted while delivering the message
    pub evicted: u64,
}

impl DeliveryReport {
    fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Dropped(_) => self.dropped += 1,
            Delivery::Evicted(_) => self.evicted += 1,
            Delivery::Skipped => {}
        }
    }

    /// Add another report's counts to this one
    pub fn merge(&mut self, other: DeliveryReport) {
        self.delivered += other.delivered;
        self.dropped += other.dropped;
        self.evicted += other.evicted;
    }
}

/// Registry of subscribers per message type
///
/// Subscribers are never removed, only evicted in place, so registration
/// order is stable for the life of the registry.
pub struct SubscriptionRegistry<S = mpsc::Sender<Message>> {
    /// Subscribers keyed by message type, in registration order
    subscribers: Mutex<SubscriberMap<S>>,

    /// Next subscriber ID to hand out
    next_id: AtomicU64,
}

impl<S: MessageSink> SubscriptionRegistry<S> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a sink for a message type
    ///
    /// Fire-and-forget: the subscriber receives messages from every flush
    /// that starts after this call returns.
    pub fn subscribe(&self, message_type: MessageType, sink: S) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self.subscribers.lock();
        let list = subscribers.entry(message_type).or_default();
        list.push(Subscriber::new(id, sink));

        tracing::debug!(
            message_type = %message_type,
            subscriber_id = id,
            subscribers = list.len(),
            "Subscriber added"
        );
    }

    /// Call `f` for each subscriber of a type, in registration order
    ///
    /// The lock is held for the whole iteration, so `f` must not block.
    pub fn for_each_subscriber<F>(&self, message_type: MessageType, f: F)
    where
        F: FnMut(&mut Subscriber<S>),
    {
        self.lock().for_each_subscriber(message_type, f);
    }

    /// Take the registry lock for a batch of deliveries
    ///
    /// Registrations made while the guard is alive wait until it is
    /// dropped, so they only see deliveries made after that point.
    pub fn lock(&self) -> RegistryGuard<'_, S> {
        RegistryGuard {
            subscribers: self.subscribers.lock(),
        }
    }

    /// Number of subscribers ever registered for a type
    pub fn subscriber_count(&self, message_type: MessageType) -> usize {
        self.subscribers
            .lock()
            .get(&message_type)
            .map_or(0, Vec::len)
    }

    /// Number of subscribers of a type that have not been evicted
    pub fn active_count(&self, message_type: MessageType) -> usize {
        self.subscribers.lock().get(&message_type).map_or(0, |list| {
            list.iter().filter(|sub| sub.is_active()).count()
        })
    }
}

impl<S: MessageSink> Default for SubscriptionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to the registry, held for the duration of a flush
pub struct RegistryGuard<'a, S> {
    subscribers: MutexGuard<'a, SubscriberMap<S>>,
}

impl<S: MessageSink> RegistryGuard<'_, S> {
    /// Call `f` for each subscriber of a type, in registration order
    pub fn for_each_subscriber<F>(&mut self, message_type: MessageType, mut f: F)
    where
        F: FnMut(&mut Subscriber<S>),
    {
        if let Some(list) = self.subscribers.get_mut(&message_type) {
            list.iter_mut().for_each(|sub| f(sub));
        }
    }

    /// Offer a message to every subscriber of its type
    ///
    /// Evicting a subscriber also evicts every other subscription, of any
    /// type, that writes into the same channel. Only then is the sink
    /// dropped, so the reader sees end of stream.
    pub fn deliver(&mut self, message: &Message, policy: EvictionPolicy) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let mut closed = Vec::new();
        let message_type = message.message_type;

        self.for_each_subscriber(message_type, |sub| {
            let (delivery, sink) = sub.offer(message, policy);
            if let Delivery::Evicted(reason) = delivery {
                tracing::debug!(
                    message_type = %message_type,
                    subscriber_id = sub.id(),
                    reason = %reason,
                    "Subscriber evicted"
                );
            }
            closed.extend(sink);
            report.record(delivery);
        });

        for sink in &closed {
            report.evicted += self.evict_sharing(sink);
        }

        report
    }

    /// Evict every active subscriber writing into `sink`'s channel
    fn evict_sharing(&mut self, sink: &S) -> u64 {
        let mut evicted = 0;

        for (message_type, list) in self.subscribers.iter_mut() {
            for sub in list.iter_mut().filter(|sub| sub.shares_sink(sink)) {
                sub.evict();
                evicted += 1;

                tracing::debug!(
                    message_type = %message_type,
                    subscriber_id = sub.id(),
                    "Subscriber evicted with shared sink"
                );
            }
        }

        evicted
    }
}
