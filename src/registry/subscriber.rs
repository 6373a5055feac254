//! Subscriber state
//!
//! A subscriber starts active and becomes evicted at most once. Eviction
//! drops the sink, which closes it from the reader's point of view, and no
//! delivery is attempted afterwards.

use super::error::SinkError;
use super::sink::MessageSink;
use crate::message::Message;

/// Lifecycle state of a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Receiving messages
    Active,
    /// Sink was closed after a failed delivery; permanent
    Evicted,
}

/// When a subscriber that cannot keep up gets evicted
///
/// A closed sink is always evicted on the first failure, whatever the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Evict on the first failed delivery
    #[default]
    Immediate,
    /// Drop messages for a full sink and evict only after this many
    /// consecutive failures (values below 1 behave like `Immediate`)
    AfterConsecutiveFailures(u32),
}

impl EvictionPolicy {
    fn tolerated_failures(self) -> u32 {
        match self {
            EvictionPolicy::Immediate => 1,
            EvictionPolicy::AfterConsecutiveFailures(n) => n.max(1),
        }
    }
}

/// Outcome of offering one message to one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The sink accepted the message
    Delivered,
    /// The subscriber was already evicted; nothing was attempted
    Skipped,
    /// The sink refused the message but the subscriber stays active
    Dropped(SinkError),
    /// The sink refused the message and the subscriber was evicted
    Evicted(SinkError),
}

/// A registered subscriber and its sink
pub struct Subscriber<S> {
    /// Registry-assigned ID, used for logging
    id: u64,
    /// Current lifecycle state
    state: SubscriberState,
    /// Sink, present while active
    sink: Option<S>,
    /// Failed deliveries since the last success
    consecutive_failures: u32,
}

impl<S: MessageSink> Subscriber<S> {
    pub(super) fn new(id: u64, sink: S) -> Self {
        Self {
            id,
            state: SubscriberState::Active,
            sink: Some(sink),
            consecutive_failures: 0,
        }
    }

    /// Registry-assigned ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> SubscriberState {
        self.state
    }

    /// Check if the subscriber still receives messages
    pub fn is_active(&self) -> bool {
        self.state == SubscriberState::Active
    }

    /// Offer a message without blocking
    pub fn deliver(&mut self, message: &Message, policy: EvictionPolicy) -> Delivery {
        // An evicted sink is dropped here, which closes it
        self.offer(message, policy).0
    }

    /// Offer a message, handing back the sink if this evicted the subscriber
    ///
    /// The caller decides when the returned sink is dropped, so it can first
    /// evict other subscribers writing into the same channel.
    pub(super) fn offer(
        &mut self,
        message: &Message,
        policy: EvictionPolicy,
    ) -> (Delivery, Option<S>) {
        let Some(sink) = self.sink.as_ref() else {
            return (Delivery::Skipped, None);
        };

        match sink.try_deliver(message.clone()) {
            Ok(()) => {
                self.consecutive_failures = 0;
                (Delivery::Delivered, None)
            }
            Err(err) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);

                if err == SinkError::Closed
                    || self.consecutive_failures >= policy.tolerated_failures()
                {
                    (Delivery::Evicted(err), self.evict())
                } else {
                    (Delivery::Dropped(err), None)
                }
            }
        }
    }

    /// Check if this subscriber is still active and writes into `sink`'s channel
    pub(super) fn shares_sink(&self, sink: &S) -> bool {
        self.sink.as_ref().is_some_and(|own| own.same_sink(sink))
    }

    /// Deactivate and take the sink out. Returns `None` if already evicted.
    pub(super) fn evict(&mut self) -> Option<S> {
        self.state = SubscriberState::Evicted;
        self.sink.take()
    }
}

impl<S> std::fmt::Debug for Subscriber<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("consecutive_failures", &self.consecutive_failures)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_deliver_and_evict_on_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut sub = Subscriber::new(1, tx);
        let msg = Message::start_new_round("r1");

        assert_eq!(sub.deliver(&msg, EvictionPolicy::Immediate), Delivery::Delivered);
        assert_eq!(
            sub.deliver(&msg, EvictionPolicy::Immediate),
            Delivery::Evicted(SinkError::Full)
        );
        assert_eq!(sub.state(), SubscriberState::Evicted);

        // Later attempts are skipped
        assert_eq!(sub.deliver(&msg, EvictionPolicy::Immediate), Delivery::Skipped);

        // Reader sees the buffered message, then end of stream
        assert_eq!(rx.recv().await, Some(msg));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_tolerant_policy_drops_then_evicts() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut sub = Subscriber::new(7, tx);
        let policy = EvictionPolicy::AfterConsecutiveFailures(2);
        let msg = Message::received_answer("a");

        assert_eq!(sub.deliver(&msg, policy), Delivery::Delivered);
        assert_eq!(sub.deliver(&msg, policy), Delivery::Dropped(SinkError::Full));
        assert!(sub.is_active());

        // Reader catches up, which resets the failure streak
        rx.recv().await.unwrap();
        assert_eq!(sub.deliver(&msg, policy), Delivery::Delivered);
        assert_eq!(sub.deliver(&msg, policy), Delivery::Dropped(SinkError::Full));
        assert_eq!(sub.deliver(&msg, policy), Delivery::Evicted(SinkError::Full));
        assert!(!sub.is_active());
    }

    #[tokio::test]
    async fn test_closed_sink_evicts_regardless_of_policy() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let mut sub = Subscriber::new(3, tx);

        assert_eq!(
            sub.deliver(
                &Message::start_new_round("x"),
                EvictionPolicy::AfterConsecutiveFailures(10)
            ),
            Delivery::Evicted(SinkError::Closed)
        );
    }

    #[tokio::test]
    async fn test_offer_hands_back_evicted_sink() {
        let (tx, _rx) = mpsc::channel(1);
        let mut first = Subscriber::new(1, tx.clone());
        let mut second = Subscriber::new(2, tx);
        let msg = Message::start_new_round("r");

        assert_eq!(first.offer(&msg, EvictionPolicy::Immediate).0, Delivery::Delivered);
        let (delivery, evicted) = first.offer(&msg, EvictionPolicy::Immediate);
        assert_eq!(delivery, Delivery::Evicted(SinkError::Full));

        let evicted = evicted.unwrap();
        assert!(!first.shares_sink(&evicted));
        assert!(second.shares_sink(&evicted));

        assert!(second.evict().is_some());
        assert!(second.evict().is_none());
        assert!(!second.shares_sink(&evicted));
    }

    #[test]
    fn test_zero_tolerance_behaves_like_immediate() {
        assert_eq!(EvictionPolicy::AfterConsecutiveFailures(0).tolerated_failures(), 1);
        assert_eq!(EvictionPolicy::default(), EvictionPolicy::Immediate);
    }
}
