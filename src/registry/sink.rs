//! Subscriber sinks
//!
//! A sink is the write-only end of a conduit owned by a subscriber. The
//! relay only ever calls [`MessageSink::try_deliver`], which must return
//! immediately. Closing is done by dropping the sink: for tokio channels the
//! receiver then yields `None` once the buffered messages are read.
//!
//! One channel may be subscribed to several message types. Evicting any of
//! those subscriptions evicts all of them, so the last sender is dropped and
//! the reader sees end of stream.

use tokio::sync::mpsc;

use super::error::SinkError;
use crate::message::Message;

/// Write-only, non-blocking message conduit
///
/// Tokio channels need a capacity of at least 1 (`mpsc::channel(0)`
/// panics), so there is no rendezvous sink. A subscriber that never reads
/// is modelled by a one-slot channel, which overflows on the second
/// message, or by a custom sink that always reports [`SinkError::Full`].
pub trait MessageSink: Send + 'static {
    /// Try to hand a message to the subscriber without waiting
    fn try_deliver(&self, message: Message) -> Result<(), SinkError>;

    /// Check if `other` writes into the same underlying channel
    ///
    /// Sinks that cannot tell report `false`, which makes each subscription
    /// close independently.
    fn same_sink(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        let _ = other;
        false
    }
}

impl MessageSink for mpsc::Sender<Message> {
    fn try_deliver(&self, message: Message) -> Result<(), SinkError> {
        self.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }

    fn same_sink(&self, other: &Self) -> bool {
        self.same_channel(other)
    }
}

impl MessageSink for mpsc::UnboundedSender<Message> {
    fn try_deliver(&self, message: Message) -> Result<(), SinkError> {
        self.send(message).map_err(|_| SinkError::Closed)
    }

    fn same_sink(&self, other: &Self) -> bool {
        self.same_channel(other)
    }
}

impl MessageSink for Box<dyn MessageSink> {
    fn try_deliver(&self, message: Message) -> Result<(), SinkError> {
        (**self).try_deliver(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_sender_reports_full() {
        let (tx, mut rx) = mpsc::channel(1);

        assert!(tx.try_deliver(Message::start_new_round("a")).is_ok());
        assert_eq!(
            tx.try_deliver(Message::start_new_round("b")),
            Err(SinkError::Full)
        );

        assert_eq!(rx.recv().await.unwrap().payload, "a");
    }

    #[tokio::test]
    async fn test_bounded_sender_reports_closed() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);

        assert_eq!(
            tx.try_deliver(Message::received_answer("a")),
            Err(SinkError::Closed)
        );
    }

    #[tokio::test]
    async fn test_unbounded_sender() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(tx.try_deliver(Message::received_answer("a")).is_ok());
        assert_eq!(rx.recv().await.unwrap().payload, "a");

        drop(rx);
        assert_eq!(
            tx.try_deliver(Message::received_answer("b")),
            Err(SinkError::Closed)
        );
    }

    #[test]
    fn test_same_sink() {
        let (tx, _rx) = mpsc::channel::<Message>(1);
        let (other, _other_rx) = mpsc::channel::<Message>(1);
        assert!(tx.same_sink(&tx.clone()));
        assert!(!tx.same_sink(&other));

        let (tx, _rx) = mpsc::unbounded_channel::<Message>();
        let (other, _other_rx) = mpsc::unbounded_channel::<Message>();
        assert!(tx.same_sink(&tx.clone()));
        assert!(!tx.same_sink(&other));
    }

    #[tokio::test]
    async fn test_boxed_sink_forwards() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink: Box<dyn MessageSink> = Box::new(tx);

        assert!(sink.try_deliver(Message::start_new_round("x")).is_ok());
        assert_eq!(rx.recv().await.unwrap().payload, "x");
    }
}
