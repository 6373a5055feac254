//! Message sources
//!
//! The relay pulls messages from a [`MessageSource`] until a read fails,
//! then flushes. Every error means the same thing to the relay: nothing
//! more for this pass.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::message::Message;

/// Why a read returned no message
#[derive(Debug, Error)]
pub enum SourceError {
    /// No message is available right now
    #[error("source exhausted for this pass")]
    Exhausted,

    /// The source will never produce another message
    #[error("source closed")]
    Closed,

    /// The underlying transport failed
    #[error("source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplier of decoded messages
///
/// `read` may wait for the next message. The relay treats any error as the
/// end of the current drain pass and never stops because of one.
pub trait MessageSource: Send + 'static {
    /// Read the next message
    fn read(&mut self) -> impl Future<Output = Result<Message, SourceError>> + Send;
}

/// Source fed by an in-process channel
///
/// The first read of a pass waits for a message; later reads return
/// [`SourceError::Exhausted`] as soon as the channel is momentarily empty.
/// Each burst of sends therefore becomes one drain pass.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Message>,
    /// Whether the current pass has yielded a message yet
    in_pass: bool,
}

impl ChannelSource {
    /// Wrap a receiver
    pub fn new(rx: mpsc::Receiver<Message>) -> Self {
        Self { rx, in_pass: false }
    }

    /// Create a bounded channel and its source
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0, as `tokio::sync::mpsc::channel` does.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Message>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

impl MessageSource for ChannelSource {
    async fn read(&mut self) -> Result<Message, SourceError> {
        let next = if self.in_pass {
            match self.rx.try_recv() {
                Ok(message) => Some(message),
                Err(mpsc::error::TryRecvError::Empty) => {
                    self.in_pass = false;
                    return Err(SourceError::Exhausted);
                }
                Err(mpsc::error::TryRecvError::Disconnected) => None,
            }
        } else {
            self.rx.recv().await
        };

        match next {
            Some(message) => {
                self.in_pass = true;
                Ok(message)
            }
            None => {
                self.in_pass = false;
                Err(SourceError::Closed)
            }
        }
    }
}
