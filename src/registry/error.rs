//! Delivery error types
//!
//! Errors a sink reports when the relay cannot hand it a message without
//! blocking.

use thiserror::Error;

/// Error returned by a non-blocking delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The sink has no free capacity right now
    #[error("sink is full")]
    Full,
    /// The reading side of the sink is gone
    #[error("sink is closed")]
    Closed,
}
