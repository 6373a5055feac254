//! Error types
//!
//! Only building a relay can fail. Once running, source errors and
//! subscriber backpressure are handled inside the relay loop and never
//! surface to callers.

use thiserror::Error;

use crate::message::MessageType;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced when configuring a relay
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No message types were configured, so nothing could ever be relayed
    #[error("relay has no message types configured")]
    NoMessageTypes,

    /// A ring buffer was configured with zero capacity
    #[error("ring buffer capacity for {0} must be greater than zero")]
    ZeroCapacity(MessageType),

    /// The same message type appears twice in the priority order
    #[error("message type {0} is configured more than once")]
    DuplicateMessageType(MessageType),
}

impl Error {
    /// Short stable label for logs
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::NoMessageTypes => "no_message_types",
            Error::ZeroCapacity(_) => "zero_capacity",
            Error::DuplicateMessageType(_) => "duplicate_message_type",
        }
    }
}
