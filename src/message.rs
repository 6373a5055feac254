//! Message types routed by the relay
//!
//! Messages arrive from the source already decoded into a type tag and an
//! opaque payload. The relay never looks inside the payload.

use bytes::Bytes;

/// Type tag of a relayed message
///
/// Tags are bitmask-friendly integers. The known tags are exposed as
/// associated constants; any other value can still be produced by a source
/// but is dropped by the relay unless a ring buffer is configured for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageType(pub u32);

impl MessageType {
    /// A new round has started
    pub const START_NEW_ROUND: MessageType = MessageType(1 << 0);
    /// An answer was received for the current round
    pub const RECEIVED_ANSWER: MessageType = MessageType(1 << 1);

    /// Get the raw tag value
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Human-readable name for known tags
    pub fn name(self) -> Option<&'static str> {
        match self {
            MessageType::START_NEW_ROUND => Some("start_new_round"),
            MessageType::RECEIVED_ANSWER => Some("received_answer"),
            _ => None,
        }
    }
}

impl From<u32> for MessageType {
    fn from(bits: u32) -> Self {
        MessageType(bits)
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "type({:#x})", self.0),
        }
    }
}

/// A message to be relayed to subscribers
///
/// Cheap to clone: the payload is reference counted, so fanning a message
/// out to many subscribers never copies the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Type tag used for routing
    pub message_type: MessageType,
    /// Opaque payload
    pub payload: Bytes,
}

impl Message {
    /// Create a new message
    pub fn new(message_type: MessageType, payload: impl Into<Bytes>) -> Self {
        Self {
            message_type,
            payload: payload.into(),
        }
    }

    /// Create a round-start message
    pub fn start_new_round(payload: impl Into<Bytes>) -> Self {
        Self::new(MessageType::START_NEW_ROUND, payload)
    }

    /// Create an answer message
    pub fn received_answer(payload: impl Into<Bytes>) -> Self {
        Self::new(MessageType::RECEIVED_ANSWER, payload)
    }

    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
