//! Relay configuration

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::message::MessageType;
use crate::registry::EvictionPolicy;

/// Ring buffer settings for one message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Message type routed into this buffer
    pub message_type: MessageType,

    /// Number of most recent messages kept per drain pass
    pub capacity: usize,
}

impl ChannelConfig {
    /// Create a channel config
    pub fn new(message_type: MessageType, capacity: usize) -> Self {
        Self {
            message_type,
            capacity,
        }
    }
}

/// Relay configuration options
///
/// The order of `channels` is the flush priority: all buffered messages of
/// the first channel reach every subscriber before any message of the
/// second, and so on. Message types without a channel are dropped.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Buffered message types, highest priority first
    pub channels: Vec<ChannelConfig>,

    /// What to do with a subscriber whose sink refuses a message
    pub eviction_policy: EvictionPolicy,

    /// Pause after a pass that read no messages (zero = only yield)
    pub idle_backoff: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            channels: vec![
                // Several round starts can arrive per pass
                ChannelConfig::new(MessageType::START_NEW_ROUND, 2),
                ChannelConfig::new(MessageType::RECEIVED_ANSWER, 1),
            ],
            eviction_policy: EvictionPolicy::Immediate,
            idle_backoff: Duration::from_millis(5),
        }
    }
}

impl RelayConfig {
    /// Create a config with no channels
    pub fn empty() -> Self {
        Self {
            channels: Vec::new(),
            ..Default::default()
        }
    }

    /// Append a channel at the lowest priority so far
    pub fn channel(mut self, message_type: MessageType, capacity: usize) -> Self {
        self.channels.push(ChannelConfig::new(message_type, capacity));
        self
    }

    /// Set the eviction policy
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    /// Set the idle backoff
    pub fn idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff;
        self
    }

    /// Capacity configured for a message type
    pub fn capacity_of(&self, message_type: MessageType) -> Option<usize> {
        self.channels
            .iter()
            .find(|c| c.message_type == message_type)
            .map(|c| c.capacity)
    }

    /// Check that the config can build a relay
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(Error::NoMessageTypes);
        }

        let mut seen = HashSet::with_capacity(self.channels.len());
        for channel in &self.channels {
            if channel.capacity == 0 {
                return Err(Error::ZeroCapacity(channel.message_type));
            }
            if !seen.insert(channel.message_type) {
                return Err(Error::DuplicateMessageType(channel.message_type));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.channels.len(), 2);
        assert_eq!(config.channels[0].message_type, MessageType::START_NEW_ROUND);
        assert_eq!(config.channels[1].message_type, MessageType::RECEIVED_ANSWER);
        assert_eq!(config.capacity_of(MessageType::START_NEW_ROUND), Some(2));
        assert_eq!(config.capacity_of(MessageType::RECEIVED_ANSWER), Some(1));
        assert_eq!(config.eviction_policy, EvictionPolicy::Immediate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chaining() {
        let config = RelayConfig::empty()
            .channel(MessageType(4), 8)
            .channel(MessageType(8), 1)
            .eviction_policy(EvictionPolicy::AfterConsecutiveFailures(3))
            .idle_backoff(Duration::ZERO);

        let order: Vec<_> = config.channels.iter().map(|c| c.message_type).collect();
        assert_eq!(order, vec![MessageType(4), MessageType(8)]);
        assert_eq!(
            config.eviction_policy,
            EvictionPolicy::AfterConsecutiveFailures(3)
        );
        assert_eq!(config.idle_backoff, Duration::ZERO);
        assert_eq!(config.capacity_of(MessageType(16)), None);
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(RelayConfig::empty().validate(), Err(Error::NoMessageTypes));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = RelayConfig::empty().channel(MessageType(1), 0);

        assert_eq!(
            config.validate(),
            Err(Error::ZeroCapacity(MessageType(1)))
        );
    }

    #[test]
    fn test_validate_duplicate() {
        let config = RelayConfig::default().channel(MessageType::RECEIVED_ANSWER, 4);

        let err = config.validate().unwrap_err();
        assert_eq!(err, Error::DuplicateMessageType(MessageType::RECEIVED_ANSWER));
        assert_eq!(err.as_label(), "duplicate_message_type");
    }
}
