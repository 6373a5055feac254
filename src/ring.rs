//! Bounded ring buffer holding the latest messages of one type
//!
//! During a drain pass the relay pushes every routed message into the ring
//! for its type. When the ring is full the oldest entry is overwritten, so
//! after the pass the ring holds the most recent `capacity` messages.
//! This favors "latest round state" over a complete log.

use crate::message::Message;

/// Fixed-capacity circular buffer that overwrites its oldest entry when full
///
/// The valid slots are the contiguous (mod capacity) range
/// `[first, first + size)`. Slots outside that range may still hold stale
/// values from earlier passes; they are logically gone and get overwritten
/// by later pushes.
#[derive(Debug)]
pub struct BoundedRingBuffer<T = Message> {
    /// Backing storage, allocated once
    slots: Box<[Option<T>]>,
    /// Number of retained entries
    size: usize,
    /// Index of the oldest retained entry
    first: usize,
}

impl<T> BoundedRingBuffer<T> {
    /// Create an empty buffer with the given capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. The relay validates capacities before
    /// building its buffers.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be greater than zero");

        let slots = (0..capacity)
            .map(|_| None)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            size: 0,
            first: 0,
        }
    }

    /// Add an entry, dropping the oldest one if the buffer is full
    ///
    /// Returns `true` if an older entry was overwritten.
    pub fn push(&mut self, item: T) -> bool {
        let capacity = self.capacity();
        let next = (self.first + self.size) % capacity;
        let overwrote = self.size == capacity;

        if overwrote {
            self.first = (self.first + 1) % capacity;
        } else {
            self.size += 1;
        }

        self.slots[next] = Some(item);
        overwrote
    }

    /// Reset to empty without releasing the backing storage
    pub fn clear(&mut self) {
        self.size = 0;
        self.first = 0;
    }

    /// Iterate over retained entries, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.capacity();
        (0..self.size).filter_map(move |i| self.slots[(self.first + i) % capacity].as_ref())
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether no entries are retained
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether the next push will overwrite the oldest entry
    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Maximum number of retained entries
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T: Clone> BoundedRingBuffer<T> {
    /// Copy out all retained entries, oldest first
    ///
    /// The buffer itself is left untouched.
    pub fn drain(&self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.size);
        result.extend(self.iter().cloned());
        result
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::message::MessageType;

    fn msg(n: u8) -> Message {
        Message::new(MessageType(1), Bytes::from(vec![n]))
    }

    #[test]
    fn test_capacity_one_keeps_latest() {
        let mut ring = BoundedRingBuffer::new(1);
        assert_eq!(ring.len(), 0);

        ring.push(msg(0));
        assert_eq!(ring.len(), 1);

        // Second push overwrites the first
        assert!(ring.push(msg(1)));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.drain(), vec![msg(1)]);

        ring.clear();
        assert_eq!(ring.len(), 0);
        assert!(ring.drain().is_empty());
    }

    #[test]
    fn test_capacity_two_drops_oldest() {
        let mut ring = BoundedRingBuffer::new(2);

        ring.push(msg(0));
        ring.push(msg(1));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.drain(), vec![msg(0), msg(1)]);

        ring.clear();
        ring.push(msg(0));
        ring.push(msg(1));
        ring.push(msg(2));
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.drain(), vec![msg(1), msg(2)]);
    }

    #[test]
    fn test_under_capacity_keeps_push_order() {
        let mut ring = BoundedRingBuffer::new(8);
        for n in 0..5 {
            assert!(!ring.push(n));
        }

        assert_eq!(ring.drain(), vec![0, 1, 2, 3, 4]);
        assert!(!ring.is_full());
    }

    #[test]
    fn test_over_capacity_keeps_last_c() {
        let mut ring = BoundedRingBuffer::new(3);
        for n in 0..10 {
            ring.push(n);
        }

        assert!(ring.is_full());
        assert_eq!(ring.drain(), vec![7, 8, 9]);
    }

    #[test]
    fn test_drain_does_not_mutate() {
        let mut ring = BoundedRingBuffer::new(2);
        ring.push(msg(0));

        let first = ring.drain();
        let second = ring.drain();
        assert_eq!(first, second);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut ring = BoundedRingBuffer::new(2);
        ring.push(1);
        ring.push(2);
        ring.push(3);

        ring.clear();
        ring.clear();

        assert!(ring.is_empty());
        assert!(ring.drain().is_empty());

        // Reuse after clear starts from a clean state
        ring.push(4);
        assert_eq!(ring.drain(), vec![4]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut ring: BoundedRingBuffer<u32> = BoundedRingBuffer::new(4);
        ring.push(1);
        ring.clear();

        assert_eq!(ring.capacity(), 4);
    }

    #[test]
    #[should_panic(expected = "ring buffer capacity must be greater than zero")]
    fn test_zero_capacity_panics() {
        BoundedRingBuffer::<u32>::new(0);
    }
}
