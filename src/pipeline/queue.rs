//! Fixed-capacity FIFO buffer sitting between requesters and resolvers.
//!
//! The queue does no locking of its own. Every call happens while the
//! caller holds the pipeline lock, so `is_full`/`is_empty` are only
//! meaningful under that lock.

use crate::pipeline::error::PipelineError;

/// Circular buffer of `capacity` slots.
///
/// A slot holding `None` is empty. `head` points at the oldest element and
/// `len` counts occupied slots, so `push` and `pop` are O(1) and never index
/// outside `slots`.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    len: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Result<BoundedQueue<T>, PipelineError> {
        if capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "queue capacity must be at least 1".to_owned(),
            ));
        }

        let mut slots: Vec<Option<T>> = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|e| PipelineError::Allocation(e.to_string()))?;
        slots.resize_with(capacity, || None);

        Ok(BoundedQueue {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        })
    }

    /// Insert at the tail. Hands the item back when there is no free slot.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        let tail = (self.head + self.len) % self.capacity();
        debug_assert!(self.slots[tail].is_none());
        self.slots[tail] = Some(item);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the head element.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        item
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        let queue = BoundedQueue::<String>::new(0);
        assert!(matches!(queue, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = BoundedQueue::<String>::new(5).unwrap();
        assert!(queue.is_empty());
        assert!(!queue.is_full());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 5);
    }

    #[test]
    fn push_fails_when_full_and_returns_item() {
        let mut queue = BoundedQueue::new(2).unwrap();
        assert!(queue.push("a.test").is_ok());
        assert!(queue.push("b.test").is_ok());
        assert!(queue.is_full());

        assert_eq!(queue.push("c.test"), Err("c.test"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn pop_fails_when_empty() {
        let mut queue = BoundedQueue::<&str>::new(3).unwrap();
        assert_eq!(queue.pop(), None);

        queue.push("a.test").unwrap();
        assert_eq!(queue.pop(), Some("a.test"));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_order_matches_push_order() {
        let mut queue = BoundedQueue::new(5).unwrap();
        for host in ["a.test", "b.test", "c.test", "d.test", "e.test"] {
            queue.push(host).unwrap();
        }

        let popped: Vec<&str> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(popped, vec!["a.test", "b.test", "c.test", "d.test", "e.test"]);
    }

    #[test]
    fn fifo_holds_across_wrap_around() {
        let mut queue = BoundedQueue::new(3).unwrap();
        let mut expected = Vec::new();
        let mut popped = Vec::new();

        // Interleave so head and tail lap the slot array several times.
        for i in 0..20 {
            queue.push(i).unwrap();
            expected.push(i);
            if i % 2 == 1 {
                popped.push(queue.pop().unwrap());
                popped.push(queue.pop().unwrap());
            }
            assert!(queue.len() <= queue.capacity());
        }
        while let Some(i) = queue.pop() {
            popped.push(i);
        }

        assert_eq!(popped, expected);
    }

    #[test]
    fn len_stays_within_capacity() {
        let mut queue = BoundedQueue::new(4).unwrap();
        for i in 0..10 {
            let _ = queue.push(i);
            assert!(queue.len() <= 4);
        }
        assert!(queue.is_full());
        for _ in 0..10 {
            let _ = queue.pop();
            assert!(queue.len() <= 4);
        }
        assert!(queue.is_empty());
    }
}
