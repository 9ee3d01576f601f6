//! Bounded, single-producer single-consumer queue with a per-queue
//! overflow policy (spec §4.7).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

/// What happens to `send` when the queue is already at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// The sender blocks until a receiver makes room.
    Block,
    /// The oldest queued element is discarded to make room.
    DropOldest,
    /// The whole queue is cleared and replaced by the new element;
    /// only the most recent value is ever meaningful (e.g. key
    /// material).
    Replace,
}

struct Inner<T> {
    items: VecDeque<T>,
    capacity: usize,
    policy: OverflowPolicy,
}

/// A bounded queue with exactly one sender and one receiver (spec §5:
/// "multi-producer queues are forbidden in the core").
pub struct BoundedQueue<T> {
    state: Arc<Mutex<Inner<T>>>,
    not_empty: Arc<Condvar>,
    not_full: Arc<Condvar>,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone(), not_empty: self.not_empty.clone(), not_full: self.not_full.clone() }
    }
}

impl<T> BoundedQueue<T> {
    /// Creates a queue of the given `capacity` and `policy`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        assert!(capacity > 0, "bounded queue capacity must be non-zero");
        Self {
            state: Arc::new(Mutex::new(Inner { items: VecDeque::with_capacity(capacity), capacity, policy })),
            not_empty: Arc::new(Condvar::new()),
            not_full: Arc::new(Condvar::new()),
        }
    }

    /// The queue's configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.lock().expect("queue mutex poisoned").capacity
    }

    /// The queue's configured overflow policy.
    #[must_use]
    pub fn policy(&self) -> OverflowPolicy {
        self.state.lock().expect("queue mutex poisoned").policy
    }

    /// Number of elements currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().expect("queue mutex poisoned").items.len()
    }

    /// `true` if no elements are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueues `item`, applying the queue's overflow policy if full.
    ///
    /// `Block` waits for a receiver to make room; `DropOldest` and
    /// `Replace` never block.
    pub fn send(&self, item: T) {
        let mut inner = self.state.lock().expect("queue mutex poisoned");
        match inner.policy {
            OverflowPolicy::Block => {
                while inner.items.len() >= inner.capacity {
                    inner = self.not_full.wait(inner).expect("queue mutex poisoned");
                }
                inner.items.push_back(item);
            }
            OverflowPolicy::DropOldest => {
                if inner.items.len() >= inner.capacity {
                    inner.items.pop_front();
                }
                inner.items.push_back(item);
            }
            OverflowPolicy::Replace => {
                if inner.items.len() >= inner.capacity {
                    inner.items.clear();
                }
                inner.items.push_back(item);
            }
        }
        self.not_empty.notify_one();
    }

    /// Dequeues the oldest element, blocking until one is available.
    #[must_use]
    pub fn recv(&self) -> T {
        let mut inner = self.state.lock().expect("queue mutex poisoned");
        loop {
            if let Some(item) = inner.items.pop_front() {
                self.not_full.notify_one();
                return item;
            }
            inner = self.not_empty.wait(inner).expect("queue mutex poisoned");
        }
    }

    /// Dequeues the oldest element without blocking.
    pub fn try_recv(&self) -> Option<T> {
        let mut inner = self.state.lock().expect("queue mutex poisoned");
        let item = inner.items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn drop_oldest_discards_the_first_element_when_full() {
        let q = BoundedQueue::new(2, OverflowPolicy::DropOldest);
        q.send(1);
        q.send(2);
        q.send(3);
        assert_eq!(q.len(), 2);
        assert_eq!(q.recv(), 2);
        assert_eq!(q.recv(), 3);
    }

    #[test]
    fn replace_clears_the_queue_when_full() {
        let q = BoundedQueue::new(1, OverflowPolicy::Replace);
        q.send(1);
        q.send(2);
        assert_eq!(q.len(), 1);
        assert_eq!(q.recv(), 2);
    }

    #[test]
    fn block_waits_for_a_receiver_to_make_room() {
        let q = BoundedQueue::new(1, OverflowPolicy::Block);
        q.send(1);

        let sender = q.clone();
        let handle = thread::spawn(move || sender.send(2));

        thread::sleep(Duration::from_millis(20));
        assert_eq!(q.recv(), 1);
        assert_eq!(q.recv(), 2);
        handle.join().expect("sender thread panicked");
    }

    #[test]
    fn try_recv_returns_none_on_empty_queue() {
        let q: BoundedQueue<u8> = BoundedQueue::new(4, OverflowPolicy::DropOldest);
        assert_eq!(q.try_recv(), None);
    }
}
