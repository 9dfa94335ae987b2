//! Thread-safe priority queue for events.
//!
//! The queue is a singly-linked list kept sorted by descending priority behind a single
//! mutex. Push walks past every node whose priority is `>=` the new one and splices in
//! front of the first strictly lower node, which gives:
//! - descending priority order overall
//! - FIFO order within a priority (new entries land after existing equals)
//!
//! Traversal-and-splice and detach-and-copy are each one critical section, so no other
//! thread ever observes a half-linked list. Nodes are allocated before the lock is taken.
//!
//! `pop` never waits for work: an empty queue is `None`, and any backoff is the caller's.

use parking_lot::Mutex;
use tracing::trace;

use super::stats::{QueueStats, QueueStatsSnapshot};
use super::Event;

type Link<'a> = Option<Box<Node<'a>>>;

struct Node<'a> {
    event: Event<'a>,
    next: Link<'a>,
}

struct Inner<'a> {
    head: Link<'a>,
    size: usize,
}

/// Priority queue of [`Event`]s shared between threads by reference.
pub struct EventQueue<'a> {
    inner: Mutex<Inner<'a>>,
    stats: QueueStats,
}

impl<'a> EventQueue<'a> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                head: None,
                size: 0,
            }),
            stats: QueueStats::new(),
        }
    }

    /// Inserts `event` after every queued event of equal or higher priority.
    ///
    /// Blocks only on the queue lock; the walk is O(len).
    pub fn push(&self, event: Event<'a>) {
        let priority = event.priority;
        let mut node = Box::new(Node { event, next: None });

        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        // Stop at the first strictly lower priority; equals stay ahead of the new node.
        let mut link = &mut inner.head;
        while link
            .as_ref()
            .is_some_and(|current| current.event.priority >= priority)
        {
            match link {
                Some(current) => link = &mut current.next,
                None => break,
            }
        }
        node.next = link.take();
        *link = Some(node);
        inner.size += 1;
        let size = inner.size;
        drop(guard);

        self.stats.record_push();
        trace!(system = %event.system, priority, size, "event queued");
    }

    /// Removes the highest-priority, earliest-queued event.
    ///
    /// Returns `None` immediately when the queue is empty.
    pub fn pop(&self) -> Option<Event<'a>> {
        let mut guard = self.inner.lock();
        let Some(node) = guard.head.take() else {
            drop(guard);
            self.stats.record_empty_poll();
            return None;
        };

        let Node { event, next } = *node;
        guard.head = next;
        guard.size -= 1;
        drop(guard);

        self.stats.record_pop();
        trace!(system = %event.system, priority = event.priority, "event dequeued");
        Some(event)
    }

    /// Priority of the event `pop` would return next.
    pub fn peek_priority(&self) -> Option<i32> {
        self.inner.lock().head.as_ref().map(|node| node.event.priority)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> QueueStatsSnapshot {
        self.stats.snapshot()
    }

    /// Tears the queue down, discarding anything still queued. Returns the discard count.
    pub fn clean(mut self) -> usize {
        let inner = self.inner.get_mut();
        let discarded = unlink_all(&mut inner.head);
        inner.size = 0;
        self.stats.record_discarded(discarded);
        if discarded > 0 {
            trace!(discarded, "event queue cleaned");
        }
        discarded
    }
}

impl Default for EventQueue<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventQueue<'_> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        unlink_all(&mut inner.head);
        inner.size = 0;
    }
}

/// Frees nodes one at a time; the default recursive drop of a long list overflows the stack.
fn unlink_all(head: &mut Link<'_>) -> usize {
    let mut count = 0;
    let mut link = head.take();
    while let Some(mut node) = link {
        link = node.next.take();
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SystemId;
    use crate::resource::Resource;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn event(resource: &Resource, priority: i32, seq: i32) -> Event<'_> {
        Event::new(SystemId(0), resource, 0, priority, seq)
    }

    fn drain<'a>(queue: &EventQueue<'a>) -> Vec<Event<'a>> {
        std::iter::from_fn(|| queue.pop()).collect()
    }

    #[test]
    fn pops_by_priority_then_arrival() {
        let resource = Resource::create("Fuel", 0, 10).unwrap();
        let queue = EventQueue::new();
        for (seq, priority) in [5, 1, 5, 3].into_iter().enumerate() {
            queue.push(event(&resource, priority, seq as i32));
        }

        let popped: Vec<_> = drain(&queue)
            .into_iter()
            .map(|e| (e.priority, e.amount))
            .collect();
        assert_eq!(popped, vec![(5, 0), (5, 2), (3, 3), (1, 1)]);
    }

    #[test]
    fn push_splices_at_head_middle_and_tail() {
        let resource = Resource::create("Fuel", 0, 10).unwrap();
        let queue = EventQueue::new();
        // Tail, head, middle after equals, middle before lower, tail again.
        for (seq, priority) in [2, 4, 2, 3, 1, 4, 1].into_iter().enumerate() {
            queue.push(event(&resource, priority, seq as i32));
            assert_eq!(queue.len(), seq + 1);
        }
        assert_eq!(queue.peek_priority(), Some(4));

        let popped: Vec<_> = drain(&queue)
            .into_iter()
            .map(|e| (e.priority, e.amount))
            .collect();
        assert_eq!(
            popped,
            vec![(4, 1), (4, 5), (3, 3), (2, 0), (2, 2), (1, 4), (1, 6)]
        );
    }

    #[test]
    fn empty_pop_has_no_side_effects() {
        let queue = EventQueue::new();
        assert!(queue.pop().is_none());
        assert!(queue.pop().is_none());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.stats().empty_polls, 2);
        assert_eq!(queue.stats().popped, 0);
    }

    #[test]
    fn drains_exactly_what_was_pushed() {
        let resource = Resource::create("Water", 0, 10).unwrap();
        let queue = EventQueue::new();
        for i in 0..50 {
            queue.push(event(&resource, i % 4, i));
            assert_eq!(queue.len(), i as usize + 1);
        }

        for remaining in (0..50).rev() {
            assert!(queue.pop().is_some());
            assert_eq!(queue.len(), remaining);
        }
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());

        let stats = queue.stats();
        assert_eq!(stats.pushed, 50);
        assert_eq!(stats.popped, 50);
        assert_eq!(stats.empty_polls, 1);
    }

    #[test]
    fn peek_reports_head_priority() {
        let resource = Resource::create("Ore", 0, 10).unwrap();
        let queue = EventQueue::new();
        assert_eq!(queue.peek_priority(), None);
        queue.push(event(&resource, 2, 0));
        queue.push(event(&resource, 7, 1));
        assert_eq!(queue.peek_priority(), Some(7));
    }

    #[test]
    fn events_keep_their_fields() {
        let resource = Resource::create("Energy", 0, 10).unwrap();
        let queue = EventQueue::new();
        queue.push(Event::new(SystemId(4), &resource, 2, 3, -6));

        let popped = queue.pop().unwrap();
        assert_eq!(popped.system, SystemId(4));
        assert!(std::ptr::eq(popped.resource, &resource));
        assert_eq!(popped.status, 2);
        assert_eq!(popped.priority, 3);
        assert_eq!(popped.amount, -6);
    }

    #[test]
    fn clean_discards_remaining_events() {
        let resource = Resource::create("Fuel", 0, 10).unwrap();
        let queue = EventQueue::new();
        queue.push(event(&resource, 1, 0));
        queue.push(event(&resource, 2, 1));
        queue.push(event(&resource, 3, 2));
        assert_eq!(queue.clean(), 3);

        assert_eq!(EventQueue::new().clean(), 0);
    }

    #[test]
    fn long_queue_drops_without_recursion() {
        let resource = Resource::create("Fuel", 0, 10).unwrap();
        let queue = EventQueue::new();
        // Ascending priorities always land at the head, keeping setup linear.
        for priority in 0..200_000 {
            queue.push(event(&resource, priority, priority));
        }
        assert_eq!(queue.len(), 200_000);
        drop(queue);
    }

    #[test]
    fn concurrent_pushes_lose_nothing() {
        const THREADS: usize = 8;
        const PER_THREAD: i32 = 500;

        let resource = Resource::create("Shared", 0, 10).unwrap();
        let queue = EventQueue::new();

        crossbeam::scope(|scope| {
            for thread in 0..THREADS {
                let queue = &queue;
                let resource = &resource;
                scope.spawn(move |_| {
                    for seq in 0..PER_THREAD {
                        queue.push(Event::new(SystemId(thread), resource, 0, seq % 5, seq));
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(queue.len(), THREADS * PER_THREAD as usize);
        let events = drain(&queue);
        assert_eq!(events.len(), THREADS * PER_THREAD as usize);

        let unique: HashSet<_> = events.iter().map(|e| (e.system, e.amount)).collect();
        assert_eq!(unique.len(), events.len());

        assert!(events.windows(2).all(|w| w[0].priority >= w[1].priority));

        // Within one priority, each producer's events keep their push order.
        for window in events.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            if a.priority == b.priority && a.system == b.system {
                assert!(a.amount < b.amount);
            }
        }
    }

    #[test]
    fn concurrent_push_and_pop_hand_out_each_event_once() {
        const PRODUCERS: usize = 4;
        const CONSUMERS: usize = 4;
        const PER_PRODUCER: i32 = 1_000;
        let total = PRODUCERS * PER_PRODUCER as usize;

        let resource = Resource::create("Shared", 0, 10).unwrap();
        let queue = EventQueue::new();
        let taken = parking_lot::Mutex::new(Vec::with_capacity(total));

        crossbeam::scope(|scope| {
            for producer in 0..PRODUCERS {
                let queue = &queue;
                let resource = &resource;
                scope.spawn(move |_| {
                    for seq in 0..PER_PRODUCER {
                        queue.push(Event::new(SystemId(producer), resource, 0, seq % 3, seq));
                    }
                });
            }
            for _ in 0..CONSUMERS {
                let queue = &queue;
                let taken = &taken;
                scope.spawn(move |_| {
                    let backoff = crossbeam::utils::Backoff::new();
                    loop {
                        if taken.lock().len() >= total {
                            break;
                        }
                        match queue.pop() {
                            Some(event) => {
                                taken.lock().push((event.system, event.amount));
                                backoff.reset();
                            }
                            None => backoff.snooze(),
                        }
                    }
                });
            }
        })
        .unwrap();

        let taken = taken.into_inner();
        assert_eq!(taken.len(), total);
        let unique: HashSet<_> = taken.iter().copied().collect();
        assert_eq!(unique.len(), total);
        assert!(queue.is_empty());
    }

    proptest! {
        #[test]
        fn pop_order_is_stable_sort_by_priority(priorities in prop::collection::vec(-5i32..5, 0..200)) {
            let resource = Resource::create("Prop", 0, 1).unwrap();
            let queue = EventQueue::new();
            for (seq, &priority) in priorities.iter().enumerate() {
                queue.push(event(&resource, priority, seq as i32));
            }

            let mut expected: Vec<(i32, i32)> = priorities
                .iter()
                .enumerate()
                .map(|(seq, &priority)| (priority, seq as i32))
                .collect();
            expected.sort_by_key(|&(priority, _)| std::cmp::Reverse(priority));

            let actual: Vec<(i32, i32)> = drain(&queue)
                .into_iter()
                .map(|e| (e.priority, e.amount))
                .collect();
            prop_assert_eq!(actual, expected);
            prop_assert!(queue.pop().is_none());
        }
    }
}
