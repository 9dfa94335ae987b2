//! ## sluice-core::events
//! **Priority-ordered event queue shared by producer and consumer threads**
//!
//! ### Key Submodules:
//! - `queue/`: mutex-guarded singly-linked list sorted by priority, FIFO within a priority
//! - `stats/`: atomic push/pop counters

pub mod queue;
pub mod stats;

pub use queue::EventQueue;
pub use stats::QueueStats;

use std::fmt;

use crate::resource::Resource;

/// Opaque identity of whatever raised an event. Never interpreted by the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub usize);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// A unit of work against a resource.
///
/// `status` and `amount` are caller-defined; the queue only looks at `priority`
/// (higher first).
#[derive(Clone, Copy, Debug)]
pub struct Event<'a> {
    pub system: SystemId,
    pub resource: &'a Resource,
    pub status: i32,
    pub priority: i32,
    pub amount: i32,
}

impl<'a> Event<'a> {
    #[inline]
    pub fn new(
        system: SystemId,
        resource: &'a Resource,
        status: i32,
        priority: i32,
        amount: i32,
    ) -> Self {
        Self {
            system,
            resource,
            status,
            priority,
            amount,
        }
    }
}
