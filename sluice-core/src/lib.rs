//! # sluice-core
//!
//! In-process coordination primitives for producers and consumers contending over a
//! bounded set of named, capacity-limited resources.
//!
//! ### Key Submodules:
//! - `resource`: lockable bounded counters and the `ResourceArray` registry that owns them
//! - `events`: priority-ordered, FIFO-within-priority `EventQueue`
//!
//! ### Lifetimes
//! The registry owns every resource. Events and resource amounts borrow from it, so
//! the registry outlives the queue and every worker thread that touches it. The queue
//! lock and a resource lock are never held together.

pub mod error;
pub mod events;
pub mod resource;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::resource::*;
}

pub use error::CoreError;
