//! ## sluice-core::resource::array
//! **Owning registry of resources with doubling growth**
//!
//! Storage is a boxed slice of boxed slots. Growing allocates a slice twice as long and
//! moves the boxes across, so a resource never changes address once added and borrowed
//! `&Resource` handles taken after setup stay valid for the registry's lifetime.

use tracing::debug;

use super::Resource;
use crate::error::CoreError;

type Slots = Box<[Option<Box<Resource>>]>;

/// Owns every [`Resource`] of a run.
///
/// Structural changes need `&mut self`; once shared, only resource contents change.
#[derive(Debug)]
pub struct ResourceArray {
    slots: Slots,
    size: usize,
}

impl ResourceArray {
    /// Empty registry with room for one resource.
    pub fn new() -> Self {
        let slots: Slots = Box::new([None]);
        Self { slots, size: 0 }
    }

    /// Appends `resource`, doubling the storage first when full. Returns its index.
    ///
    /// A failed grow leaves the registry untouched.
    pub fn add(&mut self, resource: Resource) -> Result<usize, CoreError> {
        if self.size == self.slots.len() {
            self.grow()?;
        }

        let index = self.size;
        self.slots[index] = Some(Box::new(resource));
        self.size += 1;
        Ok(index)
    }

    fn grow(&mut self) -> Result<(), CoreError> {
        self.grow_to(next_capacity(self.slots.len()))
    }

    /// Moves every resource into fresh storage of `capacity` slots. Nothing changes
    /// unless the allocation succeeds.
    fn grow_to(&mut self, capacity: usize) -> Result<(), CoreError> {
        let mut slots = allocate_slots(capacity)?;

        for (from, to) in self.slots[..self.size].iter_mut().zip(slots.iter_mut()) {
            *to = from.take();
        }
        self.slots = slots;

        debug!(capacity, size = self.size, "resource array grown");
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Resource> {
        self.slots[..self.size].get(index)?.as_deref()
    }

    pub fn find(&self, name: &str) -> Option<&Resource> {
        self.iter().find(|resource| resource.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> + '_ {
        self.slots[..self.size].iter().filter_map(|slot| slot.as_deref())
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Destroys every resource and releases the storage; size and capacity drop to zero.
    pub fn clean(&mut self) {
        for slot in self.slots[..self.size].iter_mut() {
            drop(slot.take());
        }
        self.slots = Slots::default();
        self.size = 0;
    }
}

impl Default for ResourceArray {
    fn default() -> Self {
        Self::new()
    }
}

fn next_capacity(current: usize) -> usize {
    current.saturating_mul(2).max(1)
}

fn allocate_slots(capacity: usize) -> Result<Slots, CoreError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(CoreError::allocation("resource array storage"))?;
    slots.resize_with(capacity, || None);
    Ok(slots.into_boxed_slice())
}
