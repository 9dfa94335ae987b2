//! ## sluice-core::resource
//! **Named, capacity-bounded counters and the registry that owns them**
//!
//! A [`Resource`] carries its own lock; the amount is only reachable through a
//! [`ResourceGuard`], so every bound check and update happens inside one critical section.
//!
//! ### Key Submodules:
//! - `amount/`: `(resource, quantity)` value objects
//! - `array/`: the owning, doubling registry of resources

pub mod amount;
pub mod array;

pub use amount::ResourceAmount;
pub use array::ResourceArray;

use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;

use crate::error::CoreError;

/// Rejected attempts to move a resource outside `[0, max_capacity]`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient {resource}: requested {requested}, available {available}")]
    Insufficient {
        resource: String,
        requested: i32,
        available: i32,
    },

    #[error("Capacity exceeded for {resource}: requested {requested}, headroom {headroom}")]
    CapacityExceeded {
        resource: String,
        requested: i32,
        headroom: i32,
    },

    #[error("Invalid transfer amount {0}")]
    InvalidAmount(i32),
}

/// A named counter with an upper bound, guarded by its own mutex.
#[derive(Debug)]
pub struct Resource {
    name: String,
    max_capacity: i32,
    amount: Mutex<i32>,
}

impl Resource {
    /// Creates a resource holding its own copy of `name`.
    ///
    /// The name buffer is reserved fallibly at exactly `name.len()` bytes. Fails with
    /// [`CoreError::InvalidArgument`] on an empty name, a negative bound, or a starting
    /// amount outside `[0, max_capacity]`.
    pub fn create(name: &str, amount: i32, max_capacity: i32) -> Result<Self, CoreError> {
        if name.is_empty() {
            return Err(CoreError::InvalidArgument("resource name is empty".into()));
        }
        if max_capacity < 0 {
            return Err(CoreError::InvalidArgument(format!(
                "resource {name}: negative max capacity {max_capacity}"
            )));
        }
        if !(0..=max_capacity).contains(&amount) {
            return Err(CoreError::InvalidArgument(format!(
                "resource {name}: amount {amount} outside 0..={max_capacity}"
            )));
        }

        let mut owned = String::new();
        owned
            .try_reserve_exact(name.len())
            .map_err(CoreError::allocation("resource name"))?;
        owned.push_str(name);

        Ok(Self {
            name: owned,
            max_capacity,
            amount: Mutex::new(amount),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_capacity(&self) -> i32 {
        self.max_capacity
    }

    /// Snapshot of the current amount. Stale as soon as the lock is released.
    pub fn amount(&self) -> i32 {
        *self.amount.lock()
    }

    /// Blocks until the resource's lock is available.
    #[inline]
    pub fn lock(&self) -> ResourceGuard<'_> {
        ResourceGuard {
            name: &self.name,
            max_capacity: self.max_capacity,
            amount: self.amount.lock(),
        }
    }
}

/// Exclusive access to a resource's amount; the lock is released on drop.
pub struct ResourceGuard<'r> {
    name: &'r str,
    max_capacity: i32,
    amount: MutexGuard<'r, i32>,
}

impl ResourceGuard<'_> {
    pub fn amount(&self) -> i32 {
        *self.amount
    }

    pub fn max_capacity(&self) -> i32 {
        self.max_capacity
    }

    /// Units that can still be deposited.
    pub fn headroom(&self) -> i32 {
        self.max_capacity - *self.amount
    }

    /// Removes exactly `units` or nothing. Returns the new amount.
    pub fn withdraw(&mut self, units: i32) -> Result<i32, TransferError> {
        if units < 0 {
            return Err(TransferError::InvalidAmount(units));
        }
        if units > *self.amount {
            return Err(TransferError::Insufficient {
                resource: self.name.to_owned(),
                requested: units,
                available: *self.amount,
            });
        }
        *self.amount -= units;
        Ok(*self.amount)
    }

    /// Adds exactly `units` or nothing. Returns the new amount.
    pub fn deposit(&mut self, units: i32) -> Result<i32, TransferError> {
        if units < 0 {
            return Err(TransferError::InvalidAmount(units));
        }
        let headroom = self.headroom();
        if units > headroom {
            return Err(TransferError::CapacityExceeded {
                resource: self.name.to_owned(),
                requested: units,
                headroom,
            });
        }
        *self.amount += units;
        Ok(*self.amount)
    }

    /// Adds as many of `units` as fit and returns how many were stored.
    pub fn deposit_up_to(&mut self, units: i32) -> Result<i32, TransferError> {
        if units < 0 {
            return Err(TransferError::InvalidAmount(units));
        }
        let stored = units.min(self.headroom());
        *self.amount += stored;
        Ok(stored)
    }

    /// Signed form of [`withdraw`](Self::withdraw) / [`deposit`](Self::deposit).
    pub fn apply(&mut self, delta: i32) -> Result<i32, TransferError> {
        if delta < 0 {
            self.withdraw(delta.checked_neg().ok_or(TransferError::InvalidAmount(delta))?)
        } else {
            self.deposit(delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn create_copies_name() {
        let source = String::from("Fuel");
        let resource = Resource::create(&source, 10, 100).unwrap();
        drop(source);
        assert_eq!(resource.name(), "Fuel");
        assert_eq!(resource.amount(), 10);
        assert_eq!(resource.max_capacity(), 100);
    }

    #[test]
    fn create_rejects_invalid_arguments() {
        assert!(matches!(
            Resource::create("", 0, 1),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            Resource::create("Oxygen", 5, -1),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            Resource::create("Oxygen", 11, 10),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            Resource::create("Oxygen", -1, 10),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn withdraw_is_all_or_nothing() {
        let resource = Resource::create("Water", 3, 10).unwrap();
        let mut guard = resource.lock();
        assert_eq!(
            guard.withdraw(4),
            Err(TransferError::Insufficient {
                resource: "Water".into(),
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(guard.amount(), 3);
        assert_eq!(guard.withdraw(3), Ok(0));
    }

    #[test]
    fn deposit_respects_capacity() {
        let resource = Resource::create("Energy", 8, 10).unwrap();
        let mut guard = resource.lock();
        assert!(matches!(
            guard.deposit(3),
            Err(TransferError::CapacityExceeded { headroom: 2, .. })
        ));
        assert_eq!(guard.deposit_up_to(3), Ok(2));
        assert_eq!(guard.amount(), 10);
        assert_eq!(guard.deposit_up_to(5), Ok(0));
    }

    #[test]
    fn apply_routes_by_sign() {
        let resource = Resource::create("Ore", 5, 10).unwrap();
        let mut guard = resource.lock();
        assert_eq!(guard.apply(-2), Ok(3));
        assert_eq!(guard.apply(4), Ok(7));
        assert_eq!(guard.apply(i32::MIN), Err(TransferError::InvalidAmount(i32::MIN)));
        assert_eq!(guard.withdraw(-1), Err(TransferError::InvalidAmount(-1)));
    }

    #[test]
    fn concurrent_transfers_stay_in_bounds() {
        let resource = Resource::create("Shared", 50, 100).unwrap();
        let violated = AtomicBool::new(false);

        crossbeam::scope(|scope| {
            for worker in 0..8 {
                let resource = &resource;
                let violated = &violated;
                scope.spawn(move |_| {
                    for round in 0..2_000 {
                        let mut guard = resource.lock();
                        let _ = if (worker + round) % 2 == 0 {
                            guard.withdraw(7)
                        } else {
                            guard.deposit(7)
                        };
                        if !(0..=guard.max_capacity()).contains(&guard.amount()) {
                            violated.store(true, Ordering::Relaxed);
                        }
                    }
                });
            }
        })
        .unwrap();

        assert!(!violated.load(Ordering::Relaxed));
        assert!((0..=100).contains(&resource.amount()));
    }
}
