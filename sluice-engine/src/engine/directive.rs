//! Meaning the engine gives to an event's opaque `status` and `priority` integers.

use std::fmt;

/// What a manager should do with a popped event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum Directive {
    /// Withdraw `-amount` units; all or nothing.
    Acquire = 1,
    /// Deposit up to `amount` units; the reply says how many fit.
    Release = 2,
}

impl From<Directive> for i32 {
    fn from(directive: Directive) -> Self {
        directive as i32
    }
}

impl TryFrom<i32> for Directive {
    type Error = i32;

    fn try_from(status: i32) -> Result<Self, Self::Error> {
        match status {
            1 => Ok(Directive::Acquire),
            2 => Ok(Directive::Release),
            other => Err(other),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Acquire => f.write_str("acquire"),
            Directive::Release => f.write_str("release"),
        }
    }
}

/// Deliveries outrank first requests, which outrank retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl From<Priority> for i32 {
    fn from(priority: Priority) -> Self {
        priority as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for directive in [Directive::Acquire, Directive::Release] {
            assert_eq!(Directive::try_from(i32::from(directive)), Ok(directive));
        }
        assert_eq!(Directive::try_from(0), Err(0));
        assert_eq!(Directive::try_from(99), Err(99));
    }

    #[test]
    fn priorities_order_like_their_codes() {
        assert!(i32::from(Priority::High) > i32::from(Priority::Medium));
        assert!(i32::from(Priority::Medium) > i32::from(Priority::Low));
    }
}
