//! Resource declarations.
//!
//! Each entry becomes one `Resource` in the registry, in declaration order.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// A named, bounded resource and its starting amount.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    #[validate(custom(function = validation::validate_name))]
    pub name: String,

    /// Starting amount; must not exceed `max_capacity`.
    #[validate(range(min = 0))]
    pub amount: i32,

    #[validate(range(min = 0))]
    pub max_capacity: i32,
}

impl ResourceSpec {
    pub fn new(name: &str, amount: i32, max_capacity: i32) -> Self {
        Self {
            name: name.into(),
            amount,
            max_capacity,
        }
    }
}

pub(crate) fn default_resources() -> Vec<ResourceSpec> {
    vec![
        ResourceSpec::new("Fuel", 1000, 1000),
        ResourceSpec::new("Energy", 30, 50),
        ResourceSpec::new("Oxygen", 20, 50),
        ResourceSpec::new("Distance", 0, 5000),
    ]
}
