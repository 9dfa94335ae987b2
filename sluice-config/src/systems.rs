//! System declarations.
//!
//! A system optionally consumes one resource and optionally produces another, once per
//! cycle, with a fixed processing time in between.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// `amount` units of the resource called `resource`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct AmountSpec {
    #[validate(custom(function = validation::validate_name))]
    pub resource: String,

    #[validate(range(min = 1))]
    pub amount: i32,
}

/// A producer/consumer actor in the simulation.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct SystemSpec {
    #[validate(custom(function = validation::validate_name))]
    pub name: String,

    /// Resource taken at the start of every cycle.
    #[serde(default)]
    #[validate(nested)]
    pub consumes: Option<AmountSpec>,

    /// Resource delivered at the end of every cycle.
    #[serde(default)]
    #[validate(nested)]
    pub produces: Option<AmountSpec>,

    /// Time spent converting between consuming and producing.
    #[serde(default = "default_processing_time_ms")]
    #[validate(range(max = 60_000))]
    pub processing_time_ms: u64,

    /// Number of consume/produce cycles to run.
    #[serde(default = "default_cycles")]
    #[validate(range(min = 1, max = 1_000_000))]
    pub cycles: u32,
}

fn default_processing_time_ms() -> u64 {
    10
}

fn default_cycles() -> u32 {
    20
}

fn system(
    name: &str,
    consumes: Option<(&str, i32)>,
    produces: Option<(&str, i32)>,
    processing_time_ms: u64,
) -> SystemSpec {
    let amount = |(resource, amount): (&str, i32)| AmountSpec {
        resource: resource.into(),
        amount,
    };
    SystemSpec {
        name: name.into(),
        consumes: consumes.map(amount),
        produces: produces.map(amount),
        processing_time_ms,
        cycles: default_cycles(),
    }
}

pub(crate) fn default_systems() -> Vec<SystemSpec> {
    vec![
        system("Power Generation", Some(("Fuel", 5)), Some(("Energy", 7)), 20),
        system("Oxygen Generation", Some(("Energy", 2)), Some(("Oxygen", 4)), 15),
        system("Propulsion", Some(("Energy", 5)), Some(("Distance", 25)), 25),
        system("Life Support", Some(("Oxygen", 3)), None, 10),
    ]
}
