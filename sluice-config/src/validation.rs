//! Custom validation functions for configuration.
//!
//! Field-level checks plug into `validator` derives; `validate_topology` checks the
//! cross-references the derives cannot see.

use std::collections::HashSet;

use validator::ValidationError;

use crate::{ConfigError, SluiceConfig};

/// Validate a resource or system name: non-empty, printable, at most 64 bytes.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.trim().is_empty() && name.len() <= 64 && !name.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_name"))
    }
}

/// Validate a tracing level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Checks that names are unique, starting amounts fit their capacity, and every
/// system refers to a declared resource.
pub fn validate_topology(config: &SluiceConfig) -> Result<(), ConfigError> {
    let mut resources = HashSet::new();
    for resource in &config.resources {
        if !resources.insert(resource.name.as_str()) {
            return Err(ConfigError::Topology(format!(
                "duplicate resource '{}'",
                resource.name
            )));
        }
        if resource.amount > resource.max_capacity {
            return Err(ConfigError::Topology(format!(
                "resource '{}' starts at {} above its capacity {}",
                resource.name, resource.amount, resource.max_capacity
            )));
        }
    }

    let mut systems = HashSet::new();
    for system in &config.systems {
        if !systems.insert(system.name.as_str()) {
            return Err(ConfigError::Topology(format!(
                "duplicate system '{}'",
                system.name
            )));
        }
        for amount in system.consumes.iter().chain(system.produces.iter()) {
            if !resources.contains(amount.resource.as_str()) {
                return Err(ConfigError::Topology(format!(
                    "system '{}' refers to unknown resource '{}'",
                    system.name, amount.resource
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AmountSpec, ResourceSpec, SystemSpec};

    #[test]
    fn names() {
        assert!(validate_name("Fuel").is_ok());
        assert!(validate_name("Power Generation").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("bad\nname").is_err());
        assert!(validate_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn log_levels() {
        assert!(validate_log_level("INFO").is_ok());
        assert!(validate_log_level("trace").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn default_topology_is_consistent() {
        assert!(validate_topology(&SluiceConfig::default()).is_ok());
    }

    #[test]
    fn rejects_duplicate_resources() {
        let mut config = SluiceConfig::default();
        let first = config.resources[0].clone();
        config.resources.push(first);
        assert!(matches!(
            validate_topology(&config),
            Err(ConfigError::Topology(msg)) if msg.contains("duplicate resource")
        ));
    }

    #[test]
    fn rejects_overfilled_resource() {
        let mut config = SluiceConfig::default();
        config.resources.push(ResourceSpec {
            name: "Overfull".into(),
            amount: 11,
            max_capacity: 10,
        });
        assert!(matches!(
            validate_topology(&config),
            Err(ConfigError::Topology(msg)) if msg.contains("above its capacity")
        ));
    }

    #[test]
    fn rejects_unknown_resource_reference() {
        let mut config = SluiceConfig::default();
        config.systems.push(SystemSpec {
            name: "Ghost".into(),
            consumes: Some(AmountSpec {
                resource: "Unobtainium".into(),
                amount: 1,
            }),
            produces: None,
            processing_time_ms: 1,
            cycles: 1,
        });
        assert!(matches!(
            validate_topology(&config),
            Err(ConfigError::Topology(msg)) if msg.contains("Unobtainium")
        ));
    }
}
