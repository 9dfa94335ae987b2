//! Errors raised while assembling a [`SluiceConfig`](crate::SluiceConfig).

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `load_from_path` was pointed at a file that does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// A resource, system, worker or telemetry field is out of range.
    #[error("Invalid configuration:\n{}", summarize(.0))]
    Validation(#[source] ValidationErrors),

    /// Resources and systems do not line up: duplicates, unknown references, or a
    /// starting amount above capacity.
    #[error("Inconsistent topology: {0}")]
    Topology(String),

    /// A layer could not be merged or extracted.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] Box<figment::Error>),

    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One `field: code` line per failed top-level check, sorted by field. Failures inside
/// the resource and system lists fall back to validator's own rendering, which carries
/// the list index.
fn summarize(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let lines: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let reason = failure
                    .message
                    .as_deref()
                    .unwrap_or_else(|| failure.code.as_ref());
                format!("  {field}: {reason}")
            })
        })
        .collect();

    if lines.is_empty() {
        errors.to_string()
    } else {
        lines.join("\n")
    }
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Parsing(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SluiceConfig;
    use validator::Validate;

    #[test]
    fn empty_registry_is_summarized_by_field() {
        let config = SluiceConfig {
            resources: Vec::new(),
            systems: Vec::new(),
            ..SluiceConfig::default()
        };
        let error = ConfigError::from(config.validate().unwrap_err());
        assert_eq!(error.to_string(), "Invalid configuration:\n  resources: length");
    }
}
