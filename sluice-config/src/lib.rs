//! # Sluice Configuration System
//!
//! Hierarchical configuration for a sluice simulation: the resources in the registry,
//! the systems that contend for them, the manager pool, and telemetry.
//!
//! ## Features
//! - **Layered sources**: defaults, YAML files, then `SLUICE_*` environment variables
//! - **Validation**: field checks through `validator`, then a topology pass that
//!   resolves every resource reference

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

mod error;
mod resources;
mod systems;
mod telemetry;
mod validation;
mod workers;

pub use error::ConfigError;
pub use resources::ResourceSpec;
pub use systems::{AmountSpec, SystemSpec};
pub use telemetry::TelemetryConfig;
pub use validation::validate_topology;
pub use workers::WorkerConfig;

const BASE_FILE: &str = "config/sluice.yaml";
const ENV_PREFIX: &str = "SLUICE_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct SluiceConfig {
    /// Resources in registry order.
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub resources: Vec<ResourceSpec>,

    /// Systems, one producer thread each.
    #[validate(nested)]
    pub systems: Vec<SystemSpec>,

    /// Manager pool and retry policy.
    #[serde(default)]
    #[validate(nested)]
    pub workers: WorkerConfig,

    /// Logging configuration.
    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl Default for SluiceConfig {
    fn default() -> Self {
        Self {
            resources: resources::default_resources(),
            systems: systems::default_systems(),
            workers: WorkerConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl SluiceConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/sluice.yaml`, if present
    /// 3. `config/<SLUICE_ENV>.yaml`, if present (`SLUICE_ENV` defaults to `default`)
    /// 4. `SLUICE_*` environment variables, nested keys split on `__`
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(SluiceConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        } else {
            info!("{BASE_FILE} not found, using default configuration");
        }

        let env = std::env::var("SLUICE_ENV").unwrap_or_else(|_| "default".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file, layered over defaults and under the
    /// environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(SluiceConfig::default())).merge(Yaml::file(path));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.check()?;
        Ok(config)
    }

    /// Field validation followed by the topology pass.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        validate_topology(self)
    }
}
