use thiserror::Error;

use sluice_config::ConfigError;
use sluice_core::CoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Core(#[from] CoreError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("System '{system}' refers to unknown resource '{resource}'")]
    UnknownResource { system: String, resource: String },

    #[error("Failed to spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker thread {0} panicked")]
    WorkerPanicked(String),

    #[error("Reply channel closed for {0}")]
    Disconnected(String),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_yaml::Error),
}
