//! Worker pool and retry parameters.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Consumer pool sizing and the retry policy systems apply to rejected requests.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Number of manager threads popping events.
    #[serde(default = "default_consumers")]
    #[validate(range(min = 1, max = 256))]
    pub consumers: usize,

    /// Attempts per acquire or delivery before a system gives up on it for this cycle.
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10_000))]
    pub max_attempts: u32,

    /// Pause before re-queuing a rejected request.
    #[serde(default = "default_retry_delay_ms")]
    #[validate(range(max = 10_000))]
    pub retry_delay_ms: u64,

    /// Upper bound of random extra processing time per cycle.
    #[serde(default)]
    #[validate(range(max = 10_000))]
    pub processing_jitter_ms: u64,

    /// Seed for processing jitter; each system derives its own stream from it.
    #[serde(default)]
    pub seed: u64,
}

fn default_consumers() -> usize {
    num_cpus::get().clamp(1, 4)
}

fn default_max_attempts() -> u32 {
    50
}

fn default_retry_delay_ms() -> u64 {
    2
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            consumers: default_consumers(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            processing_jitter_ms: 0,
            seed: 0,
        }
    }
}
