//! End-of-run summary, serializable for the CLI.

use serde::Serialize;

use sluice_core::events::stats::QueueStatsSnapshot;
use sluice_core::resource::ResourceArray;

use super::EngineError;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Report {
    pub resources: Vec<ResourceReport>,
    pub systems: Vec<SystemReport>,
    pub managers: Vec<ManagerReport>,
    pub queue: QueueReport,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceReport {
    pub name: String,
    pub amount: i32,
    pub max_capacity: i32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SystemReport {
    pub name: String,
    /// Cycles that got their inputs and ran to delivery.
    pub completed: u32,
    /// Cycles abandoned because the consumed resource stayed short.
    pub starved: u32,
    pub delivered: i64,
    /// Produced units still held when the system stopped.
    pub undelivered: i64,
    pub rejections: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ManagerReport {
    pub handled: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct QueueReport {
    pub pushed: u64,
    pub popped: u64,
    pub empty_polls: u64,
    pub discarded: u64,
}

impl From<QueueStatsSnapshot> for QueueReport {
    fn from(stats: QueueStatsSnapshot) -> Self {
        Self {
            pushed: stats.pushed,
            popped: stats.popped,
            empty_polls: stats.empty_polls,
            discarded: stats.discarded,
        }
    }
}

impl ResourceReport {
    pub(crate) fn collect(registry: &ResourceArray) -> Vec<Self> {
        registry
            .iter()
            .map(|resource| ResourceReport {
                name: resource.name().to_owned(),
                amount: resource.amount(),
                max_capacity: resource.max_capacity(),
            })
            .collect()
    }
}

impl Report {
    pub fn to_yaml(&self) -> Result<String, EngineError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceReport> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn system(&self, name: &str) -> Option<&SystemReport> {
        self.systems.iter().find(|s| s.name == name)
    }
}
