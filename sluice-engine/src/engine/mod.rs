mod directive;
mod error;
mod event_processing;
mod manager;
mod report;
mod runtime;
mod system;

pub use self::{
    directive::{Directive, Priority},
    error::EngineError,
    event_processing::{EventProcessor, Rejection, Reply, TransferProcessor},
    report::{ManagerReport, QueueReport, Report, ResourceReport, SystemReport},
    runtime::Simulation,
    system::RetryPolicy,
};

pub mod prelude {
    pub use super::{Directive, EngineError, EventProcessor, Priority, Report, Simulation};
}
