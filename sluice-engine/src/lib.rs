pub mod engine;

// Re-export the engine entry points so frontends can simply do:
pub use engine::{EngineError, Report, Simulation};
