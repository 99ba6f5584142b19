#![deny(unreachable_patterns)]
//! Stage Scheduler, Cleanup Reaper, and Error Taxonomy & Policy (C10-C12):
//! drives jobs through the nine-stage pipeline, sweeps terminal jobs past
//! retention, and holds the one fixed table that turns a fault into a
//! scheduling decision.

pub mod config;
pub mod error;
pub mod logging;
pub mod policy;
pub mod reaper;
pub mod scheduler;

pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, OrchestratorResult};
pub use logging::JobLogger;
pub use policy::{Action, Policy};
pub use scheduler::Scheduler;
