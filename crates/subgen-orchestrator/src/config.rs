//! Orchestrator configuration: every pipeline tunable named in spec.md §6
//! lives in [`subgen_models::SubgenConfig`]; this module adds only the two
//! knobs that are specific to running the scheduler as a long-lived
//! process and that spec.md does not name (graceful shutdown grace period,
//! Cleanup Reaper sweep cadence), loaded the way
//! `vclip-worker::config::WorkerConfig::from_env` loads `WORKER_*`
//! variables.

use std::time::Duration;

use subgen_models::SubgenConfig;

/// The scheduler's full configuration: the shared pipeline config plus the
/// orchestrator's own runtime knobs.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub subgen: SubgenConfig,
    /// Grace period given to in-flight tasks to finish after a shutdown
    /// signal before the process exits anyway.
    pub shutdown_timeout: Duration,
    /// How often the Cleanup Reaper sweeps for terminal jobs past
    /// `retention_s`.
    pub reaper_sweep_interval: Duration,
    /// How often the scheduler scans the job store for active jobs to
    /// advance.
    pub scan_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            subgen: SubgenConfig::default(),
            shutdown_timeout: Duration::from_secs(30),
            reaper_sweep_interval: Duration::from_secs(300),
            scan_interval: Duration::from_secs(2),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            subgen: SubgenConfig::from_env(),
            shutdown_timeout: Duration::from_secs(
                std::env::var("SUBGEN_SHUTDOWN_TIMEOUT_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.shutdown_timeout.as_secs()),
            ),
            reaper_sweep_interval: Duration::from_secs(
                std::env::var("SUBGEN_REAPER_SWEEP_INTERVAL_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.reaper_sweep_interval.as_secs()),
            ),
            scan_interval: Duration::from_secs(
                std::env::var("SUBGEN_SCAN_INTERVAL_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.scan_interval.as_secs()),
            ),
        }
    }
}
