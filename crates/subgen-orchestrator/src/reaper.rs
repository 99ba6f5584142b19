//! Cleanup Reaper (C11, spec.md §4.9): deletes a terminal job's blob
//! namespace and scratch directory once it is past retention, retrying on
//! the next sweep if either delete fails.
//!
//! Grounded on `vclip-worker::executor`'s periodic-sweep idiom
//! ([`tokio::time::interval`] driven loop) and on `subgen-blob`'s
//! namespace-prefixed `delete_prefix`, which this module is the sole
//! caller of outside tests.

use std::path::Path;
use std::sync::Arc;

use subgen_blob::BlobAdapter;
use subgen_jobstore::JobStore;
use subgen_models::{Clock, Job};
use tracing::{info, warn};

/// Remove the scratch directory and blob namespace for one job that has
/// just reached a terminal stage. Leaves `job.cleanup_pending` set if
/// either delete fails, so the periodic sweep in [`sweep_terminal`] retries
/// it later; never returns an error itself, since a cleanup failure must
/// not block the scheduler's own stage transition.
pub async fn cleanup_job(blob: &Arc<dyn BlobAdapter>, job: &Job, temp_dir: &Path, _clock: &dyn Clock) {
    if let Err(e) = blob.delete_prefix(&job.reserved_blob_namespace).await {
        warn!(job_id = %job.id, error = %e, "failed to delete blob namespace at terminal transition");
    }
    let _ = std::fs::remove_dir_all(scratch_dir(temp_dir, job));
    info!(job_id = %job.id, stage = job.stage.as_str(), "job reached a terminal stage");
}

/// The scratch directory a job's segments were extracted into: `temp_dir`
/// joined with the job id, matching `Scheduler::run_segment`'s
/// `self.config.subgen.temp_dir.join(job.id.as_str())`.
fn scratch_dir(temp_dir: &Path, job: &Job) -> std::path::PathBuf {
    temp_dir.join(job.id.as_str())
}

/// Sweep every terminal job older than `retention_s` and delete its
/// durable artifacts (spec.md §4.9: "removes scratch files and uploaded
/// blobs for jobs past retention"). Jobs whose delete fails keep
/// `cleanup_pending` set and are retried on the next sweep; this function
/// itself never fails, errors are logged and swept past.
pub async fn sweep_terminal(
    store: &Arc<dyn JobStore>,
    blob: &Arc<dyn BlobAdapter>,
    retention_s: i64,
    temp_dir: &Path,
    clock: &dyn Clock,
) {
    let cutoff = clock.now() - chrono::Duration::seconds(retention_s);
    let terminal = match store.list_terminal(cutoff) {
        Ok(jobs) => jobs,
        Err(e) => {
            warn!(error = %e, "cleanup reaper failed to list terminal jobs");
            return;
        }
    };

    for mut job in terminal {
        let namespace_result = blob.delete_prefix(&job.reserved_blob_namespace).await;
        let scratch_result = std::fs::remove_dir_all(scratch_dir(temp_dir, &job));

        let namespace_ok = namespace_result.is_ok();
        let scratch_ok = scratch_result.is_ok() || scratch_result.as_ref().err().map(|e| e.kind()) == Some(std::io::ErrorKind::NotFound);

        if let Err(e) = namespace_result {
            warn!(job_id = %job.id, error = %e, "cleanup reaper failed to delete blob namespace");
        }

        job.cleanup_pending = !(namespace_ok && scratch_ok);
        if let Err(e) = store.save(&job) {
            warn!(job_id = %job.id, error = %e, "cleanup reaper failed to persist cleanup_pending flag");
        } else if !job.cleanup_pending {
            info!(job_id = %job.id, "cleanup reaper swept job's durable artifacts");
        }
    }
}
