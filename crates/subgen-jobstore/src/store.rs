//! Crash-consistent durable persistence of `Job` records (C2).
//!
//! The file-rename primitive is the transaction (spec.md §9): `save` writes
//! to a sibling temp file, rotates the current canonical file to a `.bak`
//! sibling, then renames the temp file into place. `load` treats "canonical
//! missing, backup present" as the normal crash-recovery path, not an
//! error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use subgen_models::{Job, JobId, JOB_SCHEMA_VERSION};
use tracing::warn;

use crate::error::{JobStoreError, JobStoreResult};

/// Operations over the durable job record store.
pub trait JobStore: Send + Sync {
    fn create(&self, job: &Job) -> JobStoreResult<()>;
    fn load(&self, id: &JobId) -> JobStoreResult<Job>;
    fn save(&self, job: &Job) -> JobStoreResult<()>;
    fn list_active(&self) -> JobStoreResult<Vec<Job>>;
    fn list_terminal(&self, before: DateTime<Utc>) -> JobStoreResult<Vec<Job>>;
}

/// A `JobStore` backed by one JSON file per job under `dir`, with a single
/// retained backup generation per job.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    dir: PathBuf,
}

impl FileJobStore {
    pub fn new(dir: impl Into<PathBuf>) -> JobStoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn canonical_path(&self, id: &JobId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_str()))
    }

    fn backup_path(&self, id: &JobId) -> PathBuf {
        self.dir.join(format!("{}.json.bak", id.as_str()))
    }

    fn temp_path(&self, id: &JobId) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", id.as_str()))
    }

    fn decode(bytes: &[u8], id: &JobId) -> JobStoreResult<Job> {
        let job: Job = serde_json::from_slice(bytes)?;
        if job.schema_version != JOB_SCHEMA_VERSION {
            return Err(JobStoreError::UnsupportedSchemaVersion {
                job_id: id.to_string(),
                found: job.schema_version,
                expected: JOB_SCHEMA_VERSION,
            });
        }
        Ok(job)
    }

    fn try_read(path: &Path, id: &JobId) -> Option<JobStoreResult<Job>> {
        let bytes = std::fs::read(path).ok()?;
        Some(Self::decode(&bytes, id))
    }

    fn all_job_files(&self) -> JobStoreResult<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if name.ends_with(".json") {
                out.push(path);
            }
        }
        Ok(out)
    }
}

impl JobStore for FileJobStore {
    fn create(&self, job: &Job) -> JobStoreResult<()> {
        let canonical = self.canonical_path(&job.id);
        if canonical.exists() {
            return Err(JobStoreError::already_exists(job.id.to_string()));
        }
        self.save(job)
    }

    fn save(&self, job: &Job) -> JobStoreResult<()> {
        let canonical = self.canonical_path(&job.id);
        let backup = self.backup_path(&job.id);
        let temp = self.temp_path(&job.id);

        let bytes = serde_json::to_vec_pretty(job)?;
        std::fs::write(&temp, &bytes)?;

        if canonical.exists() {
            // Single retained generation: overwrite any prior backup.
            std::fs::rename(&canonical, &backup)?;
        }
        std::fs::rename(&temp, &canonical)?;
        Ok(())
    }

    fn load(&self, id: &JobId) -> JobStoreResult<Job> {
        let canonical = self.canonical_path(id);
        let backup = self.backup_path(id);

        if let Some(result) = Self::try_read(&canonical, id) {
            match result {
                Ok(job) => return Ok(job),
                Err(canonical_err) => {
                    warn!(job_id = %id, error = %canonical_err, "canonical job record corrupt, falling back to backup");
                    return match Self::try_read(&backup, id) {
                        Some(Ok(job)) => Ok(job),
                        _ => Err(JobStoreError::BothGenerationsCorrupt(id.to_string())),
                    };
                }
            }
        }

        // Canonical absent: backup-as-canonical is the normal recovery path
        // after a crash between the two renames in `save`.
        if let Some(result) = Self::try_read(&backup, id) {
            warn!(job_id = %id, "canonical job record missing, recovering from backup");
            return result;
        }

        Err(JobStoreError::not_found(id.to_string()))
    }

    fn list_active(&self) -> JobStoreResult<Vec<Job>> {
        let mut active = Vec::new();
        for path in self.all_job_files()? {
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(_) => continue,
            };
            let job: Job = match serde_json::from_slice(&bytes) {
                Ok(j) => j,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping corrupt job record during list_active");
                    continue;
                }
            };
            if !job.stage.is_terminal() {
                active.push(job);
            }
        }
        Ok(active)
    }

    fn list_terminal(&self, before: DateTime<Utc>) -> JobStoreResult<Vec<Job>> {
        let mut terminal = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for path in self.all_job_files()? {
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(_) => continue,
            };
            let job: Job = match serde_json::from_slice(&bytes) {
                Ok(j) => j,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping corrupt job record during list_terminal");
                    continue;
                }
            };
            if job.stage.is_terminal() && job.updated_at < before && seen.insert(job.id.to_string()) {
                terminal.push(job);
            }
        }
        Ok(terminal)
    }
}
