//! The job record: the one piece of state the Stage Scheduler (C10) owns
//! and the Durable Job Store (C2) persists.
//!
//! Stages are a closed set of tagged variants, not an inheritance
//! hierarchy (spec.md §9): transitions are computed by
//! `subgen-orchestrator::scheduler` as a pure function of `(Job, Event)`;
//! this module only carries the data.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::cue::Cue;
use crate::error_record::ErrorRecord;
use crate::ids::JobId;
use crate::media::MediaInfo;
use crate::segment::Segment;
use crate::target::Target;

/// Schema version of the durable job record. Reading an unknown version is
/// a fatal error for that job (spec.md §6).
pub const JOB_SCHEMA_VERSION: u32 = 1;

/// One state in the job state machine (spec.md §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    New,
    Validated,
    Segmented,
    Uploaded,
    Generated,
    Merged,
    /// The second validation pass (the Quality Gate), written `Validated²`
    /// in spec.md to distinguish it from the admission check.
    Validated2,
    Emitted,
    Completed,
    Failed,
    Abandoned,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed | Stage::Abandoned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::Validated => "validated",
            Stage::Segmented => "segmented",
            Stage::Uploaded => "uploaded",
            Stage::Generated => "generated",
            Stage::Merged => "merged",
            Stage::Validated2 => "validated2",
            Stage::Emitted => "emitted",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
            Stage::Abandoned => "abandoned",
        }
    }
}

/// The output file pair emitted for one target (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OutputPaths {
    pub srt_path: PathBuf,
    pub vtt_path: PathBuf,
}

/// The unit of work is a `(segment, target)` pair. Results are keyed by the
/// string form in [`crate::target::chunk_key`] because JSON object keys must
/// be strings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChunkResult {
    pub cues: Vec<Cue>,
}

/// The unit of work record persisted by the Durable Job Store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub id: JobId,
    pub source_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Non-empty set of requested (language, mode) targets.
    pub targets: Vec<Target>,

    pub stage: Stage,

    /// `(segment_index, language, mode)` → attempt count, keyed by
    /// [`crate::target::chunk_key`].
    #[serde(default)]
    pub attempt_counts: HashMap<String, u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,

    #[serde(default)]
    pub segments: Vec<Segment>,

    /// Segment indices whose blobs are present in the object store.
    #[serde(default)]
    pub uploaded: HashSet<usize>,

    /// `(segment_index, language, mode)` → generated cues, keyed by
    /// [`crate::target::chunk_key`].
    #[serde(default)]
    pub per_chunk_results: HashMap<String, ChunkResult>,

    /// `(language, mode)` → emitted file pair, keyed by [`Target::key`].
    #[serde(default)]
    pub outputs: HashMap<String, OutputPaths>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorRecord>,

    pub reserved_blob_namespace: String,

    /// Set when a target is paused after a quota fault; cleared on resume.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub quota_paused_until: HashMap<String, DateTime<Utc>>,

    /// Set when `delete_prefix` fails at a terminal transition; the Cleanup
    /// Reaper (C11) retries on the next sweep.
    #[serde(default)]
    pub cleanup_pending: bool,
}

fn default_schema_version() -> u32 {
    JOB_SCHEMA_VERSION
}

impl Job {
    pub fn new(source_path: impl Into<PathBuf>, targets: Vec<Target>, now: DateTime<Utc>) -> Self {
        let id = JobId::new();
        let namespace = format!("jobs/{id}");
        Self {
            schema_version: JOB_SCHEMA_VERSION,
            id,
            source_path: source_path.into(),
            created_at: now,
            updated_at: now,
            targets,
            stage: Stage::New,
            attempt_counts: HashMap::new(),
            media: None,
            segments: Vec::new(),
            uploaded: HashSet::new(),
            per_chunk_results: HashMap::new(),
            outputs: HashMap::new(),
            last_error: None,
            reserved_blob_namespace: namespace,
            quota_paused_until: HashMap::new(),
            cleanup_pending: false,
        }
    }

    pub fn attempt_count(&self, key: &str) -> u32 {
        self.attempt_counts.get(key).copied().unwrap_or(0)
    }

    pub fn is_at_least(&self, stage: Stage) -> bool {
        stage_rank(self.stage) >= stage_rank(stage)
    }
}

fn stage_rank(stage: Stage) -> u8 {
    match stage {
        Stage::New => 0,
        Stage::Validated => 1,
        Stage::Segmented => 2,
        Stage::Uploaded => 3,
        Stage::Generated => 4,
        Stage::Merged => 5,
        Stage::Validated2 => 6,
        Stage::Emitted => 7,
        Stage::Completed => 8,
        Stage::Failed | Stage::Abandoned => 255,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_starts_in_new_stage_with_namespace() {
        let job = Job::new("/tmp/in.mp4", vec![Target::new("eng")], Utc::now());
        assert_eq!(job.stage, Stage::New);
        assert!(job.reserved_blob_namespace.starts_with("jobs/"));
        assert_eq!(job.schema_version, JOB_SCHEMA_VERSION);
    }

    #[test]
    fn attempt_count_defaults_to_zero() {
        let job = Job::new("/tmp/in.mp4", vec![Target::new("eng")], Utc::now());
        assert_eq!(job.attempt_count("0:eng"), 0);
    }

    #[test]
    fn terminal_stages_are_flagged() {
        assert!(Stage::Completed.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(Stage::Abandoned.is_terminal());
        assert!(!Stage::Uploaded.is_terminal());
    }

    #[test]
    fn stage_rank_orders_happy_path_forward() {
        assert!(stage_rank(Stage::Segmented) > stage_rank(Stage::Validated));
        assert!(stage_rank(Stage::Emitted) > stage_rank(Stage::Merged));
    }

    #[test]
    fn is_at_least_compares_by_rank() {
        let mut job = Job::new("/tmp/in.mp4", vec![Target::new("eng")], Utc::now());
        job.stage = Stage::Uploaded;
        assert!(job.is_at_least(Stage::Segmented));
        assert!(!job.is_at_least(Stage::Generated));
    }
}
