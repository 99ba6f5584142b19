//! Stage Scheduler (C10): drives a [`Job`] through the nine-stage pipeline
//! (spec.md §4.10), bounding parallelism across jobs and chunks (spec.md
//! §5) and consulting [`crate::policy`] on every fault.
//!
//! Grounded on `vclip-worker::executor::JobExecutor`: the semaphore-bounded
//! concurrency and the periodic-sweep-plus-main-loop shape under
//! [`Scheduler::run`] are kept; the queue-consumer loop is replaced by a
//! job-store scan (there is no distributed queue in scope, spec.md §1
//! Non-goals), and `execute_job`'s single match on job kind is replaced by
//! the explicit stage-by-stage transitions spec.md §4.10 names. Only this
//! module writes to a `Job` record (spec.md §4.10: "Only the scheduler
//! writes to JobState").

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tracing::{info, warn};

use subgen_blob::BlobAdapter;
use subgen_jobstore::JobStore;
use subgen_media::{admit, segment_media};
use subgen_modelclient::ModelClient;
use subgen_models::{chunk_key, Clock, ErrorKind, ErrorRecord, Job, JobId, OutputPaths, Stage, Target};
use subgen_quality::{LinguisticScorer, QualityThresholds, StructuralMetrics, Verdict};
use subgen_subtitles::{emit_srt, emit_vtt, merge_segments, parse_cue_text};

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::logging::JobLogger;
use crate::policy::{self, Action};
use crate::reaper;

/// Every collaborator the scheduler drives, gathered into one value rather
/// than read from ambient globals (spec.md §9: "no hidden global state").
pub struct Scheduler {
    store: Arc<dyn JobStore>,
    blob: Arc<dyn BlobAdapter>,
    model: Arc<ModelClient>,
    scorer: Arc<dyn LinguisticScorer>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,

    jobs_semaphore: Arc<Semaphore>,
    /// Bounded process-wide, not per-job (spec.md §5: "MAX_CONCURRENT_GENERATIONS
    /// (default 4, process-wide)").
    generations_semaphore: Arc<Semaphore>,
    /// Guards against the scan loop driving the same job from two ticks at
    /// once; the single-writer discipline itself is enforced by holding a
    /// job's entry for the duration of one `advance_job` call.
    inflight: Mutex<HashMap<String, ()>>,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn JobStore>,
        blob: Arc<dyn BlobAdapter>,
        model: Arc<ModelClient>,
        scorer: Arc<dyn LinguisticScorer>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = tokio::sync::watch::channel(false);
        metrics::describe_counter!("subgen_jobs_completed_total", "Jobs that reached Completed");
        metrics::describe_counter!("subgen_jobs_failed_total", "Jobs that reached Failed");
        metrics::describe_counter!("subgen_jobs_abandoned_total", "Jobs that reached Abandoned");
        metrics::describe_counter!("subgen_generation_cooldowns_total", "Generation calls that hit a quota cooldown");
        metrics::describe_counter!("subgen_chunk_attempts_total", "Per-chunk attempts consumed by a fault");
        Self {
            jobs_semaphore: Arc::new(Semaphore::new(config.subgen.max_concurrent_jobs)),
            generations_semaphore: Arc::new(Semaphore::new(config.subgen.max_concurrent_generations)),
            store,
            blob,
            model,
            scorer,
            clock,
            config,
            inflight: Mutex::new(HashMap::new()),
            shutdown_tx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Submit a new job for `source_path` against `targets`, persisting it
    /// in `New` stage and returning its ID.
    pub fn submit(&self, source_path: impl Into<PathBuf>, targets: Vec<Target>) -> OrchestratorResult<JobId> {
        let job = Job::new(source_path, targets, self.clock.now());
        let id = job.id.clone();
        self.store.create(&job)?;
        Ok(id)
    }

    /// Run the scan-and-advance loop until shutdown is signalled: every
    /// `scan_interval`, list active jobs and dispatch one bounded task per
    /// job; every `reaper_sweep_interval`, sweep terminal jobs past
    /// retention (spec.md §4.9).
    pub async fn run(self: Arc<Self>) {
        info!("starting stage scheduler");
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let reaper_handle = {
            let scheduler = Arc::clone(&self);
            let mut reaper_shutdown = self.shutdown_tx.subscribe();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(scheduler.config.reaper_sweep_interval);
                loop {
                    tokio::select! {
                        _ = reaper_shutdown.changed() => {
                            if *reaper_shutdown.borrow() {
                                break;
                            }
                        }
                        _ = interval.tick() => {
                            reaper::sweep_terminal(
                                &scheduler.store,
                                &scheduler.blob,
                                scheduler.config.subgen.retention_s,
                                &scheduler.config.subgen.temp_dir,
                                scheduler.clock.as_ref(),
                            )
                            .await;
                        }
                    }
                }
            })
        };

        let mut scan_interval = tokio::time::interval(self.config.scan_interval);
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("shutdown signal received, draining in-flight jobs");
                        break;
                    }
                }
                _ = scan_interval.tick() => {
                    self.scan_once().await;
                }
            }
        }

        reaper_handle.abort();
        self.wait_for_drain().await;
        info!("stage scheduler stopped");
    }

    async fn wait_for_drain(&self) {
        let total = self.config.subgen.max_concurrent_jobs;
        let deadline = tokio::time::Instant::now() + self.config.shutdown_timeout;
        loop {
            if self.jobs_semaphore.available_permits() == total || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    async fn scan_once(&self) {
        let active = match self.store.list_active() {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(error = %e, "failed to list active jobs");
                return;
            }
        };

        for job in active {
            let id_str = job.id.to_string();
            {
                let mut inflight = self.inflight.lock().await;
                if inflight.contains_key(&id_str) {
                    continue;
                }
                inflight.insert(id_str.clone(), ());
            }

            let permit = match Arc::clone(&self.jobs_semaphore).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    self.inflight.lock().await.remove(&id_str);
                    continue;
                }
            };

            // Dispatch FIFO within a job (there is only ever one
            // in-flight advance per job) and round-robin across jobs
            // (the scan visits `list_active`'s order every tick, spec.md
            // §4.10's scheduling discipline).
            self.dispatch(job, permit, id_str).await;
        }
    }

    async fn dispatch(&self, job: Job, permit: tokio::sync::OwnedSemaphorePermit, id_str: String) {
        // advance_job borrows `self`'s collaborators but not `self` across
        // an await boundary that outlives this call, so we can just await
        // it inline; the jobs_semaphore permit caps how many run at once.
        let _permit = permit;
        if let Err(e) = self.advance_job(job).await {
            warn!(job_id = %id_str, error = %e, "advance_job returned an error");
        }
        self.inflight.lock().await.remove(&id_str);
    }

    /// Drive one job through as many stage transitions as it can make in
    /// one call, persisting after each (spec.md §4.10: "Persist frequency:
    /// after every stage transition and after every completed
    /// chunk-language-mode unit"). Returns once the job reaches a terminal
    /// stage, a pause (quota cooldown), or a fault that cannot be resolved
    /// without external state changing.
    pub async fn advance_job(&self, mut job: Job) -> OrchestratorResult<()> {
        let logger = JobLogger::new(&job.id, "pipeline");
        loop {
            if job.stage.is_terminal() {
                match job.stage {
                    Stage::Completed => metrics::counter!("subgen_jobs_completed_total").increment(1),
                    Stage::Failed => metrics::counter!("subgen_jobs_failed_total").increment(1),
                    Stage::Abandoned => metrics::counter!("subgen_jobs_abandoned_total").increment(1),
                    _ => {}
                }
                if job.stage == Stage::Completed || job.stage == Stage::Failed || job.stage == Stage::Abandoned {
                    reaper::cleanup_job(&self.blob, &job, &self.config.subgen.temp_dir, self.clock.as_ref()).await;
                }
                self.store.save(&job)?;
                return Ok(());
            }

            let outcome = match job.stage {
                Stage::New => self.run_validate(&mut job).await,
                Stage::Validated => self.run_segment(&mut job).await,
                Stage::Segmented => self.run_upload(&mut job).await,
                Stage::Uploaded => self.run_generate(&mut job).await,
                Stage::Generated => self.run_merge(&mut job),
                Stage::Merged => self.run_quality(&mut job).await,
                Stage::Validated2 => self.run_emit(&mut job).await,
                Stage::Emitted => self.run_complete(&mut job),
                Stage::Completed | Stage::Failed | Stage::Abandoned => unreachable!("terminal stages return above"),
            };

            job.updated_at = self.clock.now();
            self.store.save(&job)?;

            match outcome {
                StageOutcome::Advanced => continue,
                StageOutcome::Paused => {
                    logger.log_progress("paused for quota cooldown");
                    return Ok(());
                }
                StageOutcome::Blocked => {
                    // Attempts remain but nothing is actionable this tick
                    // (e.g. every pending generation is mid-cooldown).
                    return Ok(());
                }
            }
        }
    }

    async fn run_validate(&self, job: &mut Job) -> StageOutcome {
        match admit(&job.source_path, &self.config.subgen).await {
            Ok(media) => {
                job.media = Some(media);
                job.stage = Stage::Validated;
                StageOutcome::Advanced
            }
            Err(e) => {
                let err = OrchestratorError::Media(e);
                if policy::for_kind(err.kind()).action != Action::RetryInPlace {
                    self.fail(job, err, "media_probe");
                    return StageOutcome::Advanced;
                }
                // Transient: leave stage at New so the next scan tick
                // retries the probe.
                StageOutcome::Blocked
            }
        }
    }

    async fn run_segment(&self, job: &mut Job) -> StageOutcome {
        let media = job.media.clone().expect("Validated jobs always carry media metadata");
        let scratch_dir = self.config.subgen.temp_dir.join(job.id.as_str());
        match segment_media(&job.source_path, &media, &scratch_dir, &self.config.subgen, &job.segments).await {
            Ok(segments) => {
                job.segments = segments;
                job.stage = Stage::Segmented;
                StageOutcome::Advanced
            }
            Err(e) => {
                let err = OrchestratorError::Media(e);
                if policy::for_kind(err.kind()).action != Action::RetryInPlace {
                    self.fail(job, err, "segmenter");
                    return StageOutcome::Advanced;
                }
                // Transient: leave stage at Validated; segments populated
                // so far are kept and the segmenter resumes mid-list
                // (spec.md §4.3 resumability).
                StageOutcome::Blocked
            }
        }
    }

    async fn run_upload(&self, job: &mut Job) -> StageOutcome {
        let pending: Vec<_> = job
            .segments
            .iter()
            .filter(|s| !job.uploaded.contains(&s.index))
            .map(|s| (s.index, s.local_path.clone(), s.checksum.clone()))
            .collect();

        if pending.is_empty() {
            job.stage = Stage::Uploaded;
            return StageOutcome::Advanced;
        }

        let uploads_semaphore = Arc::new(Semaphore::new(self.config.subgen.max_concurrent_uploads));
        let mut handles = Vec::with_capacity(pending.len());
        for (index, path, checksum) in pending {
            let blob = Arc::clone(&self.blob);
            let namespace = job.reserved_blob_namespace.clone();
            let semaphore = Arc::clone(&uploads_semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                let key = format!("segments/{index}");
                let result = blob.put(&namespace, &key, &path, &checksum).await;
                (index, result)
            }));
        }

        let mut first_fatal: Option<subgen_blob::StorageError> = None;
        for handle in handles {
            let (index, result) = handle.await.expect("upload task panicked");
            match result {
                Ok(remote_ref) => {
                    job.uploaded.insert(index);
                    if let Some(segment) = job.segments.iter_mut().find(|s| s.index == index) {
                        segment.blob_key = Some(remote_ref.full_key());
                    }
                }
                Err(e) => {
                    warn!(job_id = %job.id, segment_index = index, error = %e, "segment upload failed");
                    if first_fatal.is_none() {
                        first_fatal = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_fatal {
            let kind = e.kind();
            if policy::for_kind(kind).action != Action::RetryInPlace {
                self.fail(job, OrchestratorError::Storage(e), "blob_upload");
                return StageOutcome::Advanced;
            }
            // Transient: leave stage at Segmented so the next scan tick
            // retries only the still-missing segments.
            return StageOutcome::Blocked;
        }

        if job.uploaded.len() == job.segments.len() {
            job.stage = Stage::Uploaded;
            StageOutcome::Advanced
        } else {
            StageOutcome::Blocked
        }
    }

    async fn run_generate(&self, job: &mut Job) -> StageOutcome {
        let now = self.clock.now();
        let mut pending = Vec::new();
        let mut any_paused = false;

        for target in job.targets.clone() {
            if let Some(until) = job.quota_paused_until.get(&target.key()) {
                if now < *until {
                    any_paused = true;
                    continue;
                }
            }
            for segment in &job.segments {
                let key = chunk_key(segment.index, &target);
                if job.per_chunk_results.contains_key(&key) {
                    continue;
                }
                let blob_key = match &segment.blob_key {
                    Some(k) => k.clone(),
                    None => continue, // not uploaded yet, shouldn't happen at this stage
                };
                pending.push((key, segment.checksum.clone(), format!("blob://{blob_key}"), target.clone()));
            }
        }

        if pending.is_empty() {
            job.quota_paused_until.clear();
            job.stage = Stage::Generated;
            return StageOutcome::Advanced;
        }

        let mut handles = Vec::with_capacity(pending.len());
        for (key, checksum, uri, target) in pending {
            let model = Arc::clone(&self.model);
            let semaphore = Arc::clone(&self.generations_semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                let result = model.generate(&checksum, &uri, &target).await;
                (key, target, result)
            }));
        }

        let mut fatal = false;
        for handle in handles {
            let (key, target, result) = handle.await.expect("generation task panicked");
            match result {
                Ok(raw_text) => match parse_cue_text(&raw_text) {
                    Ok(cues) => {
                        job.per_chunk_results.insert(key, subgen_models::ChunkResult { cues });
                    }
                    Err(e) => {
                        self.record_chunk_fault(job, &key, &target, OrchestratorError::Parse(e), "cue_parser");
                        fatal = fatal || job.stage.is_terminal();
                    }
                },
                Err(e) => {
                    let kind = e.kind();
                    match policy::for_kind(kind).action {
                        Action::PauseAndCooldown => {
                            let until = now + chrono::Duration::seconds(self.config.subgen.quota_cooldown_s as i64);
                            job.quota_paused_until.insert(target.key(), until);
                            any_paused = true;
                            metrics::counter!("subgen_generation_cooldowns_total").increment(1);
                        }
                        _ => {
                            self.record_chunk_fault(job, &key, &target, OrchestratorError::Model(e), "model_adapter");
                            fatal = fatal || job.stage.is_terminal();
                        }
                    }
                }
            }
        }

        if fatal {
            return StageOutcome::Advanced;
        }
        if any_paused {
            return StageOutcome::Paused;
        }
        StageOutcome::Blocked
    }

    /// Apply the C12 policy to a per-chunk fault: bump the attempt counter
    /// when the policy says so, and fail the job outright once the
    /// affected unit has exhausted its budget or the fault is
    /// unconditionally fatal (spec.md §4.11).
    fn record_chunk_fault(&self, job: &mut Job, key: &str, _target: &Target, err: OrchestratorError, component: &str) {
        let kind = err.kind();
        let policy = policy::for_kind(kind);
        if policy.consumes_attempt {
            let count = job.attempt_counts.entry(key.to_string()).or_insert(0);
            *count += 1;
            metrics::counter!("subgen_chunk_attempts_total").increment(1);
            if *count >= self.config.subgen.max_attempts {
                self.fail(job, err, component);
            }
            // else: leave unset in per_chunk_results, retried next pass.
        } else {
            match policy.action {
                Action::RetryInPlace => {} // transient: retried next pass without consuming budget
                _ => self.fail(job, err, component),
            }
        }
    }

    fn run_merge(&self, job: &mut Job) -> StageOutcome {
        job.stage = Stage::Merged;
        StageOutcome::Advanced
    }

    async fn run_quality(&self, job: &mut Job) -> StageOutcome {
        let media_duration = job.media.as_ref().map(|m| m.duration_s).unwrap_or(0.0);
        let thresholds = QualityThresholds::from(&self.config.subgen);
        let source_language = self.config.subgen.source_language.clone();

        let mut any_retry = false;
        let mut any_fail = false;
        let mut any_transient = false;

        for target in job.targets.clone() {
            let merged = self.merge_target_cues(job, &target);
            let metrics = StructuralMetrics::compute(&merged, media_duration);

            let linguistic = if target.language != source_language {
                match self.scorer.score(&merged, &source_language, &target.language).await {
                    Ok(scores) => Some(scores),
                    Err(e) => {
                        let err = OrchestratorError::Quality(e);
                        if policy::for_kind(err.kind()).action == Action::RetryInPlace {
                            // Transient scorer outage: leave this target's
                            // verdict undecided and retry the whole gate
                            // pass next tick rather than burning an attempt.
                            any_transient = true;
                            continue;
                        }
                        self.fail(job, err, "quality_scorer");
                        return StageOutcome::Advanced;
                    }
                }
            } else {
                None
            };

            let attempts = target_attempts(job, &target);
            let verdict = Verdict::decide(&metrics, linguistic.as_ref(), attempts, &thresholds);

            match verdict {
                Verdict::Accept => {}
                Verdict::Retry => {
                    any_retry = true;
                    for segment in &job.segments {
                        let key = chunk_key(segment.index, &target);
                        *job.attempt_counts.entry(key.clone()).or_insert(0) += 1;
                        job.per_chunk_results.remove(&key);
                    }
                }
                Verdict::Fail => {
                    any_fail = true;
                }
            }
        }

        if any_fail {
            let err = ErrorRecord::new(
                ErrorKind::QualityBelowThreshold,
                "quality_gate",
                "merged cue sequence failed the quality rubric with no attempts remaining",
                self.clock.now(),
            );
            job.last_error = Some(err);
            job.stage = Stage::Failed;
            return StageOutcome::Advanced;
        }
        if any_retry {
            job.stage = Stage::Uploaded;
            return StageOutcome::Advanced;
        }
        if any_transient {
            // Stage stays at Merged; the next scan tick re-runs the gate
            // against the same merged cues once the scorer recovers.
            return StageOutcome::Blocked;
        }
        job.stage = Stage::Validated2;
        StageOutcome::Advanced
    }

    fn merge_target_cues(&self, job: &Job, target: &Target) -> Vec<subgen_models::Cue> {
        let per_segment: Vec<Vec<subgen_models::Cue>> = job
            .segments
            .iter()
            .map(|s| {
                job.per_chunk_results
                    .get(&chunk_key(s.index, target))
                    .map(|r| r.cues.clone())
                    .unwrap_or_default()
            })
            .collect();
        merge_segments(&job.segments, &per_segment, self.config.subgen.max_cue_duration_s)
    }

    async fn run_emit(&self, job: &mut Job) -> StageOutcome {
        let job_basename = job
            .source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("job")
            .to_string();
        let out_dir = self.config.subgen.output_dir.join(&job_basename);

        if let Err(e) = std::fs::create_dir_all(&out_dir) {
            self.fail(job, OrchestratorError::Io(e), "emitter");
            return StageOutcome::Advanced;
        }

        for target in job.targets.clone() {
            let merged = self.merge_target_cues(job, &target);
            let suffix = target.filename_suffix();
            let srt_path = out_dir.join(format!("{job_basename}{suffix}.srt"));
            let vtt_path = out_dir.join(format!("{job_basename}{suffix}.vtt"));

            if let Err(e) = write_atomic(&srt_path, emit_srt(&merged).as_bytes()) {
                self.fail(job, OrchestratorError::Io(e), "emitter");
                return StageOutcome::Advanced;
            }
            if let Err(e) = write_atomic(&vtt_path, emit_vtt(&merged).as_bytes()) {
                self.fail(job, OrchestratorError::Io(e), "emitter");
                return StageOutcome::Advanced;
            }

            job.outputs.insert(target.key(), OutputPaths { srt_path, vtt_path });
        }

        let summary = render_summary(job);
        let info_path = out_dir.join(format!("{job_basename}_info.txt"));
        if let Err(e) = write_atomic(&info_path, summary.as_bytes()) {
            self.fail(job, OrchestratorError::Io(e), "emitter");
            return StageOutcome::Advanced;
        }

        job.stage = Stage::Emitted;
        StageOutcome::Advanced
    }

    fn run_complete(&self, job: &mut Job) -> StageOutcome {
        job.stage = Stage::Completed;
        StageOutcome::Advanced
    }

    fn fail(&self, job: &mut Job, err: OrchestratorError, component: &str) {
        let kind = err.kind();
        let action = policy::for_kind(kind).action;
        job.last_error = Some(
            ErrorRecord::new(kind, component, err.to_string(), self.clock.now())
                .with_context("stage", job.stage.as_str()),
        );
        job.stage = if action == Action::Abandon { Stage::Abandoned } else { Stage::Failed };
    }
}

/// What one stage-transition attempt accomplished, steering the
/// `advance_job` loop.
enum StageOutcome {
    /// The job moved to a new stage; keep looping.
    Advanced,
    /// A target is cooling down after a quota fault; stop for this call,
    /// the next scan tick will retry (spec.md §4.10: "re-queues the task
    /// after a cooling period").
    Paused,
    /// Nothing failed, but nothing could make progress this tick either
    /// (e.g. every pending upload is still in flight on a prior attempt).
    Blocked,
}

/// The representative attempt count for a quality-gate decision on
/// `target`: the maximum per-chunk attempt count across its segments,
/// since the rubric judges the target's merged output as a whole rather
/// than one chunk at a time.
fn target_attempts(job: &Job, target: &Target) -> u32 {
    job.segments
        .iter()
        .map(|s| job.attempt_count(&chunk_key(s.index, target)))
        .max()
        .unwrap_or(0)
}

fn write_atomic(path: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("out")
    ));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

fn render_summary(job: &Job) -> String {
    let mut out = format!("Job {}\nSource: {}\n", job.id, job.source_path.display());
    if let Some(media) = &job.media {
        out.push_str(&format!(
            "Duration: {:.3}s  {}x{} @ {:.2}fps  codec={}\n",
            media.duration_s, media.width, media.height, media.frame_rate, media.codec
        ));
    }
    out.push_str(&format!("Segments: {}\n", job.segments.len()));
    out.push_str("Targets:\n");
    for target in &job.targets {
        out.push_str(&format!("  - {}\n", target.key()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use subgen_models::Segment;

    fn segment(index: usize, start: f64, duration: f64) -> Segment {
        Segment {
            index,
            start,
            duration,
            local_path: PathBuf::from(format!("/tmp/seg-{index}.mp4")),
            blob_key: Some(format!("jobs/x/segments/{index}")),
            checksum: "hash".to_string(),
            size_bytes: 1,
        }
    }

    #[test]
    fn target_attempts_is_max_across_segments() {
        let mut job = Job::new("/tmp/in.mp4", vec![Target::new("eng")], chrono::Utc::now());
        job.segments = vec![segment(0, 0.0, 60.0), segment(1, 60.0, 60.0)];
        job.attempt_counts.insert(chunk_key(0, &Target::new("eng")), 1);
        job.attempt_counts.insert(chunk_key(1, &Target::new("eng")), 2);
        assert_eq!(target_attempts(&job, &Target::new("eng")), 2);
    }

    #[test]
    fn target_attempts_defaults_to_zero() {
        let mut job = Job::new("/tmp/in.mp4", vec![Target::new("eng")], chrono::Utc::now());
        job.segments = vec![segment(0, 0.0, 60.0)];
        assert_eq!(target_attempts(&job, &Target::new("eng")), 0);
    }

    #[test]
    fn write_atomic_creates_file_with_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.srt");
        write_atomic(&path, b"hello").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn render_summary_lists_all_targets() {
        let mut job = Job::new("/tmp/in.mp4", vec![Target::new("eng"), Target::with_mode("spa", "sdh")], chrono::Utc::now());
        job.segments = vec![segment(0, 0.0, 60.0)];
        let summary = render_summary(&job);
        assert!(summary.contains("eng"));
        assert!(summary.contains("spa_sdh"));
        assert!(summary.contains("Segments: 1"));
    }
}
