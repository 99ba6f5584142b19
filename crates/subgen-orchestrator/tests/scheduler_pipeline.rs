//! End-to-end exercise of the Stage Scheduler (C10) from `Uploaded` through
//! `Completed`, against real `subgen-jobstore`/`subgen-subtitles`/
//! `subgen-quality` collaborators and test doubles for the Blob Adapter and
//! the model HTTP endpoint. Starts at `Uploaded` rather than `New` since
//! admission and segmentation (C3/C4) shell out to `ffprobe`/`ffmpeg`, which
//! this environment does not guarantee.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use subgen_blob::{BlobAdapter, RemoteRef, StorageResult};
use subgen_jobstore::{FileJobStore, JobStore};
use subgen_modelclient::{ModelClient, ModelHttpClient, PromptTemplate, PromptTemplateRegistry};
use subgen_models::{Job, MediaInfo, Segment, Stage, SubgenConfig, SystemClock, Target};
use subgen_orchestrator::{OrchestratorConfig, Scheduler};
use subgen_quality::IdentityScorer;

struct NullBlob;

#[async_trait]
impl BlobAdapter for NullBlob {
    async fn put(&self, namespace: &str, key: &str, _local_path: &Path, _content_hash: &str) -> StorageResult<RemoteRef> {
        Ok(RemoteRef { namespace: namespace.to_string(), key: key.to_string() })
    }
    async fn exists(&self, _namespace: &str, _key: &str) -> StorageResult<bool> {
        Ok(true)
    }
    async fn delete_prefix(&self, _namespace: &str) -> StorageResult<()> {
        Ok(())
    }
}

fn model_response_body(srt: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": srt }] }
        }]
    })
}

#[tokio::test]
async fn job_seeded_at_uploaded_reaches_completed_and_writes_outputs() {
    let model_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_response_body(
            "1\n00:00:00,000 --> 00:00:55,000\nHello there, this is a test subtitle line.\n",
        )))
        .mount(&model_server)
        .await;

    let job_store_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let scratch_dir = tempfile::tempdir().unwrap();

    let config = OrchestratorConfig {
        subgen: SubgenConfig {
            output_dir: output_dir.path().to_path_buf(),
            job_store_dir: job_store_dir.path().to_path_buf(),
            temp_dir: scratch_dir.path().to_path_buf(),
            max_model_retries: 0,
            ..Default::default()
        },
        ..Default::default()
    };

    let store: Arc<dyn JobStore> = Arc::new(FileJobStore::new(&config.subgen.job_store_dir).unwrap());
    let blob: Arc<dyn BlobAdapter> = Arc::new(NullBlob);

    let http = ModelHttpClient::new(model_server.uri(), "test-key");
    let mut templates = PromptTemplateRegistry::new();
    templates.insert(&Target::new("eng"), PromptTemplate { version: 1, text: "transcribe to {{language}}".into() });
    let model = Arc::new(ModelClient::new(http, templates, &config.subgen));

    let scorer = Arc::new(IdentityScorer);
    let clock = Arc::new(SystemClock);
    let scheduler = Scheduler::new(store.clone(), blob, model, scorer, clock, config.clone());

    let source_path = scratch_dir.path().join("in.mp4");
    std::fs::write(&source_path, b"not a real video").unwrap();

    let mut job = Job::new(source_path.clone(), vec![Target::new("eng")], chrono::Utc::now());
    job.media = Some(MediaInfo {
        duration_s: 60.0,
        width: 1920,
        height: 1080,
        frame_rate: 30.0,
        has_audio: true,
        codec: "h264".to_string(),
        size_bytes: 4096,
    });
    job.segments = vec![Segment {
        index: 0,
        start: 0.0,
        duration: 60.0,
        local_path: source_path.clone(),
        blob_key: Some("segments/0".to_string()),
        checksum: "deadbeefcafe".to_string(),
        size_bytes: 1024,
    }];
    job.uploaded.insert(0);
    job.stage = Stage::Uploaded;
    store.create(&job).unwrap();

    scheduler.advance_job(job.clone()).await.unwrap();

    let reloaded = store.load(&job.id).unwrap();
    assert_eq!(reloaded.stage, Stage::Completed, "job should clear every stage with a single generation attempt");
    assert!(reloaded.last_error.is_none());

    let output = reloaded.outputs.get("eng").expect("eng target should have emitted outputs");
    assert!(output.srt_path.exists());
    assert!(output.vtt_path.exists());
    let srt_contents = std::fs::read_to_string(&output.srt_path).unwrap();
    assert!(srt_contents.contains("Hello there"));
}

#[tokio::test]
async fn job_paused_on_quota_exceeded_stays_at_uploaded() {
    let model_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&model_server)
        .await;

    let job_store_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let scratch_dir = tempfile::tempdir().unwrap();

    let config = OrchestratorConfig {
        subgen: SubgenConfig {
            output_dir: output_dir.path().to_path_buf(),
            job_store_dir: job_store_dir.path().to_path_buf(),
            temp_dir: scratch_dir.path().to_path_buf(),
            max_model_retries: 0,
            quota_cooldown_s: 3600,
            ..Default::default()
        },
        ..Default::default()
    };

    let store: Arc<dyn JobStore> = Arc::new(FileJobStore::new(&config.subgen.job_store_dir).unwrap());
    let blob: Arc<dyn BlobAdapter> = Arc::new(NullBlob);

    let http = ModelHttpClient::new(model_server.uri(), "test-key");
    let mut templates = PromptTemplateRegistry::new();
    templates.insert(&Target::new("eng"), PromptTemplate { version: 1, text: "transcribe to {{language}}".into() });
    let model = Arc::new(ModelClient::new(http, templates, &config.subgen));

    let scorer = Arc::new(IdentityScorer);
    let clock = Arc::new(SystemClock);
    let scheduler = Scheduler::new(store.clone(), blob, model, scorer, clock, config.clone());

    let source_path = scratch_dir.path().join("in.mp4");
    std::fs::write(&source_path, b"not a real video").unwrap();

    let mut job = Job::new(source_path.clone(), vec![Target::new("eng")], chrono::Utc::now());
    job.segments = vec![Segment {
        index: 0,
        start: 0.0,
        duration: 60.0,
        local_path: source_path.clone(),
        blob_key: Some("segments/0".to_string()),
        checksum: "deadbeefcafe".to_string(),
        size_bytes: 1024,
    }];
    job.uploaded.insert(0);
    job.stage = Stage::Uploaded;
    store.create(&job).unwrap();

    scheduler.advance_job(job.clone()).await.unwrap();

    let reloaded = store.load(&job.id).unwrap();
    assert_eq!(reloaded.stage, Stage::Uploaded, "a quota fault pauses the job rather than failing it");
    assert!(reloaded.quota_paused_until.contains_key("eng"));
}
