//! The Model Adapter (C6): one `generate` operation, fingerprinted,
//! single-flighted, and retried up to `MAX_MODEL_RETRIES` with quota faults
//! surfaced as a distinct non-retry outcome (spec.md §4.5).

use subgen_models::{retry_with_backoff, Fingerprint, Outcome, RetryPolicy, SubgenConfig, Target};
use std::time::Duration;

use crate::client::ModelHttpClient;
use crate::error::{ModelError, ModelResult};
use crate::single_flight::SingleFlight;
use crate::templates::PromptTemplateRegistry;

pub struct ModelClient {
    http: ModelHttpClient,
    templates: PromptTemplateRegistry,
    single_flight: SingleFlight<Fingerprint, String>,
    model_identifier: String,
    retry_policy: RetryPolicy,
}

impl ModelClient {
    pub fn new(http: ModelHttpClient, templates: PromptTemplateRegistry, config: &SubgenConfig) -> Self {
        Self {
            http,
            templates,
            single_flight: SingleFlight::new(),
            model_identifier: config.model_identifier.clone(),
            // Same backoff policy as the Blob Adapter (spec.md §4.5: "same
            // backoff policy as C5"), capped at MAX_MODEL_RETRIES instead
            // of the blob adapter's own retry count.
            retry_policy: RetryPolicy::new(
                Duration::from_millis(config.blob_retry_initial_delay_ms),
                config.blob_retry_factor,
                Duration::from_millis(config.blob_retry_max_delay_ms),
                config.max_model_retries,
            ),
        }
    }

    /// Generate the raw cue-list text for one (segment, target) pair.
    ///
    /// `segment_checksum` participates in the request fingerprint so a
    /// re-extracted segment (different bytes, same index) is never conflated
    /// with a stale one; `segment_uri` is the remote blob pointer produced
    /// by the Blob Adapter (C5).
    pub async fn generate(&self, segment_checksum: &str, segment_uri: &str, target: &Target) -> ModelResult<String> {
        let template = self.templates.get(target)?;
        let fingerprint = Fingerprint::compute(
            segment_checksum,
            &target.language,
            target.mode.as_deref(),
            template.version,
            &self.model_identifier,
        );
        let prompt = template.render(target);

        let result = self
            .single_flight
            .run(fingerprint.clone(), || async {
                self.generate_with_retry(segment_uri, &prompt).await.map_err(|e| e.to_string())
            })
            .await;

        // Never memoize a failed attempt: the next caller (a scheduler
        // retry) must be allowed to issue a fresh request.
        if result.is_err() {
            self.single_flight.forget(&fingerprint).await;
        }

        result.map_err(ModelError::RequestFailed)
    }

    async fn generate_with_retry(&self, segment_uri: &str, prompt: &str) -> ModelResult<String> {
        // Quota faults are a distinct outcome (spec.md §4.5: "the scheduler
        // can pause the job without counting a normal retry") — `is_retryable`
        // returns `false` for them, so `should_retry` stops immediately and
        // surfaces the fault rather than consuming a retry on it.
        let outcome = retry_with_backoff(
            &self.retry_policy,
            "model_generate",
            || self.http.generate(&self.model_identifier, segment_uri, prompt),
            |e: &ModelError| e.is_retryable(),
        )
        .await;

        match outcome {
            Outcome::Success(text) => Ok(text),
            Outcome::Exhausted { error, .. } => Err(error),
        }
    }
}
