//! Recognized configuration options (spec.md §6), loaded from the
//! environment the way `vclip-worker::config::WorkerConfig` is: one
//! `env::var(...).ok().and_then(|s| s.parse().ok()).unwrap_or(default)` per
//! field. Environment variables are prefixed `SUBGEN_`.

use std::path::PathBuf;

/// Every tunable named in spec.md §6, aggregated into one value and passed
/// explicitly into the scheduler constructor. There is no ambient global
/// config (spec.md §9: "no hidden global state").
#[derive(Debug, Clone)]
pub struct SubgenConfig {
    pub chunk_duration_s: f64,
    /// Language the source audio is assumed to be in. The Quality Gate
    /// (C9) only consults the linguistic scorer for targets whose language
    /// differs from this one (spec.md §4.8).
    pub source_language: String,
    pub max_attempts: u32,
    pub max_concurrent_jobs: usize,
    pub max_concurrent_uploads: usize,
    pub max_concurrent_generations: usize,
    pub max_concurrent_segment_extractions: usize,
    pub max_video_size_bytes: u64,
    pub max_duration_s: f64,
    pub admitted_codecs: Vec<String>,
    pub min_coverage: f64,
    pub max_density_cps: f64,
    pub max_cue_duration_s: f64,
    pub min_translation_quality: f64,
    pub min_cultural_accuracy: f64,
    pub retention_s: i64,
    pub disk_reserve_bytes: u64,
    pub temp_dir: PathBuf,
    pub output_dir: PathBuf,
    pub job_store_dir: PathBuf,
    pub prompt_template_registry_dir: PathBuf,
    pub model_identifier: String,
    pub max_segment_bytes: u64,
    pub max_model_retries: u32,
    pub quota_cooldown_s: u64,
    pub blob_put_timeout_s: u64,
    pub blob_retry_initial_delay_ms: u64,
    pub blob_retry_factor: f64,
    pub blob_retry_max_delay_ms: u64,
    pub blob_retry_max_retries: u32,
}

impl Default for SubgenConfig {
    fn default() -> Self {
        Self {
            chunk_duration_s: 60.0,
            source_language: "eng".to_string(),
            max_attempts: 3,
            max_concurrent_jobs: 3,
            max_concurrent_uploads: 3,
            max_concurrent_generations: 4,
            max_concurrent_segment_extractions: 1,
            max_video_size_bytes: 10 * 1024 * 1024 * 1024,
            max_duration_s: 12.0 * 3600.0,
            admitted_codecs: vec![
                "h264".to_string(),
                "hevc".to_string(),
                "vp9".to_string(),
                "av1".to_string(),
            ],
            min_coverage: 0.6,
            max_density_cps: 25.0,
            max_cue_duration_s: 10.0,
            min_translation_quality: 0.70,
            min_cultural_accuracy: 0.80,
            retention_s: 86_400,
            disk_reserve_bytes: 0, // sized dynamically at runtime, see subgen-media::segment
            temp_dir: PathBuf::from("/tmp/subgen/scratch"),
            output_dir: PathBuf::from("/tmp/subgen/output"),
            job_store_dir: PathBuf::from("/tmp/subgen/jobs"),
            prompt_template_registry_dir: PathBuf::from("/tmp/subgen/prompts"),
            model_identifier: "subgen-cue-model-v1".to_string(),
            max_segment_bytes: 150 * 1024 * 1024,
            max_model_retries: 3,
            quota_cooldown_s: 60,
            blob_put_timeout_s: 300,
            blob_retry_initial_delay_ms: 1000,
            blob_retry_factor: 2.0,
            blob_retry_max_delay_ms: 30_000,
            blob_retry_max_retries: 5,
        }
    }
}

impl SubgenConfig {
    /// Build a config from the environment, falling back to [`Default`] for
    /// any unset variable. Environment variables may override any
    /// recognized option by name (spec.md §6).
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let env_f64 = |key: &str, default: f64| -> f64 {
            std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
        };
        let env_u32 = |key: &str, default: u32| -> u32 {
            std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
        };
        let env_u64 = |key: &str, default: u64| -> u64 {
            std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
        };
        let env_usize = |key: &str, default: usize| -> usize {
            std::env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
        };
        let env_path = |key: &str, default: &PathBuf| -> PathBuf {
            std::env::var(key).map(PathBuf::from).unwrap_or_else(|_| default.clone())
        };
        let env_string = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };
        let env_codecs = |key: &str, default: &[String]| -> Vec<String> {
            std::env::var(key)
                .ok()
                .map(|s| s.split(',').map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect())
                .unwrap_or_else(|| default.to_vec())
        };

        Self {
            chunk_duration_s: env_f64("SUBGEN_CHUNK_DURATION_S", defaults.chunk_duration_s),
            source_language: env_string("SUBGEN_SOURCE_LANGUAGE", &defaults.source_language),
            max_attempts: env_u32("SUBGEN_MAX_ATTEMPTS", defaults.max_attempts),
            max_concurrent_jobs: env_usize("SUBGEN_MAX_CONCURRENT_JOBS", defaults.max_concurrent_jobs),
            max_concurrent_uploads: env_usize("SUBGEN_MAX_CONCURRENT_UPLOADS", defaults.max_concurrent_uploads),
            max_concurrent_generations: env_usize(
                "SUBGEN_MAX_CONCURRENT_GENERATIONS",
                defaults.max_concurrent_generations,
            ),
            max_concurrent_segment_extractions: env_usize(
                "SUBGEN_MAX_CONCURRENT_SEGMENT_EXTRACTIONS",
                defaults.max_concurrent_segment_extractions,
            ),
            max_video_size_bytes: env_u64("SUBGEN_MAX_VIDEO_SIZE_BYTES", defaults.max_video_size_bytes),
            max_duration_s: env_f64("SUBGEN_MAX_DURATION_S", defaults.max_duration_s),
            admitted_codecs: env_codecs("SUBGEN_ADMITTED_CODECS", &defaults.admitted_codecs),
            min_coverage: env_f64("SUBGEN_MIN_COVERAGE", defaults.min_coverage),
            max_density_cps: env_f64("SUBGEN_MAX_DENSITY_CPS", defaults.max_density_cps),
            max_cue_duration_s: env_f64("SUBGEN_MAX_CUE_DURATION_S", defaults.max_cue_duration_s),
            min_translation_quality: env_f64("SUBGEN_MIN_TRANSLATION_QUALITY", defaults.min_translation_quality),
            min_cultural_accuracy: env_f64("SUBGEN_MIN_CULTURAL_ACCURACY", defaults.min_cultural_accuracy),
            retention_s: std::env::var("SUBGEN_RETENTION_S").ok().and_then(|s| s.parse().ok()).unwrap_or(defaults.retention_s),
            disk_reserve_bytes: env_u64("SUBGEN_DISK_RESERVE_BYTES", defaults.disk_reserve_bytes),
            temp_dir: env_path("SUBGEN_TEMP_DIR", &defaults.temp_dir),
            output_dir: env_path("SUBGEN_OUTPUT_DIR", &defaults.output_dir),
            job_store_dir: env_path("SUBGEN_JOB_STORE_DIR", &defaults.job_store_dir),
            prompt_template_registry_dir: env_path(
                "SUBGEN_PROMPT_TEMPLATE_REGISTRY_DIR",
                &defaults.prompt_template_registry_dir,
            ),
            model_identifier: env_string("SUBGEN_MODEL_IDENTIFIER", &defaults.model_identifier),
            max_segment_bytes: env_u64("SUBGEN_MAX_SEGMENT_BYTES", defaults.max_segment_bytes),
            max_model_retries: env_u32("SUBGEN_MAX_MODEL_RETRIES", defaults.max_model_retries),
            quota_cooldown_s: env_u64("SUBGEN_QUOTA_COOLDOWN_S", defaults.quota_cooldown_s),
            blob_put_timeout_s: env_u64("SUBGEN_BLOB_PUT_TIMEOUT_S", defaults.blob_put_timeout_s),
            blob_retry_initial_delay_ms: env_u64(
                "SUBGEN_BLOB_RETRY_INITIAL_DELAY_MS",
                defaults.blob_retry_initial_delay_ms,
            ),
            blob_retry_factor: env_f64("SUBGEN_BLOB_RETRY_FACTOR", defaults.blob_retry_factor),
            blob_retry_max_delay_ms: env_u64("SUBGEN_BLOB_RETRY_MAX_DELAY_MS", defaults.blob_retry_max_delay_ms),
            blob_retry_max_retries: env_u32("SUBGEN_BLOB_RETRY_MAX_RETRIES", defaults.blob_retry_max_retries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = SubgenConfig::default();
        assert_eq!(cfg.chunk_duration_s, 60.0);
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.max_concurrent_jobs, 3);
        assert_eq!(cfg.max_concurrent_uploads, 3);
        assert_eq!(cfg.max_concurrent_generations, 4);
        assert_eq!(cfg.max_cue_duration_s, 10.0);
        assert_eq!(cfg.min_coverage, 0.6);
        assert_eq!(cfg.quota_cooldown_s, 60);
    }

    #[test]
    fn from_env_overrides_chunk_duration() {
        std::env::set_var("SUBGEN_CHUNK_DURATION_S", "45");
        let cfg = SubgenConfig::from_env();
        assert_eq!(cfg.chunk_duration_s, 45.0);
        std::env::remove_var("SUBGEN_CHUNK_DURATION_S");
    }
}
