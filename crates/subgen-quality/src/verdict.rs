//! Verdict decision (spec.md §4.8): accept / retry / fail.
//!
//! Grounded on `vclip-worker/src/retry.rs`'s `FailureTracker` attempt
//! counting idiom, generalized into a threshold-driven verdict instead of a
//! plain consecutive-failure counter.

use subgen_models::SubgenConfig;

use crate::metrics::StructuralMetrics;
use crate::scorer::LinguisticScores;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Worth another generation attempt: the failure was quality-related,
    /// not a structural defect, and attempts remain.
    Retry,
    Fail,
}

/// Thresholds the verdict is computed against, taken verbatim from
/// `SubgenConfig` (spec.md §6) so there is exactly one source of truth for
/// these tunables.
#[derive(Debug, Clone, Copy)]
pub struct QualityThresholds {
    pub min_coverage: f64,
    pub max_density_cps: f64,
    pub min_translation_quality: f64,
    pub min_cultural_accuracy: f64,
    pub max_attempts: u32,
}

impl From<&SubgenConfig> for QualityThresholds {
    fn from(config: &SubgenConfig) -> Self {
        Self {
            min_coverage: config.min_coverage,
            max_density_cps: config.max_density_cps,
            min_translation_quality: config.min_translation_quality,
            min_cultural_accuracy: config.min_cultural_accuracy,
            max_attempts: config.max_attempts,
        }
    }
}

impl Verdict {
    /// `linguistic` is `None` when `source_language == target_language`
    /// (no translation occurred, so no translation/cultural thresholds
    /// apply).
    pub fn decide(
        metrics: &StructuralMetrics,
        linguistic: Option<&LinguisticScores>,
        attempts: u32,
        thresholds: &QualityThresholds,
    ) -> Verdict {
        // Structural faults are deterministic given the same model output:
        // regenerating without changing anything else would reproduce them,
        // so they are never worth a retry (spec.md §4.8 rationale).
        let structural_invalid = metrics.overlap_count > 0 || metrics.empty_cue_count > 0;

        let coverage_ok = metrics.coverage_fraction >= thresholds.min_coverage;
        let density_ok = metrics.mean_density_cps <= thresholds.max_density_cps;
        let linguistic_ok = linguistic
            .map(|scores| {
                scores.translation_quality >= thresholds.min_translation_quality
                    && scores.cultural_accuracy >= thresholds.min_cultural_accuracy
            })
            .unwrap_or(true);

        if !structural_invalid && coverage_ok && density_ok && linguistic_ok {
            return Verdict::Accept;
        }

        if structural_invalid {
            return Verdict::Fail;
        }

        if attempts < thresholds.max_attempts {
            Verdict::Retry
        } else {
            Verdict::Fail
        }
    }
}
