//! Pluggable linguistic scorer (spec.md §4.8: "linguistic metrics via the
//! external translation-quality scorer"). Mirrors `subgen-modelclient`'s
//! role as a typed wrapper around an opaque external service — the gate
//! itself never speaks to that service directly.

use subgen_models::Cue;

use crate::error::QualityResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinguisticScores {
    /// Numeric translation quality in `[0, 1]`.
    pub translation_quality: f64,
    /// Cultural-accuracy score in `[0, 1]`.
    pub cultural_accuracy: f64,
}

/// An external service that rates a target-language cue sequence against
/// the source language it was generated from. Only consulted when
/// `source_language != target_language` (spec.md §4.8).
#[async_trait::async_trait]
pub trait LinguisticScorer: Send + Sync {
    async fn score(&self, cues: &[Cue], source_language: &str, target_language: &str) -> QualityResult<LinguisticScores>;
}

/// A scorer for same-language jobs, where no translation took place: always
/// reports perfect scores without making a request. Used as the default
/// when `source_language == target_language`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScorer;

#[async_trait::async_trait]
impl LinguisticScorer for IdentityScorer {
    async fn score(&self, _cues: &[Cue], _source_language: &str, _target_language: &str) -> QualityResult<LinguisticScores> {
        Ok(LinguisticScores { translation_quality: 1.0, cultural_accuracy: 1.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identity_scorer_reports_perfect_scores() {
        let scorer = IdentityScorer;
        let scores = scorer.score(&[], "eng", "eng").await.unwrap();
        assert_eq!(scores.translation_quality, 1.0);
        assert_eq!(scores.cultural_accuracy, 1.0);
    }
}
