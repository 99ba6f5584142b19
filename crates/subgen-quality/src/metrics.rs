//! Structural metrics over a merged cue sequence (spec.md §4.8).

use subgen_models::Cue;

/// Deterministic, input-only measurements of a merged cue sequence. These
/// never depend on an external service, unlike [`crate::scorer::LinguisticScorer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralMetrics {
    pub cue_count: usize,
    pub empty_cue_count: usize,
    /// Count of adjacent cue pairs that still overlap after the merger's
    /// non-overlap enforcement. Should always be zero for merger output;
    /// non-zero indicates a structural defect upstream.
    pub overlap_count: usize,
    pub mean_density_cps: f64,
    pub max_density_cps: f64,
    pub mean_cue_duration_s: f64,
    pub max_cue_duration_s: f64,
    /// Fraction of `media_duration_s` covered by cue spans, clamped to `[0, 1]`.
    pub coverage_fraction: f64,
}

impl StructuralMetrics {
    pub fn compute(cues: &[Cue], media_duration_s: f64) -> Self {
        let cue_count = cues.len();
        let empty_cue_count = cues.iter().filter(|c| c.text.trim().is_empty()).count();

        let overlap_count = cues.windows(2).filter(|w| w[1].start < w[0].end).count();

        let densities: Vec<f64> = cues
            .iter()
            .map(|c| {
                let duration = c.duration();
                if duration > 0.0 {
                    c.text.chars().count() as f64 / duration
                } else {
                    0.0
                }
            })
            .collect();
        let mean_density_cps = mean(&densities);
        let max_density_cps = densities.iter().cloned().fold(0.0_f64, f64::max);

        let durations: Vec<f64> = cues.iter().map(|c| c.duration()).collect();
        let mean_cue_duration_s = mean(&durations);
        let max_cue_duration_s = durations.iter().cloned().fold(0.0_f64, f64::max);

        let covered_s: f64 = durations.iter().sum();
        let coverage_fraction = if media_duration_s > 0.0 { (covered_s / media_duration_s).clamp(0.0, 1.0) } else { 0.0 };

        Self {
            cue_count,
            empty_cue_count,
            overlap_count,
            mean_density_cps,
            max_density_cps,
            mean_cue_duration_s,
            max_cue_duration_s,
            coverage_fraction,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: f64, end: f64, text: &str) -> Cue {
        Cue { index: 0, start, end, text: text.to_string() }
    }

    #[test]
    fn counts_empty_cues() {
        let cues = vec![cue(0.0, 1.0, "hi"), cue(1.0, 2.0, "")];
        let metrics = StructuralMetrics::compute(&cues, 2.0);
        assert_eq!(metrics.empty_cue_count, 1);
    }

    #[test]
    fn detects_overlap_after_merge() {
        let cues = vec![cue(0.0, 2.0, "a"), cue(1.0, 3.0, "b")];
        let metrics = StructuralMetrics::compute(&cues, 3.0);
        assert_eq!(metrics.overlap_count, 1);
    }

    #[test]
    fn zero_overlap_for_contiguous_cues() {
        let cues = vec![cue(0.0, 1.0, "a"), cue(1.0, 2.0, "b")];
        let metrics = StructuralMetrics::compute(&cues, 2.0);
        assert_eq!(metrics.overlap_count, 0);
    }

    #[test]
    fn coverage_fraction_is_clamped_to_one() {
        let cues = vec![cue(0.0, 10.0, "a")];
        let metrics = StructuralMetrics::compute(&cues, 5.0);
        assert_eq!(metrics.coverage_fraction, 1.0);
    }

    #[test]
    fn density_measures_characters_per_second() {
        let cues = vec![cue(0.0, 2.0, "abcd")];
        let metrics = StructuralMetrics::compute(&cues, 2.0);
        assert_eq!(metrics.mean_density_cps, 2.0);
    }

    #[test]
    fn empty_input_yields_zeroed_metrics() {
        let metrics = StructuralMetrics::compute(&[], 10.0);
        assert_eq!(metrics.cue_count, 0);
        assert_eq!(metrics.coverage_fraction, 0.0);
        assert_eq!(metrics.mean_density_cps, 0.0);
    }
}
