//! Quality Gate (C9): rates a merged cue sequence against a fixed rubric
//! and decides accept / retry / fail (spec.md §4.8).

pub mod error;
pub mod metrics;
pub mod scorer;
pub mod verdict;

pub use error::{QualityError, QualityResult};
pub use metrics::StructuralMetrics;
pub use scorer::{IdentityScorer, LinguisticScorer, LinguisticScores};
pub use verdict::{QualityThresholds, Verdict};
