//! Error Taxonomy & Policy (C12): the fixed table mapping each
//! [`ErrorKind`] to a scheduling action (spec.md §4.11).
//!
//! Grounded on `vclip-worker/src/error.rs`'s `WorkerError::is_retryable` /
//! `is_permanent_failure` / `is_quota_exceeded` classification methods,
//! replaced here with a `match` over a closed enum instead of substring
//! heuristics against error message text.

use subgen_models::ErrorKind;

/// What the scheduler should do about a fault of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Fail the job immediately; no operator action implied beyond
    /// inspecting `last_error`.
    Fail,
    /// Fail the job; the message should prompt operator intervention
    /// (credentials, permissions).
    FailNeedsOperator,
    /// Retry the unit of work in place; internal to the component, the
    /// scheduler need not rewind any stage.
    RetryInPlace,
    /// Pause the affected target and re-queue it after a cooldown, without
    /// consuming an attempt.
    PauseAndCooldown,
    /// Count an attempt and retry the unit of work (rewinding to the stage
    /// the scheduler rewinds to on retry).
    RetryWithAttempt,
    /// Cancel sibling tasks for the job and fail it.
    CancelSiblingsAndFail,
    /// Move the job to `Abandoned`.
    Abandon,
}

/// One row of the fixed table (spec.md §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub action: Action,
    /// Whether this fault counts against `attempt_counts[(chunk, lang, mode)]`.
    pub consumes_attempt: bool,
}

/// Look up the policy for `kind`. This is the **only** place in the crate
/// that is allowed to branch on `ErrorKind`; every other component treats
/// faults as opaque typed errors and defers the decision here.
pub fn for_kind(kind: ErrorKind) -> Policy {
    match kind {
        ErrorKind::InvalidInput => Policy { action: Action::Fail, consumes_attempt: false },
        ErrorKind::AuthFault => Policy { action: Action::FailNeedsOperator, consumes_attempt: false },
        ErrorKind::TransientIo => Policy { action: Action::RetryInPlace, consumes_attempt: false },
        ErrorKind::QuotaExceeded => Policy { action: Action::PauseAndCooldown, consumes_attempt: false },
        ErrorKind::ModelOutputInvalid => Policy { action: Action::RetryWithAttempt, consumes_attempt: true },
        ErrorKind::QualityBelowThreshold => Policy { action: Action::RetryWithAttempt, consumes_attempt: true },
        ErrorKind::StructuralInvariant => Policy { action: Action::Fail, consumes_attempt: false },
        ErrorKind::DiskExhausted => Policy { action: Action::CancelSiblingsAndFail, consumes_attempt: false },
        ErrorKind::Cancelled => Policy { action: Action::Abandon, consumes_attempt: false },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_fails_without_consuming_attempt() {
        let policy = for_kind(ErrorKind::InvalidInput);
        assert_eq!(policy.action, Action::Fail);
        assert!(!policy.consumes_attempt);
    }

    #[test]
    fn transient_io_retries_without_consuming_attempt() {
        let policy = for_kind(ErrorKind::TransientIo);
        assert_eq!(policy.action, Action::RetryInPlace);
        assert!(!policy.consumes_attempt);
    }

    #[test]
    fn quota_exceeded_pauses_without_consuming_attempt() {
        let policy = for_kind(ErrorKind::QuotaExceeded);
        assert_eq!(policy.action, Action::PauseAndCooldown);
        assert!(!policy.consumes_attempt);
    }

    #[test]
    fn model_output_invalid_consumes_an_attempt() {
        let policy = for_kind(ErrorKind::ModelOutputInvalid);
        assert_eq!(policy.action, Action::RetryWithAttempt);
        assert!(policy.consumes_attempt);
    }

    #[test]
    fn quality_below_threshold_consumes_an_attempt() {
        let policy = for_kind(ErrorKind::QualityBelowThreshold);
        assert_eq!(policy.action, Action::RetryWithAttempt);
        assert!(policy.consumes_attempt);
    }

    #[test]
    fn structural_invariant_fails_deterministically() {
        assert_eq!(for_kind(ErrorKind::StructuralInvariant).action, Action::Fail);
    }

    #[test]
    fn disk_exhausted_cancels_siblings() {
        assert_eq!(for_kind(ErrorKind::DiskExhausted).action, Action::CancelSiblingsAndFail);
    }

    #[test]
    fn cancelled_abandons_the_job() {
        assert_eq!(for_kind(ErrorKind::Cancelled).action, Action::Abandon);
    }
}
