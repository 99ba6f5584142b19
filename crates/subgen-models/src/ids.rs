//! Identifiers and the clock abstraction (C1).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string (e.g. when reloading a job from disk).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stable hash identifying an idempotent model request: sha256 of
/// (segment checksum, language, mode, prompt template version, model id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn compute(
        segment_checksum: &str,
        language: &str,
        mode: Option<&str>,
        template_version: u32,
        model_identifier: &str,
    ) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(segment_checksum.as_bytes());
        hasher.update(b"|");
        hasher.update(language.as_bytes());
        hasher.update(b"|");
        hasher.update(mode.unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(template_version.to_le_bytes());
        hasher.update(b"|");
        hasher.update(model_identifier.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic-enough time source, injected rather than read ambiently
/// (spec design note: "no hidden global state").
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Default clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_round_trips_through_display() {
        let id = JobId::from_string("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn fingerprint_is_stable_for_same_inputs() {
        let a = Fingerprint::compute("chk1", "eng", None, 1, "model-x");
        let b = Fingerprint::compute("chk1", "eng", None, 1, "model-x");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_differs_by_language() {
        let a = Fingerprint::compute("chk1", "eng", None, 1, "model-x");
        let b = Fingerprint::compute("chk1", "spa", None, 1, "model-x");
        assert_ne!(a, b);
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let t1 = clock.now();
        let t2 = clock.now();
        assert!(t2 >= t1);
    }
}
