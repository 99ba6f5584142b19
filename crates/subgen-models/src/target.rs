//! Subtitle targets: a (language, accessibility-mode) pair requested for a job.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A language plus an optional accessibility variant (the glossary's "mode":
/// an alternate track that additionally transcribes non-speech audio).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Target {
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Target {
    pub fn new(language: impl Into<String>) -> Self {
        Self { language: language.into(), mode: None }
    }

    pub fn with_mode(language: impl Into<String>, mode: impl Into<String>) -> Self {
        Self { language: language.into(), mode: Some(mode.into()) }
    }

    /// Stable string key used for map lookups in the job record, since
    /// JSON object keys must be strings: `"<language>"` or
    /// `"<language>_<mode>"`.
    pub fn key(&self) -> String {
        match &self.mode {
            Some(mode) => format!("{}_{}", self.language, mode),
            None => self.language.clone(),
        }
    }

    /// The filename suffix used in the output layout (spec.md §6):
    /// `_<lang>[_<mode>]`.
    pub fn filename_suffix(&self) -> String {
        match &self.mode {
            Some(mode) => format!("_{}_{}", self.language, mode),
            None => format!("_{}", self.language),
        }
    }
}

/// Key for a unit of work: a (segment, target) pair. Rendered as a string
/// because it is used as a JSON map key in `attempt_counts` /
/// `per_chunk_results`.
pub fn chunk_key(segment_index: usize, target: &Target) -> String {
    format!("{segment_index}:{}", target.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_includes_mode_when_present() {
        assert_eq!(Target::new("eng").key(), "eng");
        assert_eq!(Target::with_mode("eng", "sdh").key(), "eng_sdh");
    }

    #[test]
    fn filename_suffix_matches_output_layout() {
        assert_eq!(Target::new("spa").filename_suffix(), "_spa");
        assert_eq!(Target::with_mode("spa", "sdh").filename_suffix(), "_spa_sdh");
    }

    #[test]
    fn chunk_key_combines_segment_and_target() {
        assert_eq!(chunk_key(3, &Target::new("eng")), "3:eng");
        assert_eq!(chunk_key(3, &Target::with_mode("eng", "sdh")), "3:eng_sdh");
    }
}
