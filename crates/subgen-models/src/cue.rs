//! Cue sequence types shared by the parser/emitter (C7) and merger (C8).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One timed subtitle entry.
///
/// `index` is assigned at emit time, never at parse time (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Cue {
    pub index: usize,
    /// Start time in seconds, millisecond resolution, non-negative.
    pub start: f64,
    /// End time in seconds; invariant `end > start`.
    pub end: f64,
    /// One or more lines of UTF-8 text.
    pub text: String,
}

impl Cue {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_degenerate(&self) -> bool {
        self.end <= self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_end_minus_start() {
        let cue = Cue { index: 1, start: 1.0, end: 3.5, text: "hi".into() };
        assert_eq!(cue.duration(), 2.5);
    }

    #[test]
    fn degenerate_when_end_not_after_start() {
        let cue = Cue { index: 1, start: 2.0, end: 2.0, text: "hi".into() };
        assert!(cue.is_degenerate());
    }
}
