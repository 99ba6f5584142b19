//! Segment records produced by the segmenter (C4).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A contiguous time interval of the source, extracted as an independently
/// decodable clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// 0-based position in the source.
    pub index: usize,
    /// Start offset into the source, seconds, 3-decimal precision.
    pub start: f64,
    /// Effective duration of this segment, seconds.
    pub duration: f64,
    /// Local scratch-directory path of the extracted clip.
    pub local_path: PathBuf,
    /// Remote object key once uploaded by the Blob Adapter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_key: Option<String>,
    /// Content hash of the clip bytes, used for resumability and fingerprinting.
    pub checksum: String,
    /// Size of the clip file in bytes.
    pub size_bytes: u64,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_uploaded(&self) -> bool {
        self.blob_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(index: usize, start: f64, duration: f64) -> Segment {
        Segment {
            index,
            start,
            duration,
            local_path: PathBuf::from(format!("/tmp/seg-{index}.mp4")),
            blob_key: None,
            checksum: "deadbeef".to_string(),
            size_bytes: 1024,
        }
    }

    #[test]
    fn end_is_start_plus_duration() {
        let s = sample(0, 0.0, 60.0);
        assert_eq!(s.end(), 60.0);
    }

    #[test]
    fn not_uploaded_until_blob_key_set() {
        let mut s = sample(0, 0.0, 60.0);
        assert!(!s.is_uploaded());
        s.blob_key = Some("segments/0".to_string());
        assert!(s.is_uploaded());
    }
}
