//! Error types for media probing and segmentation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media probing or segmentation.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Input admission rejected by the probe/validator (C3). `reason` is the
    /// precise cause surfaced in the job's error record.
    #[error("input rejected: {0}")]
    InvalidInput(String),

    #[error("disk exhausted while writing scratch file: {0}")]
    DiskExhausted(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an input-admission rejection with a precise reason.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify per the C12 taxonomy so the scheduler's fixed policy table
    /// can decide retry/pause/fail without inspecting this crate's types.
    pub fn kind(&self) -> subgen_models::ErrorKind {
        use subgen_models::ErrorKind;
        match self {
            MediaError::InvalidInput(_) | MediaError::FileNotFound(_) => ErrorKind::InvalidInput,
            MediaError::FfmpegNotFound | MediaError::FfprobeNotFound => ErrorKind::InvalidInput,
            MediaError::DiskExhausted(_) => ErrorKind::DiskExhausted,
            MediaError::Cancelled => ErrorKind::Cancelled,
            MediaError::FfmpegFailed { .. }
            | MediaError::FfprobeFailed { .. }
            | MediaError::Timeout(_)
            | MediaError::Io(_)
            | MediaError::JsonParse(_)
            | MediaError::Internal(_) => ErrorKind::TransientIo,
            MediaError::InvalidTimestamp(_) => ErrorKind::ModelOutputInvalid,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), subgen_models::ErrorKind::TransientIo)
    }
}
