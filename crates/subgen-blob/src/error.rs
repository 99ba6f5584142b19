//! Storage error types.
//!
//! [`StorageError::kind`] maps every variant onto the fixed C12 taxonomy
//! (`subgen_models::ErrorKind`) so the scheduler can apply its policy table
//! without knowing this crate's internals (spec.md §4.4: "distinguishes
//! retryable transient faults from fatal (authentication, permission)
//! faults").

use thiserror::Error;

use subgen_models::ErrorKind;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to configure storage client: {0}")]
    ConfigError(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("list failed: {0}")]
    ListFailed(String),

    #[error("credential missing or permission denied: {0}")]
    AuthFailed(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("object store error: {0}")]
    AwsSdk(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn delete_failed(msg: impl Into<String>) -> Self {
        Self::DeleteFailed(msg.into())
    }

    /// Classify this error per the C12 taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::AuthFailed(_) => ErrorKind::AuthFault,
            StorageError::ConfigError(_) => ErrorKind::AuthFault,
            StorageError::Timeout(_) => ErrorKind::TransientIo,
            StorageError::UploadFailed(_)
            | StorageError::DownloadFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::ListFailed(_)
            | StorageError::AwsSdk(_) => {
                let msg = self.to_string().to_lowercase();
                if msg.contains("accessdenied") || msg.contains("forbidden") || msg.contains("permission") {
                    ErrorKind::AuthFault
                } else {
                    ErrorKind::TransientIo
                }
            }
            StorageError::NotFound(_) => ErrorKind::TransientIo,
            StorageError::Io(e) => {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    ErrorKind::AuthFault
                } else if e.kind() == std::io::ErrorKind::OutOfMemory {
                    ErrorKind::DiskExhausted
                } else {
                    ErrorKind::TransientIo
                }
            }
            StorageError::Json(_) => ErrorKind::TransientIo,
        }
    }

    /// Whether a retry might succeed (spec.md §4.4's "retryable transient"
    /// vs "fatal" distinction).
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::TransientIo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_not_retryable() {
        let err = StorageError::AuthFailed("expired token".into());
        assert_eq!(err.kind(), ErrorKind::AuthFault);
        assert!(!err.is_retryable());
    }

    #[test]
    fn transient_upload_failures_are_retryable() {
        let err = StorageError::UploadFailed("connection reset".into());
        assert!(err.is_retryable());
    }

    #[test]
    fn access_denied_in_sdk_message_classifies_as_auth() {
        let err = StorageError::AwsSdk("AccessDenied: insufficient permissions".into());
        assert_eq!(err.kind(), ErrorKind::AuthFault);
    }
}
