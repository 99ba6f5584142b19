//! The Blob Adapter (C5): `put` / `exists` / `delete_prefix` over an opaque,
//! per-job-namespaced object store, with timeout and capped-exponential
//! backoff retry (spec.md §4.4).

use std::path::Path;
use std::time::Duration;

use subgen_models::{retry_with_backoff, RetryPolicy, SubgenConfig};
use tracing::info;

use crate::client::S3Client;
use crate::error::{StorageError, StorageResult};

/// A remote object reference handed off to the Model Adapter (C6) once a
/// segment has been uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub namespace: String,
    pub key: String,
}

impl RemoteRef {
    pub fn full_key(&self) -> String {
        format!("{}/{}", self.namespace, self.key)
    }
}

/// Operations over the opaque object store (spec.md §4.4). Implementations
/// must partition by `namespace` (the per-job prefix) so that
/// `delete_prefix` is safe to call concurrently with other jobs' uploads
/// (spec.md §5).
#[async_trait::async_trait]
pub trait BlobAdapter: Send + Sync {
    async fn put(&self, namespace: &str, key: &str, local_path: &Path, content_hash: &str) -> StorageResult<RemoteRef>;
    async fn exists(&self, namespace: &str, key: &str) -> StorageResult<bool>;
    async fn delete_prefix(&self, namespace: &str) -> StorageResult<()>;
}

/// S3-compatible realization of [`BlobAdapter`].
pub struct S3BlobAdapter {
    client: S3Client,
    policy: RetryPolicy,
    put_timeout: Duration,
}

impl S3BlobAdapter {
    pub fn new(client: S3Client, config: &SubgenConfig) -> Self {
        Self {
            client,
            policy: RetryPolicy::new(
                Duration::from_millis(config.blob_retry_initial_delay_ms),
                config.blob_retry_factor,
                Duration::from_millis(config.blob_retry_max_delay_ms),
                config.blob_retry_max_retries,
            ),
            put_timeout: Duration::from_secs(config.blob_put_timeout_s),
        }
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{namespace}/{key}")
    }

    /// A side-channel marker object recording the content hash of the blob
    /// at `key`, so a subsequent `put` with the same hash can skip
    /// re-upload (spec.md §4.4: "idempotent: if a blob at the key exists
    /// with the same content hash, succeed without re-upload").
    fn hash_marker_key(namespace: &str, key: &str) -> String {
        format!("{namespace}/.hash/{key}")
    }
}

#[async_trait::async_trait]
impl BlobAdapter for S3BlobAdapter {
    async fn put(&self, namespace: &str, key: &str, local_path: &Path, content_hash: &str) -> StorageResult<RemoteRef> {
        let full_key = Self::full_key(namespace, key);
        let marker_key = Self::hash_marker_key(namespace, key);
        let result_ref = RemoteRef { namespace: namespace.to_string(), key: key.to_string() };

        if let Ok(marker_bytes) = self.client.download_bytes(&marker_key).await {
            if marker_bytes == content_hash.as_bytes() && self.client.exists(&full_key).await.unwrap_or(false) {
                info!(key = %full_key, "blob already present with matching content hash, skipping upload");
                return Ok(result_ref);
            }
        }

        let outcome = tokio::time::timeout(
            self.put_timeout,
            retry_with_backoff(
                &self.policy,
                "blob_put",
                || self.client.upload_file(local_path, &full_key, "application/octet-stream"),
                |e: &StorageError| e.is_retryable(),
            ),
        )
        .await;

        match outcome {
            Err(_) => Err(StorageError::Timeout(self.put_timeout)),
            Ok(subgen_models::Outcome::Success(())) => {
                let _ = self.client.upload_bytes(content_hash.as_bytes().to_vec(), &marker_key, "text/plain").await;
                Ok(result_ref)
            }
            Ok(subgen_models::Outcome::Exhausted { error, .. }) => Err(error),
        }
    }

    async fn exists(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        let full_key = Self::full_key(namespace, key);
        self.client.exists(&full_key).await
    }

    async fn delete_prefix(&self, namespace: &str) -> StorageResult<()> {
        let prefix = format!("{namespace}/");
        let outcome = retry_with_backoff(
            &self.policy,
            "blob_delete_prefix",
            || async {
                let keys = self.client.list_objects(&prefix).await?;
                self.client.delete_objects(&keys).await?;
                Ok::<_, StorageError>(())
            },
            |e: &StorageError| e.is_retryable(),
        )
        .await;

        match outcome {
            subgen_models::Outcome::Success(()) => Ok(()),
            subgen_models::Outcome::Exhausted { error, .. } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_key_joins_namespace_and_key() {
        let r = RemoteRef { namespace: "jobs/abc".into(), key: "segments/0".into() };
        assert_eq!(r.full_key(), "jobs/abc/segments/0");
    }
}
