//! Low-level S3-compatible object store client.
//!
//! This is the concrete realization of spec.md's "opaque object store":
//! an S3 API endpoint (Cloudflare R2, MinIO, or AWS S3 itself all speak
//! it). [`crate::adapter::S3BlobAdapter`] wraps this with the namespace
//! partitioning, idempotent-put, and retry/timeout discipline the Blob
//! Adapter (C5) contract requires; this module only talks to the wire.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Configuration for the object-store client.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    /// Region (usually "auto" for R2-compatible endpoints).
    pub region: String,
}

impl S3Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("SUBGEN_BLOB_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("SUBGEN_BLOB_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("SUBGEN_BLOB_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("SUBGEN_BLOB_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("SUBGEN_BLOB_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("SUBGEN_BLOB_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("SUBGEN_BLOB_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("SUBGEN_BLOB_BUCKET_NAME not set"))?,
            region: std::env::var("SUBGEN_BLOB_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Thin wrapper over the AWS S3 SDK client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let credentials = Credentials::new(&config.access_key_id, &config.secret_access_key, None, None, "subgen-blob");

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self { client: Client::from_conf(sdk_config), bucket: config.bucket_name })
    }

    pub async fn from_env() -> StorageResult<Self> {
        Self::new(S3Config::from_env()?).await
    }

    /// Upload a local file to `key`, setting `content_type`.
    pub async fn upload_file(&self, path: impl AsRef<Path>, key: &str, content_type: &str) -> StorageResult<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), key, "uploading object");

        let body = ByteStream::from_path(path).await.map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        info!(key, "uploaded object");
        Ok(())
    }

    /// Upload raw bytes to `key` (used for small marker objects; segment
    /// clips go through [`Self::upload_file`]).
    pub async fn upload_bytes(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;
        Ok(())
    }

    /// Download an object's full contents as bytes.
    pub async fn download_bytes(&self, key: &str) -> StorageResult<Vec<u8>> {
        let response = self.client.get_object().bucket(&self.bucket).key(key).send().await.map_err(|e| {
            if e.to_string().contains("NoSuchKey") {
                StorageError::not_found(key)
            } else {
                StorageError::DownloadFailed(e.to_string())
            }
        })?;
        let bytes = response.body.collect().await.map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        Ok(bytes.into_bytes().to_vec())
    }

    /// Check whether an object exists at `key`.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(e.to_string()))
                }
            }
        }
    }

    /// List all object keys under `prefix`.
    pub async fn list_objects(&self, prefix: &str) -> StorageResult<Vec<String>> {
        debug!(prefix, "listing objects");

        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket).prefix(prefix);
            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| StorageError::ListFailed(e.to_string()))?;

            if let Some(ref contents) = response.contents {
                keys.extend(contents.iter().filter_map(|o| o.key.clone()));
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(keys)
    }

    /// Delete multiple objects in one batch request (S3 caps a batch at 1000 keys).
    pub async fn delete_objects(&self, keys: &[String]) -> StorageResult<u32> {
        if keys.is_empty() {
            return Ok(0);
        }

        let objects: Vec<_> = keys
            .iter()
            .map(|k| aws_sdk_s3::types::ObjectIdentifier::builder().key(k).build().expect("valid key"))
            .collect();

        let delete = aws_sdk_s3::types::Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        self.client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        info!(count = keys.len(), "deleted objects");
        Ok(keys.len() as u32)
    }

    /// Check connectivity to the object store (head-bucket).
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::AwsSdk(format!("connectivity check failed: {e}")))?;
        Ok(())
    }
}
