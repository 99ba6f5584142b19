//! The Blob Adapter (C5): upload/exists/delete against an opaque,
//! per-job-namespaced object store (spec.md §4.4).

pub mod adapter;
pub mod client;
pub mod error;

pub use adapter::{BlobAdapter, RemoteRef, S3BlobAdapter};
pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
