//! The Durable Job Store (C2): crash-consistent persistence of `Job`
//! records keyed by job ID.
//!
//! The persistence algorithm is temp-write + canonical-to-backup-rename +
//! temp-to-canonical-rename, so the file-rename primitive is the
//! transaction boundary; no database or write-ahead log is involved.
//!
//! ## Modules
//! - `store` - `JobStore` trait and the `FileJobStore` implementation
//! - `error` - store-specific error type

pub mod error;
pub mod store;

pub use error::{JobStoreError, JobStoreResult};
pub use store::{FileJobStore, JobStore};
