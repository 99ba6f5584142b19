//! The fixed error taxonomy and its durable record form (C12).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed set of fault kinds, each with a fixed scheduling policy
/// (spec.md §4.11). Never add a variant without updating the policy table
/// in `subgen-orchestrator::policy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Source unreadable / unsupported format / exceeds limits.
    InvalidInput,
    /// Credential missing/expired or permission denied.
    AuthFault,
    /// Upload/download/RPC flapped.
    TransientIo,
    /// Upstream rate/quota exhausted.
    QuotaExceeded,
    /// Model response unparseable.
    ModelOutputInvalid,
    /// Quality Gate `retry` verdict.
    QualityBelowThreshold,
    /// Produced cues violate merger invariants after clipping.
    StructuralInvariant,
    /// Scratch write failed for lack of space.
    DiskExhausted,
    /// Operator request or process shutdown.
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::AuthFault => "auth_fault",
            Self::TransientIo => "transient_io",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ModelOutputInvalid => "model_output_invalid",
            Self::QualityBelowThreshold => "quality_below_threshold",
            Self::StructuralInvariant => "structural_invariant",
            Self::DiskExhausted => "disk_exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// `{kind, message, component, at, context}` with no embedded secrets
/// (spec.md §3). Only the most recent error is retained per job, for
/// bounded record size (spec.md §7).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    pub component: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, component: impl Into<String>, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            message: message.into(),
            component: component.into(),
            at,
            context: HashMap::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}
