//! The typed error a target sends back in a [`crate::Response::Error`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One path whose source and target checksums disagree, surfaced by
/// reconciliation's hard-mismatch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumMismatch {
    pub path: String,
    pub source_checksum: u64,
    pub target_checksum: u64,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SyncError {
    /// `ApplyDeltas`' validate phase found at least one delta whose
    /// precondition doesn't hold against the target's cached text.
    #[error("delta rejected for {path:?}: {reason}")]
    DeltaRejected { path: String, reason: String },

    /// Reconciliation found paths present on both peers whose checksums
    /// disagree. Unlike `DeltaRejected` this isn't resolved by the normal
    /// sync flow — the caller must decide.
    #[error("{} path(s) have mismatched checksums on both peers", .0.len())]
    HardMismatch(Vec<ChecksumMismatch>),

    #[error("path not found: {0:?}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e.to_string())
    }
}
