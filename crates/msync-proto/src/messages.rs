//! Request/response bodies for the four sync operations plus the
//! supplemented shutdown pair.

use serde::{Deserialize, Serialize};

use msync_model::checksum::ChecksumIndex;

use crate::error::SyncError;

/// One path's delta within an `ApplyDeltas` batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathDelta {
    pub path: String,
    pub delta: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Apply a batch of deltas atomically: validate every delta against
    /// the target's current cache before committing any of them.
    ApplyDeltas { entries: Vec<PathDelta> },

    /// Ask the target for a checksum of every path it has tracked.
    GetChecksums,

    /// Ask the target for the full current text at `path`.
    GetTextFile { path: String },

    /// Push the full text of `path`, overwriting whatever the target has.
    PushFile { path: String, content: String },

    /// Ask the peer to close the connection and exit cleanly.
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    ApplyDeltasAck,
    Checksums(ChecksumIndex),
    TextFile { content: String },
    PushFileAck,
    ShutdownAck,
    Error(SyncError),
}

impl Response {
    pub fn into_result(self) -> Result<Response, SyncError> {
        match self {
            Response::Error(e) => Err(e),
            other => Ok(other),
        }
    }
}
