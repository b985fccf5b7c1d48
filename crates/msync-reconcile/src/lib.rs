//! Startup reconciliation: bring the target into content equality with the
//! source before the watch loop starts emitting deltas. Push whole files
//! the source has and the target doesn't, pull whole files the target has
//! and the source doesn't, and hard-fail (enumerating every path) when a
//! path present on both sides has diverging content.

use std::path::{Path, PathBuf};

use msync_model::checksum::ChecksumIndex;
use msync_model::path::to_absolute;
use msync_model::TextCache;
use msync_proto::error::ChecksumMismatch;
use msync_proto::{Client, Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Rpc(#[from] msync_proto::ClientError),

    #[error("{} path(s) diverge between source and target", .0.len())]
    HardMismatch(Vec<ChecksumMismatch>),

    #[error("io error writing {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("target returned an unexpected response to {0}")]
    UnexpectedResponse(&'static str),
}

/// Converge `cache` (the source's) and the target reachable through
/// `client` with whatever's on disk under `base_dir`. On success both
/// peers' caches and disks agree on every tracked path.
pub async fn reconcile<S>(
    base_dir: &Path,
    cache: &mut TextCache,
    client: &mut Client<S>,
) -> Result<(), ReconcileError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let target_index = match client.call(Request::GetChecksums).await? {
        Response::Checksums(index) => index,
        _ => return Err(ReconcileError::UnexpectedResponse("GetChecksums")),
    };
    let source_index = cache.checksum_index();

    let (only_on_source, only_on_target, mismatches) = diff_indices(&source_index, &target_index);

    if !mismatches.is_empty() {
        return Err(ReconcileError::HardMismatch(mismatches));
    }

    for path in only_on_source {
        let content = cache.get_or_empty(&path).to_string();
        tracing::debug!(path = %path, "reconciliation: pushing source-only file");
        client
            .call(Request::PushFile { path: path.clone(), content })
            .await?;
    }

    for path in only_on_target {
        tracing::debug!(path = %path, "reconciliation: pulling target-only file");
        let content = match client.call(Request::GetTextFile { path: path.clone() }).await? {
            Response::TextFile { content } => content,
            _ => return Err(ReconcileError::UnexpectedResponse("GetTextFile")),
        };
        write_to_disk(base_dir, &path, &content).await?;
        cache.insert(path, content);
    }

    Ok(())
}

/// Split the union of both peers' tracked paths into source-only,
/// target-only, and (for paths on both) any whose checksums disagree.
fn diff_indices(
    source: &ChecksumIndex,
    target: &ChecksumIndex,
) -> (Vec<String>, Vec<String>, Vec<ChecksumMismatch>) {
    let mut only_on_source = Vec::new();
    let mut only_on_target = Vec::new();
    let mut mismatches = Vec::new();

    for (path, source_checksum) in source {
        match target.get(path) {
            None => only_on_source.push(path.clone()),
            Some(target_checksum) if target_checksum != source_checksum => {
                mismatches.push(ChecksumMismatch {
                    path: path.clone(),
                    source_checksum: *source_checksum,
                    target_checksum: *target_checksum,
                });
            }
            Some(_) => {}
        }
    }

    for path in target.keys() {
        if !source.contains_key(path) {
            only_on_target.push(path.clone());
        }
    }

    (only_on_source, only_on_target, mismatches)
}

async fn write_to_disk(base_dir: &Path, path: &str, content: &str) -> Result<(), ReconcileError> {
    let absolute: PathBuf = to_absolute(base_dir, path);
    if let Some(parent) = absolute.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ReconcileError::Io { path: path.to_string(), source })?;
    }
    tokio::fs::write(&absolute, content.as_bytes())
        .await
        .map_err(|source| ReconcileError::Io { path: path.to_string(), source })
}
