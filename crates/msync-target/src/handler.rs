//! The four sync operations plus shutdown, served against one in-memory
//! cache. `ApplyDeltas` is two-phase: every delta in the batch is decoded
//! against the current cache before anything is written to disk, so a
//! single bad delta never leaves a half-applied batch behind.

use std::path::{Path, PathBuf};

use msync_delta::decode_apply;
use msync_model::TextCache;
use msync_proto::error::SyncError;
use msync_proto::messages::{PathDelta, Request, Response};

pub struct TargetHandler {
    base_dir: PathBuf,
    cache: TextCache,
}

impl TargetHandler {
    pub fn new(base_dir: PathBuf, cache: TextCache) -> Self {
        Self { base_dir, cache }
    }

    pub fn cache(&self) -> &TextCache {
        &self.cache
    }

    pub async fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::ApplyDeltas { entries } => self.apply_deltas(entries).await,
            Request::GetChecksums => Response::Checksums(self.cache.checksum_index()),
            Request::GetTextFile { path } => {
                Response::TextFile { content: self.cache.get_or_empty(&path).to_string() }
            }
            Request::PushFile { path, content } => self.push_file(path, content).await,
            Request::Shutdown => Response::ShutdownAck,
        }
    }

    async fn apply_deltas(&mut self, entries: Vec<PathDelta>) -> Response {
        let mut reconstructed = Vec::with_capacity(entries.len());

        for entry in &entries {
            let prev = self.cache.get_or_empty(&entry.path);
            match decode_apply(prev, &entry.delta) {
                Ok(next) => reconstructed.push((entry.path.clone(), next)),
                Err(e) => {
                    return Response::Error(SyncError::DeltaRejected {
                        path: entry.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        for (path, content) in &reconstructed {
            if let Err(e) = write_tracked_file(&self.base_dir, path, content).await {
                return Response::Error(SyncError::Io(e.to_string()));
            }
        }

        for (path, content) in reconstructed {
            self.cache.insert(path, content);
        }

        Response::ApplyDeltasAck
    }

    async fn push_file(&mut self, path: String, content: String) -> Response {
        if let Err(e) = write_tracked_file(&self.base_dir, &path, &content).await {
            return Response::Error(SyncError::Io(e.to_string()));
        }
        self.cache.insert(path, content);
        Response::PushFileAck
    }
}

/// Write `content` to `base_dir/path`, creating parent directories
/// (`0755`) as needed and leaving the file at `0644`.
async fn write_tracked_file(base_dir: &Path, path: &str, content: &str) -> std::io::Result<()> {
    let absolute = msync_model::path::to_absolute(base_dir, path);

    if let Some(parent) = absolute.parent() {
        create_dir_all_0755(parent).await?;
    }

    tokio::fs::write(&absolute, content.as_bytes()).await?;
    set_mode(&absolute, 0o644).await?;

    Ok(())
}

async fn create_dir_all_0755(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir).await?;
    set_mode(dir, 0o755).await
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let permissions = std::fs::Permissions::from_mode(mode);
    tokio::fs::set_permissions(path, permissions).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn apply_deltas_writes_and_caches_on_success() {
        let dir = tempdir().unwrap();
        let mut handler = TargetHandler::new(dir.path().to_path_buf(), TextCache::new());

        let delta = msync_delta::encode("", "hello");
        let response = handler
            .handle(Request::ApplyDeltas {
                entries: vec![PathDelta { path: "a.txt".to_string(), delta }],
            })
            .await;

        assert!(matches!(response, Response::ApplyDeltasAck));
        assert_eq!(handler.cache().get("a.txt"), Some("hello"));
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello");
    }

    #[tokio::test]
    async fn apply_deltas_rejects_the_whole_batch_on_one_bad_delta() {
        let dir = tempdir().unwrap();
        let mut cache = TextCache::new();
        cache.insert("a.txt", "original");
        let mut handler = TargetHandler::new(dir.path().to_path_buf(), cache);

        let good_delta = msync_delta::encode("original", "changed");
        let bad_delta = "=999".to_string(); // preconditions on an empty cached file

        let response = handler
            .handle(Request::ApplyDeltas {
                entries: vec![
                    PathDelta { path: "a.txt".to_string(), delta: good_delta },
                    PathDelta { path: "b.txt".to_string(), delta: bad_delta },
                ],
            })
            .await;

        assert!(matches!(response, Response::Error(SyncError::DeltaRejected { .. })));
        // the good entry must not have been written either
        assert_eq!(handler.cache().get("a.txt"), Some("original"));
        assert!(!dir.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn get_text_file_returns_empty_for_unknown_path() {
        let dir = tempdir().unwrap();
        let mut handler = TargetHandler::new(dir.path().to_path_buf(), TextCache::new());
        let response = handler.handle(Request::GetTextFile { path: "missing.txt".to_string() }).await;
        assert_eq!(response, Response::TextFile { content: String::new() });
    }

    #[tokio::test]
    async fn push_file_overwrites_cache_and_disk() {
        let dir = tempdir().unwrap();
        let mut handler = TargetHandler::new(dir.path().to_path_buf(), TextCache::new());

        let response = handler
            .handle(Request::PushFile { path: "nested/a.txt".to_string(), content: "pushed".to_string() })
            .await;

        assert!(matches!(response, Response::PushFileAck));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("nested/a.txt")).unwrap(),
            "pushed"
        );
    }

    #[tokio::test]
    async fn shutdown_acks_without_touching_disk_or_cache() {
        let dir = tempdir().unwrap();
        let mut handler = TargetHandler::new(dir.path().to_path_buf(), TextCache::new());
        let response = handler.handle(Request::Shutdown).await;
        assert!(matches!(response, Response::ShutdownAck));
    }
}
