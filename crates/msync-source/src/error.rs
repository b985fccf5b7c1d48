use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to start filesystem watch on {path:?}: {source}")]
    Watch { path: std::path::PathBuf, #[source] source: notify::Error },

    #[error("failed to build initial cache from {path:?}: {source}")]
    InitialCache { path: std::path::PathBuf, #[source] source: std::io::Error },

    #[error("rpc error: {0}")]
    Rpc(#[from] msync_proto::ClientError),
}
