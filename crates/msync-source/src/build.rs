//! Startup cache build: walk `base_dir`, read every tracked file into a
//! [`TextCache`]. An unreadable tracked file is a fatal error here (per
//! the sync engine's own startup-error classification, not the looser
//! "skip and keep going" behavior of the tool this one is descended
//! from).

use std::path::Path;

use msync_filters::IgnorePolicy;
use msync_model::{path::to_relative, TextCache};
use walkdir::WalkDir;

use crate::error::SourceError;

pub fn build_initial_cache(base_dir: &Path, policy: &IgnorePolicy) -> Result<TextCache, SourceError> {
    let mut cache = TextCache::new();

    for entry in WalkDir::new(base_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path == base_dir {
            continue;
        }
        let Ok(rel) = to_relative(base_dir, path) else {
            continue;
        };
        if policy.should_ignore(path, &rel) {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|e| SourceError::InitialCache {
            path: path.to_path_buf(),
            source: e,
        })?;

        cache.insert(rel, content);
    }

    Ok(cache)
}
