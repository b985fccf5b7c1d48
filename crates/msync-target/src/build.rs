//! Startup cache build, the target's counterpart to
//! `msync_source::build::build_initial_cache` — same shape, because the
//! tool this one descends from built an identical cache on both ends.

use std::path::Path;

use msync_filters::IgnorePolicy;
use msync_model::{path::to_relative, TextCache};
use walkdir::WalkDir;

pub fn build_initial_cache(base_dir: &Path, policy: &IgnorePolicy) -> std::io::Result<TextCache> {
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

        let content = std::fs::read_to_string(path)?;
        cache.insert(rel, content);
    }

    Ok(cache)
}
