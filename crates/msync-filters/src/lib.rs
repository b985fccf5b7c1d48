//! Ignore predicate.
//!
//! A path is tracked only if it survives, in order:
//!
//! 1. it must be statable (an un-statable path is always ignored — a
//!    file that vanished between the watcher event and the check is not
//!    worth a retry loop here);
//! 2. it must not match any deny-list glob (globs apply to directories
//!    too, so a glob can prune a whole subtree);
//! 3. if it's a directory, it is ignored — directories are never
//!    rescued by the extension whitelist, only pruned further by globs;
//! 4. its extension must be on the whitelist.

use std::collections::HashSet;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;

/// Extensions tracked when no project config overrides them, matching the
/// set the text-sync tool has always shipped with.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".cpp", ".hpp", ".c", ".h", ".go", ".hs", ".cl", ".js", ".md", ".txt", ".rs", ".toml",
];

/// Deny-list globs tracked when no project config overrides them.
pub const DEFAULT_GLOB_IGNORE: &[&str] = &[".*", "build/*", "target/*", "out/*"];

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("bad glob pattern {0:?}: {1}")]
    BadGlob(String, globset::Error),
}

#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    extensions: HashSet<String>,
    globs: GlobSet,
}

impl IgnorePolicy {
    pub fn new(extensions: &[String], glob_patterns: &[String]) -> Result<Self, FilterError> {
        let extensions = extensions.iter().cloned().collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in glob_patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| FilterError::BadGlob(pattern.clone(), e))?;
            builder.add(glob);
        }
        let globs = builder
            .build()
            .map_err(|e| FilterError::BadGlob("<build>".to_string(), e))?;

        Ok(Self { extensions, globs })
    }

    /// The whitelist/deny-list this tool ships with before any config file
    /// is read.
    pub fn defaults() -> Self {
        let extensions: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect();
        let globs: Vec<String> = DEFAULT_GLOB_IGNORE.iter().map(|s| s.to_string()).collect();
        Self::new(&extensions, &globs).expect("default glob patterns are always valid")
    }

    /// Whether a path should be excluded from tracking. `absolute` is
    /// checked against the live filesystem (for its directory-ness); an
    /// already-vanished path is always ignored. `relative` — the
    /// base-directory-relative, forward-slashed form — is what the deny-list
    /// globs match against, since a glob like `build/*` is rooted at the
    /// base directory, not the filesystem root.
    pub fn should_ignore(&self, absolute: &Path, relative: &str) -> bool {
        let metadata = match std::fs::symlink_metadata(absolute) {
            Ok(m) => m,
            Err(_) => return true,
        };

        if self.globs.is_match(relative) {
            return true;
        }

        if metadata.is_dir() {
            return true;
        }

        match Path::new(relative).extension() {
            Some(ext) => {
                let with_dot = format!(".{}", ext.to_string_lossy());
                !self.extensions.contains(&with_dot)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn unstatable_path_is_ignored() {
        let policy = IgnorePolicy::defaults();
        let path = Path::new("/nonexistent/path/does/not/exist.txt");
        assert!(policy.should_ignore(path, "does/not/exist.txt"));
    }

    #[test]
    fn whitelisted_extension_is_tracked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();
        let policy = IgnorePolicy::defaults();
        assert!(!policy.should_ignore(&path, "notes.txt"));
    }

    #[test]
    fn non_whitelisted_extension_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, "binary").unwrap();
        let policy = IgnorePolicy::defaults();
        assert!(policy.should_ignore(&path, "image.png"));
    }

    #[test]
    fn extensionless_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("README");
        fs::write(&path, "hello").unwrap();
        let policy = IgnorePolicy::defaults();
        assert!(policy.should_ignore(&path, "README"));
    }

    #[test]
    fn directory_is_always_ignored_even_with_whitelisted_looking_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.txt");
        fs::create_dir(&path).unwrap();
        let policy = IgnorePolicy::defaults();
        assert!(policy.should_ignore(&path, "fake.txt"));
    }

    #[test]
    fn hidden_file_is_ignored_by_glob_regardless_of_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".hidden.txt");
        fs::write(&path, "hello").unwrap();
        let policy = IgnorePolicy::defaults();
        assert!(policy.should_ignore(&path, ".hidden.txt"));
    }

    #[test]
    fn build_dir_contents_are_ignored_by_glob() {
        let dir = tempdir().unwrap();
        let build_dir = dir.path().join("build");
        fs::create_dir(&build_dir).unwrap();
        let path = build_dir.join("output.txt");
        fs::write(&path, "hello").unwrap();
        let policy = IgnorePolicy::new(&[".txt".to_string()], &["build/*".to_string()]).unwrap();
        assert!(policy.should_ignore(&path, "build/output.txt"));
    }

    #[test]
    fn bad_glob_pattern_is_rejected() {
        let err = IgnorePolicy::new(&[".txt".to_string()], &["[".to_string()]);
        assert!(err.is_err());
    }
}
