//! Path normalization for the sync protocol.
//!
//! Every path that crosses the wire is relative, forward-slashed, and
//! resolved against a peer's base directory — never absolute. These two
//! functions are the only place that boundary is crossed; callers at the
//! watch-loop boundary (see `msync-source`) must normalize through
//! [`to_relative`] before a path is ever inserted into a batch.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path {0:?} is not under base directory {1:?}")]
    NotUnderBase(PathBuf, PathBuf),
}

/// Resolve an absolute filesystem path to the protocol's relative form:
/// forward-slashed, no leading `./`, relative to `base`.
pub fn to_relative(base: &Path, absolute: &Path) -> Result<String, PathError> {
    let stripped = absolute
        .strip_prefix(base)
        .map_err(|_| PathError::NotUnderBase(absolute.to_path_buf(), base.to_path_buf()))?;

    let rel = stripped
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    Ok(rel)
}

/// Resolve a protocol-relative path back to an absolute filesystem path
/// under `base`. Paths that are already absolute are returned unchanged —
/// this should never happen for paths that arrived over the wire (see
/// invariant 2) but keeps the join total for local use.
pub fn to_absolute(base: &Path, relative: &str) -> PathBuf {
    let relative = Path::new(relative);
    if relative.is_absolute() {
        return relative.to_path_buf();
    }
    base.join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_base_and_uses_forward_slashes() {
        let base = Path::new("/home/user/project");
        let abs = Path::new("/home/user/project/src/main.rs");
        assert_eq!(to_relative(base, abs).unwrap(), "src/main.rs");
    }

    #[test]
    fn rejects_paths_outside_base() {
        let base = Path::new("/home/user/project");
        let abs = Path::new("/tmp/other/file.txt");
        assert!(to_relative(base, abs).is_err());
    }

    #[test]
    fn to_absolute_joins_relative_to_base() {
        let base = Path::new("/home/user/project");
        assert_eq!(
            to_absolute(base, "src/main.rs"),
            PathBuf::from("/home/user/project/src/main.rs")
        );
    }

    #[test]
    fn to_absolute_passes_through_already_absolute_paths() {
        let base = Path::new("/home/user/project");
        assert_eq!(
            to_absolute(base, "/elsewhere/file.txt"),
            PathBuf::from("/elsewhere/file.txt")
        );
    }

    #[test]
    fn round_trips_through_relative_and_back() {
        let base = Path::new("/home/user/project");
        let abs = Path::new("/home/user/project/a/b/c.txt");
        let rel = to_relative(base, abs).unwrap();
        assert_eq!(to_absolute(base, &rel), abs);
    }
}
