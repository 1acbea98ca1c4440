//! Atomic file writes for generated sources
//!
//! Content goes to a temporary file in the target directory which is then
//! renamed over the target. A failed write drops the temporary file and
//! removes any directory created for it, so the target either exists with
//! its full content or nothing is left behind.

use crate::core::GeneratorError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write `content` to `path`
///
/// Without `overwrite` an existing target fails with `ArtifactExists`,
/// including one created concurrently between the check and the rename.
pub fn write_atomic(path: &Path, content: &str, overwrite: bool) -> Result<(), GeneratorError> {
    let display = path.display().to_string();
    let io_err = |source: std::io::Error| GeneratorError::Io {
        path: display.clone(),
        source,
    };

    if !overwrite && path.exists() {
        return Err(GeneratorError::ArtifactExists {
            path: display.clone(),
        });
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let created = first_missing_ancestor(parent);
    let written = std::fs::create_dir_all(parent)
        .map_err(PersistFailure::Io)
        .and_then(|()| persist(parent, path, content, overwrite))
        .map_err(|e| match e {
            PersistFailure::Exists => GeneratorError::ArtifactExists {
                path: display.clone(),
            },
            PersistFailure::Io(source) => io_err(source),
        });

    if let (Err(_), Some(created)) = (&written, &created) {
        remove_created(created);
    }
    written?;

    tracing::debug!(path = %path.display(), "file written atomically");
    Ok(())
}

enum PersistFailure {
    Exists,
    Io(std::io::Error),
}

fn persist(
    parent: &Path,
    path: &Path,
    content: &str,
    overwrite: bool,
) -> Result<(), PersistFailure> {
    let mut temp = NamedTempFile::new_in(parent).map_err(PersistFailure::Io)?;
    temp.write_all(content.as_bytes()).map_err(PersistFailure::Io)?;
    temp.as_file().sync_all().map_err(PersistFailure::Io)?;

    let persisted = if overwrite {
        temp.persist(path)
    } else {
        temp.persist_noclobber(path)
    };

    persisted.map(|_| ()).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            PersistFailure::Exists
        } else {
            PersistFailure::Io(e.error)
        }
    })
}

/// Topmost ancestor of `dir` that does not exist yet
fn first_missing_ancestor(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .take_while(|ancestor| !ancestor.as_os_str().is_empty() && !ancestor.exists())
        .last()
        .map(Path::to_path_buf)
}

fn remove_created(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => tracing::debug!(dir = %dir.display(), "removed directories of failed write"),
        Err(e) => tracing::warn!(
            dir = %dir.display(),
            error = %e,
            "failed to remove directories of failed write"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/file.rs");

        write_atomic(&path, "content", false).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_failed_write_removes_created_directories() {
        let dir = tempfile::tempdir().unwrap();
        // Longer than any file name the platform accepts, so the rename fails
        let name = format!("{}.rs", "x".repeat(300));
        let path = dir.path().join("v1/posts").join(name);

        let err = write_atomic(&path, "content", false).unwrap_err();

        assert!(matches!(err, GeneratorError::Io { .. }));
        assert!(!dir.path().join("v1").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_keeps_existing_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("v1")).unwrap();
        let path = dir.path().join("v1/posts").join("x".repeat(300));

        assert!(write_atomic(&path, "content", true).is_err());

        assert!(dir.path().join("v1").is_dir());
        assert!(!dir.path().join("v1/posts").exists());
    }

    #[test]
    fn test_first_missing_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();

        assert_eq!(
            first_missing_ancestor(&dir.path().join("a/b/c")),
            Some(dir.path().join("a/b"))
        );
        assert_eq!(first_missing_ancestor(&dir.path().join("a")), None);
    }

    #[test]
    fn test_existing_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.rs");
        std::fs::write(&path, "original").unwrap();

        let err = write_atomic(&path, "replacement", false).unwrap_err();

        assert!(matches!(err, GeneratorError::ArtifactExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.rs");
        std::fs::write(&path, "original").unwrap();

        write_atomic(&path, "replacement", true).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "replacement");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
