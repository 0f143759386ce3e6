//! Per-request scratch directories.
//!
//! ## Why a drop guard instead of acquire/release calls?
//!
//! The disposal contract is "exactly once, on every exit path" — normal
//! return, early return, conversion failure, panic. Tying removal to `Drop`
//! makes that contract a property of the type system instead of caller
//! discipline: a `Workspace` that goes out of scope takes its directory with
//! it, and a moved `Workspace` cannot be disposed twice. Removal failures are
//! logged and swallowed so they can never mask the primary result.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// A disposable, uniquely-named scratch directory owned by exactly one
/// request. Never shared across concurrent requests; never reused.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    created: Instant,
}

impl Workspace {
    /// Create a fresh, empty, uniquely-named directory.
    ///
    /// `root` overrides the parent directory; `None` uses the system temp
    /// dir. Fails only on filesystem-level trouble, surfaced as
    /// [`ConvertError::Environment`].
    pub fn acquire(root: Option<&Path>) -> Result<Self, ConvertError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("office2pdf-");
        let tmp = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| ConvertError::Environment { source })?;

        // Take over cleanup from tempfile: removal happens in our Drop so a
        // failure can be logged rather than silently ignored.
        let dir = tmp.keep();
        debug!("workspace acquired: {}", dir.display());
        Ok(Self {
            dir,
            created: Instant::now(),
        })
    }

    /// Path of the scratch directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// When this workspace was created.
    pub fn created(&self) -> Instant {
        self.created
    }

    /// Dispose of the workspace now.
    ///
    /// Equivalent to dropping it; exists so call sites can make the point of
    /// disposal explicit.
    pub fn dispose(self) {}
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(
                "workspace disposed after {:?}: {}",
                self.created.elapsed(),
                self.dir.display()
            ),
            Err(e) => warn!("failed to remove workspace {}: {e}", self.dir.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_empty_unique_dirs() {
        let a = Workspace::acquire(None).unwrap();
        let b = Workspace::acquire(None).unwrap();
        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read_dir(a.path()).unwrap().count(), 0);
    }

    #[test]
    fn acquire_respects_root_override() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::acquire(Some(root.path())).unwrap();
        assert_eq!(ws.path().parent(), Some(root.path()));
    }

    #[test]
    fn dispose_removes_directory_and_contents() {
        let ws = Workspace::acquire(None).unwrap();
        let dir = ws.path().to_path_buf();
        std::fs::write(dir.join("input.docx"), b"stub").unwrap();
        ws.dispose();
        assert!(!dir.exists());
    }

    #[test]
    fn drop_removes_directory_on_panic_path() {
        let ws = Workspace::acquire(None).unwrap();
        let dir = ws.path().to_path_buf();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _ws = ws;
            panic!("mid-pipeline failure");
        }));
        assert!(result.is_err());
        assert!(!dir.exists(), "unwind must dispose the workspace");
    }

    #[test]
    fn acquire_fails_on_nonexistent_root() {
        let err = Workspace::acquire(Some(Path::new("/definitely/not/a/real/root")));
        assert!(matches!(err, Err(ConvertError::Environment { .. })));
    }
}
