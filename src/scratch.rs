//! Invocation-scoped scratch space.
//!
//! Every pipeline run owns one directory under the configured scratch root,
//! namespaced by the run identifier, holding the downloaded document, the
//! rasterized page images, and the aggregate transcript. Namespacing by run
//! identifier means concurrent invocations on the same host never collide.
//!
//! The space is released on drop, so failure paths clean up too. The
//! orchestrator still calls [`ScratchSpace::release`] explicitly on the
//! success path so that a cleanup failure there surfaces as an error instead
//! of being swallowed.

use crate::error::EnrichError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One invocation's scratch directory and the well-known paths inside it.
pub struct ScratchSpace {
    base: PathBuf,
    released: bool,
}

impl ScratchSpace {
    /// Create the scratch directory for the given run under `root`.
    pub fn create(root: &Path, run_id: &str) -> Result<Self, EnrichError> {
        let base = root.join(format!("preextract-{run_id}"));
        std::fs::create_dir_all(&base).map_err(|e| EnrichError::scratch(&base, e))?;
        debug!("Scratch space at {}", base.display());
        Ok(Self {
            base,
            released: false,
        })
    }

    /// Local path the source document is downloaded to, derived from the
    /// storage key's base filename.
    pub fn document_path(&self, source_key: &str) -> PathBuf {
        let basename = source_key.rsplit('/').next().unwrap_or(source_key);
        self.base.join(basename)
    }

    /// Directory receiving one PNG per rasterized page.
    pub fn pages_dir(&self) -> PathBuf {
        self.base.join("pages")
    }

    /// Path of the aggregate transcript file.
    pub fn transcript_path(&self) -> PathBuf {
        self.base.join("transcript.txt")
    }

    /// Remove the scratch directory and everything in it.
    pub fn release(mut self) -> Result<(), EnrichError> {
        self.released = true;
        std::fs::remove_dir_all(&self.base).map_err(|e| EnrichError::scratch(&self.base, e))
    }

    #[cfg(test)]
    pub(crate) fn base(&self) -> &Path {
        &self.base
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.base) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove scratch dir {}: {}", self.base.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_namespaced_by_run_id() {
        let root = tempfile::tempdir().unwrap();
        let s = ScratchSpace::create(root.path(), "run-1").unwrap();
        assert!(s.base().ends_with("preextract-run-1"));
        assert!(s.pages_dir().starts_with(s.base()));
        assert!(s.transcript_path().starts_with(s.base()));
        assert_eq!(
            s.document_path("folder/file.pdf").file_name().unwrap(),
            "file.pdf"
        );
    }

    #[test]
    fn distinct_runs_never_share_paths() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchSpace::create(root.path(), "a").unwrap();
        let b = ScratchSpace::create(root.path(), "b").unwrap();
        assert_ne!(a.base(), b.base());
    }

    #[test]
    fn release_removes_directory_and_contents() {
        let root = tempfile::tempdir().unwrap();
        let s = ScratchSpace::create(root.path(), "r").unwrap();
        std::fs::create_dir_all(s.pages_dir()).unwrap();
        std::fs::write(s.pages_dir().join("page_1.png"), b"x").unwrap();
        let base = s.base().to_path_buf();
        s.release().unwrap();
        assert!(!base.exists());
    }

    #[test]
    fn drop_removes_directory_on_abandoned_run() {
        let root = tempfile::tempdir().unwrap();
        let base = {
            let s = ScratchSpace::create(root.path(), "r").unwrap();
            std::fs::write(s.transcript_path(), b"partial").unwrap();
            s.base().to_path_buf()
        };
        assert!(!base.exists());
    }
}
