//! Per-request temporary workspaces
//!
//! Each request gets a uniquely named directory holding the downloaded
//! archive and an `output/` subdirectory populated by extraction. The
//! workspace is owned by exactly one request and removed recursively
//! exactly once, on every exit path.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Directory name for extraction output inside a workspace.
const OUTPUT_DIR: &str = "output";

/// A request-scoped temporary directory.
///
/// Removal happens when the workspace is dropped, which covers normal
/// completion, every early-exit error, a cancelled request future, and a
/// response stream abandoned by a disconnecting client. Concurrent requests
/// never share a workspace; unique directory names partition the filesystem
/// between them.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    output: PathBuf,
}

impl Workspace {
    /// Create a fresh `unzipper-*` directory with an empty `output/`
    /// subdirectory under the system temp dir.
    pub async fn create() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("unzipper-").tempdir()?;
        let root = dir.path().to_path_buf();
        let output = root.join(OUTPUT_DIR);
        tokio::fs::create_dir(&output).await?;

        debug!(dir = %root.display(), "created workspace");
        Ok(Self {
            dir: Some(dir),
            root,
            output,
        })
    }

    /// The workspace directory; the downloaded archive lands here.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory the extraction tool writes entries into.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!(dir = %self.root.display(), "cleaned up workspace"),
                Err(e) => {
                    warn!(dir = %self.root.display(), error = %e, "failed to remove workspace");
                }
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_root_and_output_directories() {
        let workspace = Workspace::create().await.unwrap();
        assert!(workspace.root().is_dir());
        assert!(workspace.output_dir().is_dir());
        assert_eq!(workspace.output_dir(), workspace.root().join("output"));
    }

    #[tokio::test]
    async fn directory_name_carries_the_service_prefix() {
        let workspace = Workspace::create().await.unwrap();
        let name = workspace
            .root()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .to_string();
        assert!(name.starts_with("unzipper-"), "got {name}");
    }

    #[tokio::test]
    async fn two_workspaces_never_collide() {
        let a = Workspace::create().await.unwrap();
        let b = Workspace::create().await.unwrap();
        assert_ne!(a.root(), b.root());
    }

    #[tokio::test]
    async fn drop_removes_the_whole_tree() {
        let workspace = Workspace::create().await.unwrap();
        let root = workspace.root().to_path_buf();

        tokio::fs::write(root.join("archive.zip"), b"bytes")
            .await
            .unwrap();
        tokio::fs::write(workspace.output_dir().join("entry.txt"), b"entry")
            .await
            .unwrap();

        drop(workspace);
        assert!(!root.exists());
    }
}
