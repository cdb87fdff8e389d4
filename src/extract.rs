//! External 7-Zip invocation
//!
//! Archive-format handling is delegated entirely to a pre-existing 7-Zip
//! binary. This module finds that binary at startup and runs it per request
//! under a deadline, killing and reaping it when the deadline fires so no
//! orphaned process outlives its request.

use crate::config::ToolsConfig;
use crate::error::ExtractError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// The tool exited 0 before the deadline.
    Completed,
    /// The tool exited nonzero before the deadline.
    Failed {
        /// Exit code, or None if the tool died to a signal.
        code: Option<i32>,
    },
    /// The deadline elapsed first; the tool was killed and reaped.
    TimedOut,
}

/// Runs the external 7-Zip binary to pull entries out of archives.
///
/// The binary path is resolved once at startup (see [`locate_sevenzip`])
/// and shared read-only across all requests.
#[derive(Debug, Clone)]
pub struct SevenZipExtractor {
    binary: PathBuf,
    timeout: Duration,
}

impl SevenZipExtractor {
    /// Create an extractor around `binary` with the given per-run deadline.
    pub fn new(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Path of the executable this extractor runs.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Extract `entry` from `archive` into `out_dir`.
    ///
    /// Invokes `7z x <archive> -o<out_dir> <entry> -y -r`: overwrite
    /// existing files, recurse into subdirectories. `entry` must already be
    /// sanitized; an empty entry omits the filter and extracts the whole
    /// archive root.
    ///
    /// The run is bounded by the configured deadline. When it elapses the
    /// child is forcibly killed and awaited, so by the time `TimedOut` is
    /// returned the process is gone and there is no late exit signal left
    /// to race against.
    pub async fn extract(
        &self,
        archive: &Path,
        out_dir: &Path,
        entry: &str,
    ) -> Result<ExtractOutcome, ExtractError> {
        let mut dest_flag = OsString::from("-o");
        dest_flag.push(out_dir);

        let mut command = Command::new(&self.binary);
        command.arg("x").arg(archive).arg(dest_flag);
        if !entry.is_empty() {
            command.arg(entry);
        }
        command
            .arg("-y")
            .arg("-r")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!(archive = %archive.display(), entry, "starting extraction");
        let mut child = command.spawn().map_err(|source| ExtractError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        match timeout(self.timeout, child.wait()).await {
            Ok(status) => {
                let status = status?;
                if status.success() {
                    debug!(archive = %archive.display(), "extraction finished");
                    Ok(ExtractOutcome::Completed)
                } else {
                    warn!(
                        archive = %archive.display(),
                        code = ?status.code(),
                        "extractor exited nonzero"
                    );
                    Ok(ExtractOutcome::Failed {
                        code: status.code(),
                    })
                }
            }
            Err(_) => {
                warn!(
                    archive = %archive.display(),
                    timeout = ?self.timeout,
                    "extraction deadline elapsed, killing extractor"
                );
                // kill() also reaps the child, so the process table stays clean
                child.kill().await?;
                Ok(ExtractOutcome::TimedOut)
            }
        }
    }
}

/// Find a runnable 7-Zip executable.
///
/// Candidates, in order: the explicitly configured path, `7z` on `PATH`
/// (unless PATH search is disabled), `7z` next to the running executable,
/// in the working directory, and in `<cwd>/7zip`. The first candidate that
/// exists wins; none existing is fatal at startup.
pub fn locate_sevenzip(tools: &ToolsConfig) -> Result<PathBuf, ExtractError> {
    for candidate in sevenzip_candidates(tools) {
        if candidate.is_file() {
            info!(binary = %candidate.display(), "found 7z");
            return Ok(candidate);
        }
    }
    Err(ExtractError::ToolMissing)
}

fn sevenzip_candidates(tools: &ToolsConfig) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = &tools.sevenzip_path {
        candidates.push(path.clone());
    }
    if tools.search_path {
        if let Ok(found) = which::which("7z") {
            candidates.push(found);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("7z"));
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("7z"));
        candidates.push(cwd.join("7zip").join("7z"));
    }

    candidates
}
