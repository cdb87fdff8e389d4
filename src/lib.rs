//! # unzipper
//!
//! HTTP service that fetches a remote archive and streams a single entry
//! out of it, delegating archive-format handling to an external 7-Zip
//! binary.
//!
//! Each request runs an independent pipeline: sanitize the entry path,
//! download the archive into a uniquely named temporary workspace, invoke
//! 7-Zip under a deadline, and stream the extracted bytes back with an
//! inferred content type. The workspace is removed exactly once on every
//! exit path: success, any error, deadline expiry, or a client that
//! disconnects mid-transfer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unzipper::api::{self, AppState};
//! use unzipper::config::Config;
//! use unzipper::extract::{locate_sevenzip, SevenZipExtractor};
//! use unzipper::fetch::ArchiveFetcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!
//!     // fatal when no 7-Zip binary exists: the server must not come up
//!     // without its extractor
//!     let binary = locate_sevenzip(&config.tools)?;
//!     let extractor = SevenZipExtractor::new(binary, config.extraction.timeout);
//!     let fetcher = ArchiveFetcher::new(config.fetch.max_redirects)?;
//!
//!     api::start_server(AppState::new(fetcher, extractor, config)).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP server module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// External 7-Zip invocation
pub mod extract;
/// Remote archive fetching
pub mod fetch;
/// Entry-path sanitization
pub mod sanitize;
/// Per-request temporary workspaces
pub mod workspace;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, ExtractError, FetchError, Result, ToHttpStatus};
pub use extract::{ExtractOutcome, SevenZipExtractor};
pub use fetch::ArchiveFetcher;
pub use workspace::Workspace;

/// Resolve when a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to `ctrl_c` if
///   signal registration fails (restricted environments, containers).
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub(crate) async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = sigint.recv() => tracing::info!("received SIGINT"),
            }
        }
        _ => {
            tracing::warn!("could not register signal handlers, falling back to ctrl_c");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}
