//! Error types for unzipper
//!
//! This module provides the error handling for the service:
//! - Domain-specific error types (fetch, extraction, request validation)
//! - HTTP status code mapping for the extraction endpoint
//! - Plain-text response bodies with machine-readable error codes for logs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unzipper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unzipper
///
/// Every failure a request can hit funnels into this type, which is
/// converted to exactly one plain-text HTTP response at the handler
/// boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "PORT")
        key: Option<String>,
    },

    /// A required query parameter was not supplied
    #[error("no {0} provided")]
    MissingParam(&'static str),

    /// Archive download failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The extraction tool could not be run at all
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The extraction tool did not finish before its deadline
    #[error("extraction took too long")]
    ExtractionTimedOut,

    /// The extraction tool ran but exited nonzero
    #[error("failed to extract archive")]
    ExtractionFailed {
        /// Exit code reported by the tool, if any
        code: Option<i32>,
    },

    /// The requested entry is not present in the archive
    #[error("{entry} doesn't exist in {archive}")]
    EntryNotFound {
        /// The sanitized entry path that was requested
        entry: String,
        /// The archive's local filename
        archive: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP server error
    #[error("server error: {0}")]
    Server(String),
}

/// Archive download errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// The supplied string is not an absolute http(s) URL
    #[error("invalid url")]
    InvalidUrl,

    /// The upstream kept redirecting past the redirect budget
    #[error("too many redirects")]
    TooManyRedirects,

    /// The upstream answered with something other than 200
    #[error("{url} returned status {status} instead of 200")]
    UpstreamStatus {
        /// The URL that was fetched
        url: String,
        /// The final status code the upstream returned
        status: u16,
    },

    /// The request itself failed (connect, TLS, body read)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Writing the archive to the workspace failed
    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Extraction tool errors
///
/// Covers failures to run the tool at all. A tool that runs but exits
/// nonzero or overruns its deadline is reported through
/// [`ExtractOutcome`](crate::extract::ExtractOutcome) instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No 7-Zip executable was found anywhere we looked
    #[error("no 7z executable found (install 7-Zip or set SEVENZIP_PATH)")]
    ToolMissing,

    /// Spawning the tool process failed
    #[error("failed to run {}: {source}", .binary.display())]
    Spawn {
        /// The executable that could not be started
        binary: PathBuf,
        /// The underlying OS error
        source: std::io::Error,
    },

    /// Waiting on or killing the tool process failed
    #[error("failed to wait for extractor: {0}")]
    Wait(#[from] std::io::Error),
}

/// Convert errors to HTTP status codes for the extraction endpoint
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - invalid caller input
            Error::MissingParam(_) => 400,
            Error::Fetch(FetchError::InvalidUrl) => 400,
            Error::Fetch(FetchError::TooManyRedirects) => 400,
            // 400 for the deadline too: the caller asked for something the
            // service refuses to keep working on
            Error::ExtractionTimedOut => 400,

            // 404 Not Found
            Error::EntryNotFound { .. } => 404,

            // 500 Internal Server Error - upstream or tool trouble
            Error::Fetch(FetchError::UpstreamStatus { .. }) => 500,
            Error::Fetch(FetchError::Network(_)) => 500,
            Error::Fetch(FetchError::Io(_)) => 500,
            Error::ExtractionFailed { .. } => 500,
            Error::Extract(_) => 500,
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::Server(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::MissingParam(_) => "missing_param",
            Error::Fetch(e) => match e {
                FetchError::InvalidUrl => "invalid_url",
                FetchError::TooManyRedirects => "too_many_redirects",
                FetchError::UpstreamStatus { .. } => "upstream_status",
                FetchError::Network(_) => "network_error",
                FetchError::Io(_) => "fetch_io_error",
            },
            Error::Extract(e) => match e {
                ExtractError::ToolMissing => "extractor_missing",
                ExtractError::Spawn { .. } => "extractor_spawn_failed",
                ExtractError::Wait(_) => "extractor_wait_failed",
            },
            Error::ExtractionTimedOut => "extraction_timeout",
            Error::ExtractionFailed { .. } => "extraction_failed",
            Error::EntryNotFound { .. } => "entry_not_found",
            Error::Io(_) => "io_error",
            Error::Server(_) => "server_error",
        }
    }
}

/// Convert errors to plain-text HTTP responses
///
/// The body is the error's `Display` output; status codes come from
/// [`ToHttpStatus`].
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, self.to_string()).into_response()
    }
}
