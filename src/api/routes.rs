//! Request handlers
//!
//! The extraction endpoint sequences the per-request pipeline as plain
//! sequential awaits: validate the query, download the archive into a fresh
//! workspace, run the extractor under its deadline, then stream the
//! extracted entry back. On the success path the workspace travels with the
//! response body, so teardown happens exactly once whether the stream
//! completes or the client goes away mid-transfer.

use crate::api::state::AppState;
use crate::error::{Error, Result, ToHttpStatus};
use crate::extract::ExtractOutcome;
use crate::fetch::parse_archive_url;
use crate::sanitize::sanitize_entry_path;
use crate::workspace::Workspace;
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

/// Query parameters for the extraction endpoint.
#[derive(Debug, Deserialize)]
pub struct ExtractQuery {
    /// Absolute URL of the remote archive
    #[serde(default)]
    pub url: Option<String>,

    /// Entry path inside the archive
    #[serde(default)]
    pub path: Option<String>,
}

/// ANY `/` - fetch a remote archive and stream one entry out of it
///
/// Every failure is converted to exactly one plain-text response here;
/// nothing propagates out of the handler.
pub async fn extract_entry(
    State(state): State<AppState>,
    Query(query): Query<ExtractQuery>,
) -> Response {
    match run_pipeline(state, query).await {
        Ok(response) => response,
        Err(error) => {
            warn!(error = %error, code = error.error_code(), "request failed");
            error.into_response()
        }
    }
}

/// GET `/health` - liveness probe
pub async fn health_check() -> &'static str {
    "ok"
}

/// The per-request pipeline, one state per await.
///
/// Validation happens before the workspace exists, so rejected requests
/// leave nothing to clean up. From the fetch onward the workspace is owned
/// here (or by the response stream), and dropping it removes the directory
/// on every exit path, including cancellation of this future when the
/// client disconnects early.
async fn run_pipeline(state: AppState, query: ExtractQuery) -> Result<Response> {
    // Validating
    let raw_url = query.url.ok_or(Error::MissingParam("url"))?;
    let raw_path = query.path.ok_or(Error::MissingParam("path"))?;
    let url = parse_archive_url(&raw_url)?;
    let entry = sanitize_entry_path(&raw_path);

    // Fetching
    let workspace = Workspace::create().await?;
    let archive = state.fetcher.fetch(&url, workspace.root()).await?;

    // Extracting
    match state
        .extractor
        .extract(&archive, workspace.output_dir(), &entry)
        .await?
    {
        ExtractOutcome::Completed => {}
        ExtractOutcome::TimedOut => return Err(Error::ExtractionTimedOut),
        ExtractOutcome::Failed { code } => return Err(Error::ExtractionFailed { code }),
    }

    // Streaming
    stream_entry(workspace, &archive, &entry).await
}

/// Locate the extracted entry and turn it into a streaming 200 response.
async fn stream_entry(workspace: Workspace, archive: &Path, entry: &str) -> Result<Response> {
    let archive_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("archive")
        .to_string();
    let entry_path = workspace.output_dir().join(entry);

    // only a regular file counts as a hit; the entry path resolving to the
    // output directory itself (empty entry) or to an extracted directory is
    // an absent entry
    let is_file = tokio::fs::metadata(&entry_path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(Error::EntryNotFound {
            entry: entry.to_string(),
            archive: archive_name,
        });
    }

    let file = File::open(&entry_path).await?;
    let mime = mime_guess::from_path(&entry_path).first_or_octet_stream();
    let filename = entry_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();

    info!(entry, archive = %archive_name, "streaming extracted entry");

    let body = Body::from_stream(EntryStream {
        inner: ReaderStream::new(file),
        _workspace: workspace,
    });
    let headers = [
        (header::CONTENT_TYPE, mime.to_string()),
        // name the file for the client without forcing a download dialog
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        ),
    ];

    Ok((StatusCode::OK, headers, body).into_response())
}

/// Response body that keeps the request workspace alive until the client
/// has consumed (or abandoned) the entry bytes.
///
/// Dropping the stream drops the workspace, so the directory is removed on
/// completed transfers and on client disconnects alike.
struct EntryStream {
    inner: ReaderStream<File>,
    _workspace: Workspace,
}

impl futures::Stream for EntryStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
