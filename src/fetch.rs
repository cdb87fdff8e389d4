//! Remote archive fetching
//!
//! Downloads the archive behind an untrusted URL into a request workspace.
//! The redirect budget and the final-status policy are enforced before any
//! body bytes are accepted, and the body is streamed chunk by chunk to disk,
//! never buffered whole in memory.

use crate::error::FetchError;
use futures::StreamExt;
use reqwest::redirect;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Statuses that mean the upstream is still redirecting after the budget
/// was spent.
const REDIRECT_STATUSES: [StatusCode; 5] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

/// Parse a caller-supplied archive URL.
///
/// Only absolute `http`/`https` URLs are accepted; everything else is an
/// [`FetchError::InvalidUrl`].
pub fn parse_archive_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw).map_err(|_| FetchError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl);
    }
    Ok(url)
}

/// Downloads remote archives over HTTP(S).
///
/// Holds one shared [`reqwest::Client`] whose redirect policy follows up to
/// the configured number of redirects transparently and then stops, handing
/// the redirect response back so the final-status check below stays
/// explicit.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: reqwest::Client,
}

impl ArchiveFetcher {
    /// Create a fetcher following at most `max_redirects` redirects.
    pub fn new(max_redirects: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() > max_redirects {
                    attempt.stop()
                } else {
                    attempt.follow()
                }
            }))
            .build()?;

        Ok(Self { client })
    }

    /// Download the archive at `url` into `dest_dir`.
    ///
    /// The local file is named after the URL's last non-empty path segment.
    /// Returns the file's path once the body has been fully written and
    /// flushed.
    ///
    /// Policy on the final response, after transparent redirect handling:
    /// a still-redirecting status means the budget ran out
    /// ([`FetchError::TooManyRedirects`]); anything other than 200 is an
    /// upstream failure carrying the status
    /// ([`FetchError::UpstreamStatus`]).
    pub async fn fetch(&self, url: &Url, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        info!(url = %url, "fetching archive");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if REDIRECT_STATUSES.contains(&status) {
            return Err(FetchError::TooManyRedirects);
        }
        if status != StatusCode::OK {
            return Err(FetchError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let dest = dest_dir.join(archive_filename(url));
        let mut file = File::create(&dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        debug!(path = %dest.display(), "archive written");
        Ok(dest)
    }
}

/// Local filename for a downloaded archive.
///
/// Taken from the URL's last non-empty path segment so query strings and
/// trailing slashes never leak into the name; bare-host URLs fall back to
/// `"archive"`.
#[must_use]
pub fn archive_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
        .unwrap_or("archive")
        .to_string()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parse_rejects_relative_and_garbage_urls() {
        assert!(matches!(
            parse_archive_url("notaurl"),
            Err(FetchError::InvalidUrl)
        ));
        assert!(matches!(
            parse_archive_url("/just/a/path"),
            Err(FetchError::InvalidUrl)
        ));
        assert!(matches!(
            parse_archive_url("ftp://example.com/a.zip"),
            Err(FetchError::InvalidUrl)
        ));
    }

    #[test]
    fn parse_accepts_http_and_https() {
        assert!(parse_archive_url("http://example.com/a.zip").is_ok());
        assert!(parse_archive_url("https://example.com/a.zip").is_ok());
    }

    #[test]
    fn filename_comes_from_the_last_path_segment() {
        let url = Url::parse("https://example.com/releases/v1/bundle.zip?token=abc").unwrap();
        assert_eq!(archive_filename(&url), "bundle.zip");

        let url = Url::parse("https://example.com/dir/").unwrap();
        assert_eq!(archive_filename(&url), "dir");

        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(archive_filename(&url), "archive");
    }

    #[tokio::test]
    async fn streams_a_200_body_to_disk() {
        let server = MockServer::start().await;
        let payload = vec![0xA5u8; 128 * 1024];
        Mock::given(method("GET"))
            .and(path("/files/data.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let dest = TempDir::new().unwrap();
        let fetcher = ArchiveFetcher::new(16).unwrap();
        let url = Url::parse(&format!("{}/files/data.zip", server.uri())).unwrap();

        let written = fetcher.fetch(&url, dest.path()).await.unwrap();

        assert_eq!(written.file_name().unwrap(), "data.zip");
        assert_eq!(std::fs::read(&written).unwrap(), payload);
    }

    #[tokio::test]
    async fn follows_redirects_within_the_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start.zip"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/real.zip", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/real.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zipbytes".to_vec()))
            .mount(&server)
            .await;

        let dest = TempDir::new().unwrap();
        let fetcher = ArchiveFetcher::new(16).unwrap();
        let url = Url::parse(&format!("{}/start.zip", server.uri())).unwrap();

        let written = fetcher.fetch(&url, dest.path()).await.unwrap();

        assert_eq!(written.file_name().unwrap(), "real.zip");
        assert_eq!(std::fs::read(&written).unwrap(), b"zipbytes");
    }

    #[tokio::test]
    async fn endless_redirects_exhaust_the_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop.zip"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/loop.zip", server.uri())),
            )
            .mount(&server)
            .await;

        let dest = TempDir::new().unwrap();
        let fetcher = ArchiveFetcher::new(16).unwrap();
        let url = Url::parse(&format!("{}/loop.zip", server.uri())).unwrap();

        let result = fetcher.fetch(&url, dest.path()).await;
        assert!(matches!(result, Err(FetchError::TooManyRedirects)));
    }

    #[tokio::test]
    async fn non_200_surfaces_the_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dest = TempDir::new().unwrap();
        let fetcher = ArchiveFetcher::new(16).unwrap();
        let url = Url::parse(&format!("{}/gone.zip", server.uri())).unwrap();

        match fetcher.fetch(&url, dest.path()).await {
            Err(FetchError::UpstreamStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nothing_is_written_on_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/err.zip"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dest = TempDir::new().unwrap();
        let fetcher = ArchiveFetcher::new(16).unwrap();
        let url = Url::parse(&format!("{}/err.zip", server.uri())).unwrap();

        let _ = fetcher.fetch(&url, dest.path()).await;
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }
}
