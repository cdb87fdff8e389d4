//! Application state for the HTTP server

use crate::config::Config;
use crate::extract::SevenZipExtractor;
use crate::fetch::ArchiveFetcher;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones). The extractor's binary path
/// and the fetcher's HTTP client are resolved once before the server starts
/// accepting connections and never mutated afterwards; workspaces and
/// subprocesses stay request-scoped.
#[derive(Clone)]
pub struct AppState {
    /// Shared HTTP client for upstream archive fetches
    pub fetcher: Arc<ArchiveFetcher>,

    /// Extractor bound to the resolved 7-Zip binary
    pub extractor: Arc<SevenZipExtractor>,

    /// Service configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(fetcher: ArchiveFetcher, extractor: SevenZipExtractor, config: Config) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            config: Arc::new(config),
        }
    }
}
