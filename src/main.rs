//! Service binary: resolve the extractor once, then serve until shutdown.

use std::process::ExitCode;
use tracing::error;
use unzipper::api::{self, AppState};
use unzipper::config::Config;
use unzipper::extract::{SevenZipExtractor, locate_sevenzip};
use unzipper::fetch::ArchiveFetcher;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // the only fatal condition: without an extractor there is nothing to serve
    let binary = match locate_sevenzip(&config.tools) {
        Ok(binary) => binary,
        Err(e) => {
            error!(error = %e, "refusing to start");
            return ExitCode::FAILURE;
        }
    };

    let extractor = SevenZipExtractor::new(binary, config.extraction.timeout);
    let fetcher = match ArchiveFetcher::new(config.fetch.max_redirects) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = api::start_server(AppState::new(fetcher, extractor, config)).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
