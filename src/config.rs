//! Configuration types for unzipper

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP listener configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to (default: "0.0.0.0:8080")
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Archive download configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Redirects followed transparently before giving up (default: 16)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: default_max_redirects(),
        }
    }
}

/// Extraction deadline configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Deadline for one extraction run; the tool is killed once it elapses
    /// (default: 10 seconds)
    #[serde(default = "default_extraction_timeout")]
    pub timeout: Duration,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout: default_extraction_timeout(),
        }
    }
}

/// External tool configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the 7z executable (auto-detected if None)
    #[serde(default)]
    pub sevenzip_path: Option<PathBuf>,

    /// Whether to search PATH for the 7z binary if no explicit path is set
    /// (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            sevenzip_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for the service
///
/// Fields are organized into logical sub-configs:
/// - [`server`](ServerConfig) — listen address
/// - [`fetch`](FetchConfig) — redirect budget for archive downloads
/// - [`extraction`](ExtractionConfig) — subprocess deadline
/// - [`tools`](ToolsConfig) — 7-Zip discovery
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Archive download settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Extraction deadline settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// Honors `PORT` (HTTP listen port, default 8080) and `SEVENZIP_PATH`
    /// (explicit extractor binary, checked ahead of discovery).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("PORT") {
            let port: u16 = raw.parse().map_err(|_| Error::Config {
                message: format!("PORT must be a port number, got '{raw}'"),
                key: Some("PORT".to_string()),
            })?;
            config.server.bind_address.set_port(port);
        }

        if let Ok(path) = std::env::var("SEVENZIP_PATH") {
            config.tools.sevenzip_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_max_redirects() -> usize {
    16
}

fn default_extraction_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_true() -> bool {
    true
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.bind_address.port(), 8080);
        assert_eq!(config.fetch.max_redirects, 16);
        assert_eq!(config.extraction.timeout, Duration::from_secs(10));
        assert!(config.tools.search_path);
        assert!(config.tools.sevenzip_path.is_none());
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.bind_address.port(), 8080);
        assert_eq!(config.extraction.timeout, Duration::from_secs(10));
    }
}
