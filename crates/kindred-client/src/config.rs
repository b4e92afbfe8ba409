//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client starts with zero configuration
//! against a local backend.

use std::path::PathBuf;
use std::time::Duration;

use kindred_shared::constants::{DEFAULT_FEED_PAGE_SIZE, DEFAULT_STALE_SECS, MESSAGE_POLL_MILLIS};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend operation endpoint.
    /// Env: `KINDRED_BACKEND_URL`
    /// Default: `http://127.0.0.1:8080`
    pub backend_url: String,

    /// Per-request timeout.
    /// Env: `KINDRED_REQUEST_TIMEOUT_SECS`
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Discovery feed page size.
    /// Env: `KINDRED_FEED_PAGE_SIZE`
    /// Default: 50
    pub feed_page_size: u64,

    /// Staleness window applied to general reads.
    /// Env: `KINDRED_STALE_SECS`
    /// Default: 300 seconds
    pub stale_time: Duration,

    /// Polling period for an open conversation.
    /// Env: `KINDRED_POLL_MILLIS`
    /// Default: 3000 ms
    pub message_poll_interval: Duration,

    /// Where the delegated identity is persisted between runs.
    /// Env: `KINDRED_IDENTITY_FILE`
    /// Default: `<platform data dir>/identity.json`, or none when the
    /// platform has no data directory.
    pub identity_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            feed_page_size: DEFAULT_FEED_PAGE_SIZE,
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
            message_poll_interval: Duration::from_millis(MESSAGE_POLL_MILLIS),
            identity_file: default_identity_file(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("KINDRED_BACKEND_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                tracing::warn!("Empty KINDRED_BACKEND_URL, using default");
            } else {
                config.backend_url = url.to_string();
            }
        }

        if let Some(secs) = parse_var::<u64>("KINDRED_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(size) = parse_var::<u64>("KINDRED_FEED_PAGE_SIZE") {
            if size > 0 {
                config.feed_page_size = size;
            }
        }

        if let Some(secs) = parse_var::<u64>("KINDRED_STALE_SECS") {
            config.stale_time = Duration::from_secs(secs);
        }

        if let Some(ms) = parse_var::<u64>("KINDRED_POLL_MILLIS") {
            if ms > 0 {
                config.message_poll_interval = Duration::from_millis(ms);
            }
        }

        if let Ok(path) = std::env::var("KINDRED_IDENTITY_FILE") {
            if !path.is_empty() {
                config.identity_file = Some(PathBuf::from(path));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(var = name, value = %value, "Invalid value, using default");
            None
        }
    }
}

fn default_identity_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("app", "kindred", "kindred")
        .map(|dirs| dirs.data_dir().join("identity.json"))
}
