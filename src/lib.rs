//! Inkmeter: a resilient printer usage logger
//!
//! This crate periodically scrapes a printer's status page, extracts
//! key/value usage metrics from its HTML, buffers every capture in a
//! durable local queue, and replays buffered records to a Google Sheets
//! worksheet, surviving extended outages of either the printer or the
//! network path to Google.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod queue;
pub mod scheduler;
pub mod sheets;
pub mod upload;

use thiserror::Error;

/// Main error type for inkmeter operations
#[derive(Debug, Error)]
pub enum InkmeterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching a status page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Host {host} not reachable on port {port}")]
    Unreachable { host: String, port: u16 },

    #[error("Connection failed for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

/// Errors raised by the local durable queue
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised by the remote spreadsheet sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to load credentials: {0}")]
    Credentials(String),

    #[error("Token exchange failed: {0}")]
    Auth(String),

    #[error("Sheets API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected Sheets API response: {0}")]
    Malformed(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for inkmeter operations
pub type Result<T> = std::result::Result<T, InkmeterError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::normalize_key;
pub use queue::Record;
pub use scheduler::Scheduler;
pub use sheets::{SheetsClient, Worksheet};
