//! HTTP fetcher for the printer status page
//!
//! This module handles all HTTP traffic toward the printer, including:
//! - Building an HTTP client with the logger's user agent string
//! - Optionally disabling TLS certificate verification
//! - GET requests for the status page and embedded frames
//! - TCP reachability probes ahead of fetch attempts
//! - Error classification into typed failures

use crate::FetchError;
use reqwest::Client;
use std::time::Duration;
use tokio::net::TcpStream;

/// Per-request timeout for status page fetches
const FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// Timeout for the TCP reachability probe
pub const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(2);

/// Builds an HTTP client for talking to the printer
///
/// Printer web panels commonly serve self-signed certificates, so
/// certificate verification is disabled unless `verify_ssl` is set.
///
/// # Arguments
///
/// * `verify_ssl` - Whether to verify the printer's TLS certificate
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(verify_ssl: bool) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent("printer-usage-logger")
        .timeout(FETCH_TIMEOUT)
        .danger_accept_invalid_certs(!verify_ssl)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the response body as text
///
/// Non-2xx responses are reported as [`FetchError::Status`]; transport
/// failures are classified into timeout, connection, and generic HTTP
/// variants.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(String)` - The response body
/// * `Err(FetchError)` - The request failed
pub async fn fetch_html(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

/// Maps a reqwest error to the matching [`FetchError`] variant
fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            source: e,
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Checks whether a host accepts TCP connections on the given port
///
/// An empty host is treated as reachable, so deployments that never
/// configured a printer IP skip straight to the HTTP fetch.
///
/// # Arguments
///
/// * `host` - Host name or IP address; may be empty
/// * `port` - TCP port to probe
/// * `timeout` - How long to wait for the connection
///
/// # Returns
///
/// `true` if the connection succeeded within the timeout
pub async fn host_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    if host.is_empty() {
        return true;
    }

    let addr = format!("{}:{}", host, port);
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(&addr)).await,
        Ok(Ok(_))
    )
}
