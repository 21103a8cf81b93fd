//! Token acquisition for the Sheets API
//!
//! Credential provisioning and rotation happen outside this crate; we
//! only consume a Google authorized-user credentials JSON file and
//! exchange its refresh token for a short-lived bearer token via the
//! standard OAuth2 refresh grant.

use crate::SinkError;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

/// Shape of the authorized-user credentials file
#[derive(Debug, Deserialize)]
struct StoredCredentials {
    client_id: String,
    client_secret: String,
    refresh_token: String,

    /// Token endpoint; the Google default unless the file says otherwise
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges the stored refresh token for a bearer token
///
/// # Arguments
///
/// * `http` - The HTTP client to use
/// * `credentials_path` - Path to the credentials JSON file
///
/// # Returns
///
/// * `Ok(String)` - A bearer token for the Sheets API
/// * `Err(SinkError)` - The file was unreadable or the exchange failed
pub async fn fetch_access_token(
    http: &Client,
    credentials_path: &Path,
) -> Result<String, SinkError> {
    let raw = std::fs::read_to_string(credentials_path).map_err(|e| {
        SinkError::Credentials(format!("{}: {}", credentials_path.display(), e))
    })?;

    let creds: StoredCredentials = serde_json::from_str(&raw)
        .map_err(|e| SinkError::Credentials(format!("{}: {}", credentials_path.display(), e)))?;

    let response = http
        .post(&creds.token_uri)
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SinkError::Auth(format!("HTTP {}: {}", status, body)));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| SinkError::Auth(format!("unparseable token response: {}", e)))?;

    Ok(token.access_token)
}
