//! Sheets v4 REST client
//!
//! A thin typed wrapper over the handful of Sheets API calls the
//! logger needs. The schema contract lives in [`ensure_header`]: the
//! header always starts with the three fixed columns, data columns are
//! appended in sorted order as new keys appear, and no column is ever
//! removed or reordered.
//!
//! [`ensure_header`]: SheetsClient::ensure_header

use crate::config::SheetsConfig;
use crate::sheets::auth;
use crate::SinkError;
use chrono::Local;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Fixed leading columns of every usage worksheet
pub const BASE_COLUMNS: [&str; 3] = ["timestamp", "page_url", "printer_ip"];

/// Grid size for newly created worksheets
const NEW_SHEET_ROWS: u32 = 200;
const NEW_SHEET_COLS: u32 = 50;

/// Timeout for Sheets API calls
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle to one worksheet within a spreadsheet
#[derive(Debug, Clone)]
pub struct Worksheet {
    pub spreadsheet_id: String,
    pub title: String,
}

/// Authenticated client for the Sheets v4 API
pub struct SheetsClient {
    http: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsClient {
    /// Connects to the Sheets API, exchanging credentials for a token
    ///
    /// # Arguments
    ///
    /// * `config` - The sheets sink configuration
    ///
    /// # Returns
    ///
    /// * `Ok(SheetsClient)` - Ready-to-use client
    /// * `Err(SinkError)` - Client construction or token exchange failed
    pub async fn connect(config: &SheetsConfig) -> Result<Self, SinkError> {
        let http = Client::builder().timeout(API_TIMEOUT).build()?;
        let token = auth::fetch_access_token(&http, Path::new(&config.credentials_path)).await?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Opens a worksheet by title, creating it if absent
    ///
    /// A created worksheet starts at 200 rows by 50 columns.
    ///
    /// # Arguments
    ///
    /// * `spreadsheet_id` - The spreadsheet to open
    /// * `title` - The worksheet title
    pub async fn open_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<Worksheet, SinkError> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties",
            self.base_url, spreadsheet_id
        );
        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let response = check_status(response).await?;

        let meta: SpreadsheetMeta = response
            .json()
            .await
            .map_err(|e| SinkError::Malformed(format!("spreadsheet metadata: {}", e)))?;

        let exists = meta.sheets.iter().any(|s| s.properties.title == title);
        if !exists {
            tracing::info!("Worksheet '{}' not found, creating it", title);
            self.add_worksheet(spreadsheet_id, title).await?;
        }

        Ok(Worksheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            title: title.to_string(),
        })
    }

    /// Creates a new worksheet tab via batchUpdate
    async fn add_worksheet(&self, spreadsheet_id: &str, title: &str) -> Result<(), SinkError> {
        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.base_url, spreadsheet_id
        );
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": NEW_SHEET_COLS,
                        }
                    }
                }
            }]
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Reconciles the header row with the given data keys
    ///
    /// If the header is empty, writes `timestamp, page_url, printer_ip`
    /// followed by all keys in sorted order. Otherwise appends the keys
    /// not yet present (sorted among themselves) after all existing
    /// columns. Existing columns keep their positions, so historical
    /// rows stay aligned.
    ///
    /// # Arguments
    ///
    /// * `worksheet` - The worksheet handle
    /// * `keys` - Data keys that must have a column
    ///
    /// # Returns
    ///
    /// The resulting header, in column order
    pub async fn ensure_header(
        &self,
        worksheet: &Worksheet,
        keys: &[String],
    ) -> Result<Vec<String>, SinkError> {
        let mut header = self.read_header(worksheet).await?;

        let mut sorted_keys: Vec<&String> = keys.iter().collect();
        sorted_keys.sort();

        if header.is_empty() {
            header = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
            header.extend(sorted_keys.into_iter().cloned());
            self.write_header(worksheet, &header).await?;
            return Ok(header);
        }

        let missing: Vec<String> = sorted_keys
            .into_iter()
            .filter(|k| !header.iter().any(|h| h == *k))
            .cloned()
            .collect();

        if !missing.is_empty() {
            tracing::info!("Extending header with {} new column(s)", missing.len());
            header.extend(missing);
            self.write_header(worksheet, &header).await?;
        }

        Ok(header)
    }

    /// Reads the first row of the worksheet
    async fn read_header(&self, worksheet: &Worksheet) -> Result<Vec<String>, SinkError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            worksheet.spreadsheet_id,
            header_range(&worksheet.title)
        );
        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let response = check_status(response).await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| SinkError::Malformed(format!("header row: {}", e)))?;

        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    /// Overwrites the first row of the worksheet
    async fn write_header(&self, worksheet: &Worksheet, header: &[String]) -> Result<(), SinkError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}?valueInputOption=RAW",
            self.base_url,
            worksheet.spreadsheet_id,
            anchor_range(&worksheet.title)
        );
        let body = json!({ "values": [header] });

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Appends one row aligned to the given header
    ///
    /// The `timestamp` column receives the current local time (upload
    /// time, not capture time; the queue keeps the capture timestamp).
    /// `page_url` and `printer_ip` come from the arguments; every other
    /// column is looked up in `data`, defaulting to an empty string.
    ///
    /// # Arguments
    ///
    /// * `worksheet` - The worksheet handle
    /// * `header` - The current header, as returned by `ensure_header`
    /// * `data` - The record's key/value data
    /// * `page_url` - Source URL of the capture
    /// * `printer_ip` - Host identifier of the capture
    pub async fn append_row(
        &self,
        worksheet: &Worksheet,
        header: &[String],
        data: &BTreeMap<String, String>,
        page_url: &str,
        printer_ip: &str,
    ) -> Result<(), SinkError> {
        let now = Local::now().to_rfc3339();

        let row: Vec<String> = header
            .iter()
            .map(|column| match column.as_str() {
                "timestamp" => now.clone(),
                "page_url" => page_url.to_string(),
                "printer_ip" => printer_ip.to_string(),
                _ => data.get(column).cloned().unwrap_or_default(),
            })
            .collect();

        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=RAW",
            self.base_url,
            worksheet.spreadsheet_id,
            anchor_range(&worksheet.title)
        );
        let body = json!({ "values": [row] });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// A1 range covering the header row
fn header_range(title: &str) -> String {
    format!("'{}'!1:1", title)
}

/// A1 anchor range used for header writes and appends
fn anchor_range(title: &str) -> String {
    format!("'{}'!A1", title)
}

/// Turns non-2xx API responses into [`SinkError::Api`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SinkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SinkError::Api {
        status: status.as_u16(),
        message,
    })
}
