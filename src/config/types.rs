use serde::Deserialize;

/// Main configuration structure for inkmeter
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub printer: PrinterConfig,
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Printer endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PrinterConfig {
    /// URL of the usage/status page to scrape
    #[serde(rename = "usage-url")]
    pub usage_url: String,

    /// Host identifier used for the reachability probe; may be empty
    #[serde(rename = "printer-ip", default)]
    pub printer_ip: String,

    /// Whether to verify the printer's TLS certificate.
    /// Device panels usually ship self-signed certs, so this defaults to off.
    #[serde(rename = "verify-ssl", default)]
    pub verify_ssl: bool,

    /// TCP port probed before each fetch attempt
    #[serde(rename = "reachability-port", default = "default_reachability_port")]
    pub reachability_port: u16,

    /// Informational timezone hint for the deployment site
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Google Sheets sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier (the opaque key from the sheet URL)
    #[serde(rename = "spreadsheet-id")]
    pub spreadsheet_id: String,

    /// Path to the Google authorized-user credentials JSON file
    #[serde(rename = "credentials-path")]
    pub credentials_path: String,

    /// Worksheet title within the spreadsheet
    #[serde(default = "default_worksheet")]
    pub worksheet: String,

    /// Base URL of the Sheets API; overridable for tests and proxies
    #[serde(rename = "api-base-url", default = "default_api_base_url")]
    pub api_base_url: String,
}

/// Local durable queue configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Path of the newline-delimited JSON queue file
    #[serde(default = "default_queue_path")]
    pub path: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: default_queue_path(),
        }
    }
}

/// Timing configuration for the poll/upload loop
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between capture cycles
    #[serde(rename = "poll-interval-secs", default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum fetch attempts per cycle before writing an offline marker
    #[serde(rename = "capture-attempts", default = "default_capture_attempts")]
    pub capture_attempts: u32,

    /// Seconds between capture attempts
    #[serde(
        rename = "capture-retry-delay-secs",
        default = "default_capture_retry_delay"
    )]
    pub capture_retry_delay_secs: u64,

    /// Total seconds to keep retrying uploads within one cycle
    #[serde(rename = "upload-window-secs", default = "default_upload_window")]
    pub upload_window_secs: u64,

    /// Seconds between upload attempts
    #[serde(
        rename = "upload-retry-step-secs",
        default = "default_upload_retry_step"
    )]
    pub upload_retry_step_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            capture_attempts: default_capture_attempts(),
            capture_retry_delay_secs: default_capture_retry_delay(),
            upload_window_secs: default_upload_window(),
            upload_retry_step_secs: default_upload_retry_step(),
        }
    }
}

fn default_reachability_port() -> u16 {
    443
}

fn default_timezone() -> String {
    "Europe/Berlin".to_string()
}

fn default_worksheet() -> String {
    "UsageLog".to_string()
}

fn default_api_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_queue_path() -> String {
    "usage_log.ndjson".to_string()
}

fn default_poll_interval() -> u64 {
    1800
}

fn default_capture_attempts() -> u32 {
    5
}

fn default_capture_retry_delay() -> u64 {
    60
}

fn default_upload_window() -> u64 {
    600
}

fn default_upload_retry_step() -> u64 {
    30
}
