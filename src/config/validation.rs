use crate::config::types::{Config, PrinterConfig, QueueConfig, ScheduleConfig, SheetsConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_printer_config(&config.printer)?;
    validate_sheets_config(&config.sheets)?;
    validate_queue_config(&config.queue)?;
    validate_schedule_config(&config.schedule)?;
    Ok(())
}

/// Validates printer configuration
fn validate_printer_config(config: &PrinterConfig) -> Result<(), ConfigError> {
    if config.usage_url.is_empty() {
        return Err(ConfigError::Validation(
            "usage-url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.usage_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid usage-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "usage-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates sheets sink configuration
fn validate_sheets_config(config: &SheetsConfig) -> Result<(), ConfigError> {
    if config.spreadsheet_id.is_empty() {
        return Err(ConfigError::Validation(
            "spreadsheet-id cannot be empty".to_string(),
        ));
    }

    if config.credentials_path.is_empty() {
        return Err(ConfigError::Validation(
            "credentials-path cannot be empty".to_string(),
        ));
    }

    if config.worksheet.is_empty() {
        return Err(ConfigError::Validation(
            "worksheet cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.api_base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api-base-url: {}", e)))?;

    Ok(())
}

/// Validates queue configuration
fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "queue path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates schedule configuration
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if config.poll_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-secs must be >= 1, got {}",
            config.poll_interval_secs
        )));
    }

    if config.capture_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "capture-attempts must be >= 1, got {}",
            config.capture_attempts
        )));
    }

    if config.upload_retry_step_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "upload-retry-step-secs must be >= 1, got {}",
            config.upload_retry_step_secs
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_printer() -> PrinterConfig {
        PrinterConfig {
            usage_url: "https://192.168.1.50/status".to_string(),
            printer_ip: "192.168.1.50".to_string(),
            verify_ssl: false,
            reachability_port: 443,
            timezone: "Europe/Berlin".to_string(),
        }
    }

    fn valid_sheets() -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: "abc123".to_string(),
            credentials_path: "creds.json".to_string(),
            worksheet: "UsageLog".to_string(),
            api_base_url: "https://sheets.googleapis.com".to_string(),
        }
    }

    #[test]
    fn test_validate_printer_accepts_http_and_https() {
        let mut cfg = valid_printer();
        assert!(validate_printer_config(&cfg).is_ok());

        cfg.usage_url = "http://printer.local/status".to_string();
        assert!(validate_printer_config(&cfg).is_ok());
    }

    #[test]
    fn test_validate_printer_rejects_bad_url() {
        let mut cfg = valid_printer();
        cfg.usage_url = "not a url".to_string();
        assert!(validate_printer_config(&cfg).is_err());

        cfg.usage_url = "ftp://printer.local/status".to_string();
        assert!(validate_printer_config(&cfg).is_err());

        cfg.usage_url = String::new();
        assert!(validate_printer_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_sheets_requires_identifiers() {
        let mut cfg = valid_sheets();
        assert!(validate_sheets_config(&cfg).is_ok());

        cfg.spreadsheet_id = String::new();
        assert!(validate_sheets_config(&cfg).is_err());

        let mut cfg = valid_sheets();
        cfg.credentials_path = String::new();
        assert!(validate_sheets_config(&cfg).is_err());

        let mut cfg = valid_sheets();
        cfg.worksheet = String::new();
        assert!(validate_sheets_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_schedule_bounds() {
        let mut cfg = ScheduleConfig::default();
        assert!(validate_schedule_config(&cfg).is_ok());

        cfg.capture_attempts = 0;
        assert!(validate_schedule_config(&cfg).is_err());

        let mut cfg = ScheduleConfig::default();
        cfg.poll_interval_secs = 0;
        assert!(validate_schedule_config(&cfg).is_err());

        let mut cfg = ScheduleConfig::default();
        cfg.upload_retry_step_secs = 0;
        assert!(validate_schedule_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_schedule_allows_zero_retry_delay() {
        let mut cfg = ScheduleConfig::default();
        cfg.capture_retry_delay_secs = 0;
        assert!(validate_schedule_config(&cfg).is_ok());
    }
}
