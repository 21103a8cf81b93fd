use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use inkmeter::config::load_config;
///
/// let config = load_config(Path::new("inkmeter.toml")).unwrap();
/// println!("Worksheet: {}", config.sheets.worksheet);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[printer]
usage-url = "https://192.168.1.50/PRESENTATION/ADVANCED/INFO_PRTINFO/TOP"
printer-ip = "192.168.1.50"

[sheets]
spreadsheet-id = "1AbCdEfGhIjKlMnOpQrStUvWxYz"
credentials-path = "./creds.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.printer.printer_ip, "192.168.1.50");
        assert!(!config.printer.verify_ssl);
        assert_eq!(config.printer.reachability_port, 443);
        assert_eq!(config.sheets.worksheet, "UsageLog");
        assert_eq!(config.queue.path, "usage_log.ndjson");
        assert_eq!(config.schedule.poll_interval_secs, 1800);
        assert_eq!(config.schedule.capture_attempts, 5);
    }

    #[test]
    fn test_load_config_overrides_defaults() {
        let config_content = r#"
[printer]
usage-url = "http://printer.local/status"
verify-ssl = true

[sheets]
spreadsheet-id = "abc"
credentials-path = "creds.json"
worksheet = "Verbrauch"

[queue]
path = "/var/lib/inkmeter/queue.ndjson"

[schedule]
poll-interval-secs = 600
capture-attempts = 3
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert!(config.printer.verify_ssl);
        assert_eq!(config.sheets.worksheet, "Verbrauch");
        assert_eq!(config.queue.path, "/var/lib/inkmeter/queue.ndjson");
        assert_eq!(config.schedule.poll_interval_secs, 600);
        assert_eq!(config.schedule.capture_attempts, 3);
        // Unspecified schedule keys keep their defaults
        assert_eq!(config.schedule.upload_window_secs, 600);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/inkmeter.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_required_section() {
        // No [sheets] section at all
        let config_content = r#"
[printer]
usage-url = "http://printer.local/status"
"#;
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[printer]
usage-url = "not a url"

[sheets]
spreadsheet-id = "abc"
credentials-path = "creds.json"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }
}
