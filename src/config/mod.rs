//! Configuration module for inkmeter
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use inkmeter::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("inkmeter.toml")).unwrap();
//! println!("Polling: {}", config.printer.usage_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, PrinterConfig, QueueConfig, ScheduleConfig, SheetsConfig};

// Re-export parser functions
pub use parser::load_config;
