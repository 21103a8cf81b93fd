//! Inkmeter main entry point
//!
//! This is the command-line interface for the inkmeter printer usage
//! logger.

use anyhow::Context;
use clap::Parser;
use inkmeter::config::load_config;
use inkmeter::queue;
use inkmeter::upload::drain_all;
use inkmeter::Scheduler;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Inkmeter: a resilient printer usage logger
///
/// Inkmeter polls a printer's status page, extracts usage metrics from
/// its HTML, buffers every capture in a local NDJSON queue, and
/// uploads buffered records to a Google Sheets worksheet.
#[derive(Parser, Debug)]
#[command(name = "inkmeter")]
#[command(version = "1.0.0")]
#[command(about = "A resilient printer usage logger", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would run without polling
    #[arg(long, conflicts_with_all = ["once", "drain"])]
    dry_run: bool,

    /// Run a single capture/upload cycle and exit
    #[arg(long, conflicts_with_all = ["dry_run", "drain"])]
    once: bool,

    /// Upload pending queue records and exit, without capturing
    #[arg(long, conflicts_with_all = ["dry_run", "once"])]
    drain: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.drain {
        handle_drain(&config).await?;
    } else {
        let scheduler = Scheduler::new(config)?;
        if cli.once {
            scheduler.run_cycle().await?;
        } else {
            scheduler.run().await?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("inkmeter=info,warn"),
            1 => EnvFilter::new("inkmeter=debug,info"),
            2 => EnvFilter::new("inkmeter=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &inkmeter::config::Config) {
    println!("=== Inkmeter Dry Run ===\n");

    println!("Printer:");
    println!("  Usage URL: {}", config.printer.usage_url);
    println!(
        "  Printer IP: {}",
        if config.printer.printer_ip.is_empty() {
            "(none, reachability probe skipped)"
        } else {
            config.printer.printer_ip.as_str()
        }
    );
    println!("  Verify TLS: {}", config.printer.verify_ssl);
    println!("  Reachability port: {}", config.printer.reachability_port);
    println!("  Timezone hint: {}", config.printer.timezone);

    println!("\nSheets sink:");
    println!("  Spreadsheet: {}", config.sheets.spreadsheet_id);
    println!("  Worksheet: {}", config.sheets.worksheet);
    println!("  Credentials: {}", config.sheets.credentials_path);

    println!("\nQueue:");
    println!("  Path: {}", config.queue.path);
    let pending = queue::read_all(Path::new(&config.queue.path))
        .map(|r| r.len())
        .unwrap_or(0);
    println!("  Pending records: {}", pending);

    println!("\nSchedule:");
    println!("  Poll interval: {}s", config.schedule.poll_interval_secs);
    println!(
        "  Capture: up to {} attempt(s), {}s apart",
        config.schedule.capture_attempts, config.schedule.capture_retry_delay_secs
    );
    println!(
        "  Upload window: {}s, retry every {}s",
        config.schedule.upload_window_secs, config.schedule.upload_retry_step_secs
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --drain mode: uploads pending records and exits
async fn handle_drain(config: &inkmeter::config::Config) -> anyhow::Result<()> {
    let queue_path = Path::new(&config.queue.path);
    let pending = queue::read_all(queue_path)?.len();

    if pending == 0 {
        println!("Queue is empty, nothing to upload");
        return Ok(());
    }

    println!("Uploading {} pending record(s)...", pending);
    let drained = drain_all(queue_path, &config.sheets, None).await?;

    if drained {
        println!("✓ All records uploaded");
    } else {
        let left = queue::read_all(queue_path)?.len();
        println!("Partial upload, {} record(s) still queued", left);
    }

    Ok(())
}
