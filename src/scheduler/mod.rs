//! Poll/upload scheduler
//!
//! The outer control loop of the logger. Each cycle runs two phases in
//! sequence:
//! - capture: bounded fetch attempts against the printer, always
//!   ending in a queued record (real data or an offline marker)
//! - upload: repeated drain attempts against the spreadsheet within a
//!   bounded time window
//!
//! Everything is strictly sequential; waiting is plain timed sleeping.
//! The only state surviving a restart is the queue file itself.

use crate::config::Config;
use crate::extract::extract_key_values;
use crate::fetch::{build_http_client, fetch_html, host_reachable, REACHABILITY_TIMEOUT};
use crate::queue::{self, Record};
use crate::upload::drain_all;
use crate::{InkmeterError, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Drives capture and upload cycles on a fixed cadence
pub struct Scheduler {
    config: Config,
    http: Client,
    usage_url: Url,
    queue_path: PathBuf,
}

impl Scheduler {
    /// Creates a scheduler from a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Ready to run
    /// * `Err(InkmeterError)` - HTTP client construction or URL parsing failed
    pub fn new(config: Config) -> Result<Self> {
        let http = build_http_client(config.printer.verify_ssl)?;
        let usage_url = Url::parse(&config.printer.usage_url)?;
        let queue_path = PathBuf::from(&config.queue.path);

        Ok(Self {
            config,
            http,
            usage_url,
            queue_path,
        })
    }

    /// Runs capture/upload cycles forever
    ///
    /// Returns only on an unrecoverable queue error; fetch and upload
    /// failures are absorbed by the per-phase retry policies.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Logger started, polling every {}s", self.config.schedule.poll_interval_secs);

        loop {
            self.run_cycle().await?;
            tokio::time::sleep(Duration::from_secs(self.config.schedule.poll_interval_secs)).await;
        }
    }

    /// Runs one capture phase followed by one upload phase
    pub async fn run_cycle(&self) -> Result<()> {
        let hinted_keys = self.capture_phase().await?;
        self.upload_phase(hinted_keys.as_deref()).await;
        Ok(())
    }

    /// Tries to capture a usage snapshot, queueing the outcome
    ///
    /// Up to `capture-attempts` tries, spaced by the configured delay.
    /// Every attempt probes reachability first, then fetches and
    /// extracts. The first success appends a data record and returns
    /// its keys (the header hint for the upload phase). If every
    /// attempt fails, an offline-marker record is appended instead.
    ///
    /// Only queue append failures propagate; they mean the durability
    /// guarantee itself is broken.
    pub async fn capture_phase(&self) -> Result<Option<Vec<String>>> {
        let schedule = &self.config.schedule;
        let printer = &self.config.printer;

        for attempt in 1..=schedule.capture_attempts {
            match self.try_capture().await {
                Ok(record) => {
                    let keys: Vec<String> = record.data.keys().cloned().collect();
                    queue::append(&self.queue_path, &record)?;
                    tracing::info!(
                        "Captured printer data ({} value(s)) on attempt {}/{}",
                        keys.len(),
                        attempt,
                        schedule.capture_attempts
                    );
                    return Ok(Some(keys));
                }
                Err(e) => {
                    tracing::warn!(
                        "Capture attempt {}/{} failed: {}",
                        attempt,
                        schedule.capture_attempts,
                        e
                    );
                    if attempt < schedule.capture_attempts {
                        tokio::time::sleep(Duration::from_secs(schedule.capture_retry_delay_secs))
                            .await;
                    }
                }
            }
        }

        let record = Record::offline(printer.usage_url.as_str(), &printer.printer_ip);
        queue::append(&self.queue_path, &record)?;
        tracing::warn!("Printer offline, queued offline marker");
        Ok(None)
    }

    /// One capture attempt: reachability probe, fetch, extract
    async fn try_capture(&self) -> Result<Record> {
        let printer = &self.config.printer;

        if !host_reachable(
            &printer.printer_ip,
            printer.reachability_port,
            REACHABILITY_TIMEOUT,
        )
        .await
        {
            return Err(InkmeterError::Fetch(crate::FetchError::Unreachable {
                host: printer.printer_ip.clone(),
                port: printer.reachability_port,
            }));
        }

        let html = fetch_html(&self.http, printer.usage_url.as_str()).await?;
        let data = extract_key_values(&self.http, &self.usage_url, &html).await;

        Ok(Record::captured(
            printer.usage_url.as_str(),
            &printer.printer_ip,
            data,
        ))
    }

    /// Repeatedly drains the queue within the upload time window
    ///
    /// A fully drained queue ends the phase early. Partial drains and
    /// errors are logged and retried after the configured step delay
    /// until the window closes; whatever is left waits for the next
    /// cycle.
    pub async fn upload_phase(&self, hinted_keys: Option<&[String]>) {
        let schedule = &self.config.schedule;
        let deadline = Instant::now() + Duration::from_secs(schedule.upload_window_secs);

        loop {
            match drain_all(&self.queue_path, &self.config.sheets, hinted_keys).await {
                Ok(true) => {
                    tracing::info!("Upload complete, queue drained");
                    return;
                }
                Ok(false) => {
                    tracing::info!("Partial upload, records remain queued");
                }
                Err(e) => {
                    tracing::warn!("Upload attempt failed: {}", e);
                }
            }

            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(Duration::from_secs(schedule.upload_retry_step_secs)).await;
        }

        tracing::warn!("Upload window closed with records still queued, deferring to next cycle");
    }
}
