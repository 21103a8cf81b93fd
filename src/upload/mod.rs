//! Reconciliation loop between the local queue and the spreadsheet
//!
//! Drains pending records to the Sheets sink, keeping exactly the
//! records that failed. Delivery is at-least-once: a crash between a
//! successful remote append and the queue rewrite can duplicate a row,
//! which is accepted.

use crate::config::SheetsConfig;
use crate::queue;
use crate::sheets::SheetsClient;
use crate::Result;
use std::path::Path;

/// Attempts to upload every pending record, in file order
///
/// Reads the queue; if it is empty, succeeds without any network call.
/// Otherwise connects to the sink, opens (or creates) the worksheet,
/// and for each record ensures the header covers its keys, then
/// appends its row. A record whose upload fails is kept for retry and
/// the remaining records still get their attempt in the same pass.
/// Finally the queue file is rewritten to contain exactly the failed
/// records, in their original order.
///
/// # Arguments
///
/// * `queue_path` - Path of the local durable queue file
/// * `config` - Sheets sink configuration
/// * `hinted_keys` - Keys of the most recent capture, if any; used to
///   grow the header eagerly before the per-record loop
///
/// # Returns
///
/// * `Ok(true)` - The queue is now empty
/// * `Ok(false)` - Some records failed and remain queued
/// * `Err(InkmeterError)` - Connecting or reading/rewriting the queue failed
pub async fn drain_all(
    queue_path: &Path,
    config: &SheetsConfig,
    hinted_keys: Option<&[String]>,
) -> Result<bool> {
    let pending = queue::read_all(queue_path)?;
    if pending.is_empty() {
        return Ok(true);
    }

    tracing::info!("Draining {} pending record(s)", pending.len());

    let client = SheetsClient::connect(config).await?;
    let worksheet = client
        .open_worksheet(&config.spreadsheet_id, &config.worksheet)
        .await?;

    if let Some(keys) = hinted_keys {
        // Grows the header once up front; correctness does not depend
        // on it, the per-record ensure below covers every key again.
        client.ensure_header(&worksheet, keys).await?;
    }

    let mut failed = Vec::new();
    for record in pending {
        let keys: Vec<String> = record.data.keys().cloned().collect();

        let outcome = async {
            let header = client.ensure_header(&worksheet, &keys).await?;
            client
                .append_row(
                    &worksheet,
                    &header,
                    &record.data,
                    &record.page_url,
                    &record.printer_ip,
                )
                .await
        }
        .await;

        if let Err(e) = outcome {
            tracing::warn!("Upload failed for record from {}: {}", record.timestamp, e);
            failed.push(record);
        }
    }

    queue::rewrite(queue_path, &failed)?;
    Ok(failed.is_empty())
}
