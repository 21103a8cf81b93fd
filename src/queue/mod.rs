//! Local durable queue of capture records
//!
//! Every capture attempt, successful or not, is appended here as one
//! JSON line before any network call toward the spreadsheet is made. A
//! record leaves the file only after the reconciliation loop confirms
//! its remote write. The file may be truncated mid-line by a crash, so
//! reading tolerates malformed lines by skipping them.

use crate::QueueError;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Note value stored on records written while the printer was offline
pub const OFFLINE_NOTE: &str = "printer_offline";

/// One capture event
///
/// `timestamp` is the capture attempt time in local civil time; the
/// spreadsheet's timestamp column is populated at upload time instead,
/// so the two deliberately differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub page_url: String,

    #[serde(default)]
    pub printer_ip: String,

    /// Normalized key to value; empty when the device was unreachable
    pub data: BTreeMap<String, String>,

    /// Offline marker, present only for failed captures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Record {
    /// Creates a record for a successful capture, stamped now
    pub fn captured(page_url: &str, printer_ip: &str, data: BTreeMap<String, String>) -> Self {
        Self {
            timestamp: local_timestamp(),
            page_url: page_url.to_string(),
            printer_ip: printer_ip.to_string(),
            data,
            note: None,
        }
    }

    /// Creates an offline-marker record with empty data, stamped now
    pub fn offline(page_url: &str, printer_ip: &str) -> Self {
        Self {
            timestamp: local_timestamp(),
            page_url: page_url.to_string(),
            printer_ip: printer_ip.to_string(),
            data: BTreeMap::new(),
            note: Some(OFFLINE_NOTE.to_string()),
        }
    }
}

/// Current local time as an ISO 8601 string without timezone offset
fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Appends one record to the queue file
///
/// Parent directories are created if the path has any. Disk-level
/// failures propagate; durability here is the backbone of the
/// at-least-once delivery contract.
///
/// # Arguments
///
/// * `path` - The queue file path
/// * `record` - The record to append
pub fn append(path: &Path, record: &Record) -> Result<(), QueueError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let line = serde_json::to_string(record)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// Reads all well-formed records from the queue file, in file order
///
/// A missing file yields an empty list. Blank lines, lines that fail
/// to parse as JSON, and lines whose payload lacks an object-valued
/// `data` field are skipped silently; adjacent records are unaffected.
///
/// # Arguments
///
/// * `path` - The queue file path
///
/// # Returns
///
/// All pending records, oldest first
pub fn read_all(path: &Path) -> Result<Vec<Record>, QueueError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!("Skipping malformed queue line: {}", e);
            }
        }
    }

    Ok(records)
}

/// Atomically replaces the queue file contents with the given records
///
/// Serializes everything to a sibling temporary file first, then
/// renames it over the original, so a crash mid-rewrite never leaves a
/// half-written queue.
///
/// # Arguments
///
/// * `path` - The queue file path
/// * `records` - The records the file should contain afterwards, in order
pub fn rewrite(path: &Path, records: &[Record]) -> Result<(), QueueError> {
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_path);

    {
        let mut file = fs::File::create(&tmp_path)?;
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{}", line)?;
        }
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}
