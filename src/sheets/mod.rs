//! Google Sheets sink adapter
//!
//! This module writes usage records to a worksheet through the Sheets
//! v4 REST API:
//! - token acquisition from an authorized-user credentials file
//! - worksheet lookup, creating the sheet if it does not exist yet
//! - header reconciliation (columns are only ever appended, never
//!   removed or reordered)
//! - row appends aligned to the current header

mod auth;
mod client;

pub use client::{SheetsClient, Worksheet, BASE_COLUMNS};
