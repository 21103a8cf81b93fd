//! Key/value extraction from printer status documents
//!
//! This module turns one fetched status page into a metrics mapping:
//! - three structural heuristics over the main document (see [`kv`])
//! - discovery of `frame`/`iframe` sub-documents, each fetched and
//!   parsed the same way, keeping whichever document yields the most
//!   entries
//! - a best-effort diagnostic dump of the raw page when the yield is
//!   suspiciously low, to help debug firmware format drift

mod kv;
mod normalize;

pub use kv::parse_all_kv;
pub use normalize::normalize_key;

use crate::fetch::fetch_html;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Yields below this many entries trigger the diagnostic dump
const MIN_EXPECTED_KEYS: usize = 5;

/// Fixed filename for the low-yield diagnostic dump
pub const DIAGNOSTIC_DUMP_FILE: &str = "last_response.html";

/// Extracts key/value metrics from a status page, following frames
///
/// Parses the main document, then fetches every `frame`/`iframe`
/// (one level deep, resolved against `base_url`) and parses each the
/// same way. The candidate with strictly more entries than the current
/// best replaces it. Fetch or parse failures of individual frames are
/// logged and swallowed; extraction never fails as a whole.
///
/// If the best mapping ends up with fewer than 5 entries, the raw main
/// document is written to [`DIAGNOSTIC_DUMP_FILE`] (best effort).
///
/// # Arguments
///
/// * `client` - HTTP client used for frame fetches
/// * `base_url` - URL the document was fetched from
/// * `html` - The main document text
///
/// # Returns
///
/// The richest mapping found across the main document and all frames
pub async fn extract_key_values(
    client: &Client,
    base_url: &Url,
    html: &str,
) -> BTreeMap<String, String> {
    // The parsed DOM is not Send, so it stays confined to this block
    // and only owned data crosses the awaits below.
    let (mut best, frame_srcs) = {
        let document = Html::parse_document(html);
        (parse_all_kv(&document), frame_sources(&document))
    };

    for src in frame_srcs {
        let frame_url = match base_url.join(&src) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!("Skipping frame with unresolvable src '{}': {}", src, e);
                continue;
            }
        };

        let body = match fetch_html(client, frame_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Skipping frame {}: {}", frame_url, e);
                continue;
            }
        };

        let candidate = {
            let document = Html::parse_document(&body);
            parse_all_kv(&document)
        };

        if candidate.len() > best.len() {
            tracing::debug!(
                "Frame {} yielded {} entries, replacing best of {}",
                frame_url,
                candidate.len(),
                best.len()
            );
            best = candidate;
        }
    }

    if best.len() < MIN_EXPECTED_KEYS {
        tracing::warn!(
            "Extraction yielded only {} entries; dumping page to {}",
            best.len(),
            DIAGNOSTIC_DUMP_FILE
        );
        if let Err(e) = std::fs::write(DIAGNOSTIC_DUMP_FILE, html) {
            tracing::debug!("Could not write diagnostic dump: {}", e);
        }
    }

    best
}

/// Collects the `src` attributes of all frame and iframe elements
fn frame_sources(document: &Html) -> Vec<String> {
    let selector = match Selector::parse("frame, iframe") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frameset_sources_found() {
        let html = r#"<html><frameset><frame src="menu.htm"><frame src="body.htm"></frameset></html>"#;
        let document = Html::parse_document(html);
        let srcs = frame_sources(&document);
        assert_eq!(srcs, vec!["menu.htm", "body.htm"]);
    }

    #[test]
    fn test_iframe_source_found() {
        let html = r#"<html><body><iframe src="/status/inner.htm"></iframe></body></html>"#;
        let document = Html::parse_document(html);
        let srcs = frame_sources(&document);
        assert_eq!(srcs, vec!["/status/inner.htm"]);
    }

    #[test]
    fn test_frame_sources_skip_empty() {
        let html = r#"<iframe src=""></iframe><iframe></iframe>"#;
        let document = Html::parse_document(html);
        assert!(frame_sources(&document).is_empty());
    }
}
