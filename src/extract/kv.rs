//! Key/value heuristics over a single parsed document
//!
//! Status pages across firmware generations lay out the same metrics in
//! three different shapes, handled by three independent passes:
//! - definition lists (`<dl><dt>key</dt><dd>value</dd></dl>`)
//! - two-cell table rows (`<tr><td>key</td><td>value</td></tr>`)
//! - single-cell table rows holding `key: value` text
//!
//! Definition lists overwrite on duplicate keys; the table passes only
//! fill keys that are still absent. The passes run in that order.

use crate::extract::normalize::normalize_key;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Extracts key/value pairs from one parsed document
///
/// Runs all three heuristics and merges their results. Keys are
/// normalized with [`normalize_key`]; empty keys are skipped.
///
/// # Arguments
///
/// * `document` - The parsed HTML document
///
/// # Returns
///
/// A mapping from normalized key to trimmed value
pub fn parse_all_kv(document: &Html) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();

    collect_definition_lists(document, &mut data);
    collect_two_cell_rows(document, &mut data);
    collect_colon_rows(document, &mut data);

    data
}

/// Heuristic A: `<dl>` definition lists, pairing terms with
/// descriptions positionally. Duplicate keys overwrite.
fn collect_definition_lists(document: &Html, data: &mut BTreeMap<String, String>) {
    let (Ok(dl_selector), Ok(dt_selector), Ok(dd_selector)) = (
        Selector::parse("dl"),
        Selector::parse("dt"),
        Selector::parse("dd"),
    ) else {
        return;
    };

    for dl in document.select(&dl_selector) {
        let terms: Vec<ElementRef> = dl.select(&dt_selector).collect();
        let descriptions: Vec<ElementRef> = dl.select(&dd_selector).collect();

        for (term, description) in terms.iter().zip(descriptions.iter()) {
            let key = normalize_key(&element_text(term));
            if key.is_empty() {
                continue;
            }
            let value = element_text(description);
            data.insert(key, value);
        }
    }
}

/// Heuristic B: table rows with exactly two cells. First cell is the
/// key, second the value. Existing keys are kept.
fn collect_two_cell_rows(document: &Html, data: &mut BTreeMap<String, String>) {
    for cells in table_rows(document) {
        if cells.len() != 2 {
            continue;
        }
        let key = normalize_key(&element_text(&cells[0]));
        if key.is_empty() {
            continue;
        }
        let value = element_text(&cells[1]);
        data.entry(key).or_insert(value);
    }
}

/// Heuristic C: table rows with a single cell containing `key: value`
/// text, split on the first colon. Existing keys are kept.
fn collect_colon_rows(document: &Html, data: &mut BTreeMap<String, String>) {
    for cells in table_rows(document) {
        if cells.len() != 1 {
            continue;
        }
        let text = element_text(&cells[0]).replace('\u{ff1a}', ":");
        let Some((raw_key, raw_value)) = text.split_once(':') else {
            continue;
        };
        let key = normalize_key(raw_key);
        if key.is_empty() {
            continue;
        }
        data.entry(key).or_insert_with(|| raw_value.trim().to_string());
    }
}

/// Yields the `td`/`th` cells of every table row in the document
fn table_rows(document: &Html) -> Vec<Vec<ElementRef>> {
    let (Ok(tr_selector), Ok(cell_selector)) = (Selector::parse("tr"), Selector::parse("td, th"))
    else {
        return Vec::new();
    };

    document
        .select(&tr_selector)
        .map(|row| row.select(&cell_selector).collect())
        .collect()
}

/// Collects an element's text nodes, trimmed and joined with single
/// spaces
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
