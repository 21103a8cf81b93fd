//! Integration tests for key/value extraction
//!
//! These tests use wiremock to stand in for the printer when the
//! extractor follows frames.

use inkmeter::extract::extract_key_values;
use inkmeter::fetch::build_http_client;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a table document with `count` distinct key/value rows
fn table_document(count: usize, prefix: &str) -> String {
    let rows: String = (0..count)
        .map(|i| format!("<tr><td>{} {}</td><td>value {}</td></tr>", prefix, i, i))
        .collect();
    format!("<html><body><table>{}</table></body></html>", rows)
}

#[tokio::test]
async fn test_no_frames_means_no_network() {
    let mock_server = MockServer::start().await;
    let base_url = Url::parse(&mock_server.uri()).unwrap();
    let client = build_http_client(false).unwrap();

    // Five keys so the low-yield diagnostic path stays quiet too
    let html = table_document(5, "Counter");
    let data = extract_key_values(&client, &base_url, &html).await;

    assert_eq!(data.len(), 5);
    assert_eq!(data.get("Counter 0"), Some(&"value 0".to_string()));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(
        requests.is_empty(),
        "extraction without frames must not fetch anything"
    );
}

#[tokio::test]
async fn test_richest_frame_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/frame.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(table_document(7, "Frame")))
        .mount(&mock_server)
        .await;

    // Main document: 3 keys plus a frame pointing at the richer page
    let main_html = "<html><body><table>\
         <tr><td>Main 0</td><td>v</td></tr>\
         <tr><td>Main 1</td><td>v</td></tr>\
         <tr><td>Main 2</td><td>v</td></tr>\
         </table><iframe src=\"/frame.htm\"></iframe></body></html>"
        .to_string();

    let base_url = Url::parse(&mock_server.uri()).unwrap();
    let client = build_http_client(false).unwrap();
    let data = extract_key_values(&client, &base_url, &main_html).await;

    assert_eq!(data.len(), 7);
    assert!(data.contains_key("Frame 0"));
    assert!(!data.contains_key("Main 0"), "main mapping should be replaced");
}

#[tokio::test]
async fn test_poorer_frame_does_not_replace_main() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/frame.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(table_document(2, "Frame")))
        .mount(&mock_server)
        .await;

    let main_html = format!(
        "{}<iframe src=\"/frame.htm\"></iframe>",
        table_document(6, "Main")
    );

    let base_url = Url::parse(&mock_server.uri()).unwrap();
    let client = build_http_client(false).unwrap();
    let data = extract_key_values(&client, &base_url, &main_html).await;

    assert_eq!(data.len(), 6);
    assert!(data.contains_key("Main 0"));
}

#[tokio::test]
async fn test_failing_frame_is_swallowed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken.htm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let main_html = format!(
        "{}<iframe src=\"/broken.htm\"></iframe>",
        table_document(6, "Main")
    );

    let base_url = Url::parse(&mock_server.uri()).unwrap();
    let client = build_http_client(false).unwrap();
    let data = extract_key_values(&client, &base_url, &main_html).await;

    // The broken frame degrades gracefully; the main result survives
    assert_eq!(data.len(), 6);
}

#[tokio::test]
async fn test_frame_urls_resolved_against_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status/detail.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(table_document(8, "Detail")))
        .mount(&mock_server)
        .await;

    // Relative src resolved against the page's directory
    let main_html = format!(
        "{}<iframe src=\"detail.htm\"></iframe>",
        table_document(5, "Main")
    );

    let base_url = Url::parse(&format!("{}/status/top.htm", mock_server.uri())).unwrap();
    let client = build_http_client(false).unwrap();
    let data = extract_key_values(&client, &base_url, &main_html).await;

    assert_eq!(data.len(), 8);
    assert!(data.contains_key("Detail 0"));
}
