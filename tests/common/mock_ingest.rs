//! Mock ingest endpoint helpers
//!
//! Wraps a `wiremock` server standing in for `POST /api/sync/submissions`.

use std::time::Duration;

use openfield_collect::egui_app::sync::HttpIngestClient;
use reqwest::Url;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const INGEST_PATH: &str = "/api/sync/submissions";

pub async fn ingest_server() -> MockServer {
    MockServer::start().await
}

pub fn ingest_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}{}", server.uri(), INGEST_PATH)).unwrap()
}

pub fn ingest_client(server: &MockServer) -> HttpIngestClient {
    HttpIngestClient::new(ingest_url(server), Duration::from_secs(5)).unwrap()
}

/// Every POST answered with `response`
pub async fn answer_all(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(INGEST_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn ack_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "submission_id": 1 }))
}

/// Submissions received so far, in arrival order
pub async fn received_submissions(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == INGEST_PATH)
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["submission"].clone()
        })
        .collect()
}
