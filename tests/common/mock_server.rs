//! Mock inference service for analysis tests.

use std::time::Duration;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Endpoint path the tests point the client at
pub const ANALYZE_PATH: &str = "/analyze";

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockAnalysisService {
    pub server: MockServer,
}

impl MockAnalysisService {
    /// Start a new mock inference service
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Full URL of the analyze endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server.uri(), ANALYZE_PATH)
    }

    fn analyze_request() -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .and(header("content-type", "application/json"))
    }

    /// Respond to every analyze request with a palette
    pub async fn mock_palette(&self, response: serde_json::Value) {
        Self::analyze_request()
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Respond with a palette exactly `times` times; verified when the server drops
    pub async fn mock_palette_times(&self, response: serde_json::Value, times: u64) {
        Self::analyze_request()
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .up_to_n_times(times)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Respond with an error status exactly `times` times
    pub async fn mock_error_times(&self, status: u16, message: &str, times: u64) {
        Self::analyze_request()
            .respond_with(ResponseTemplate::new(status).set_body_string(message))
            .up_to_n_times(times)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Respond 200 with an arbitrary raw body
    pub async fn mock_raw_body(&self, body: &str) {
        Self::analyze_request()
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond with a palette after a delay
    pub async fn mock_slow_palette(&self, response: serde_json::Value, delay: Duration) {
        Self::analyze_request()
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(response)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.body_json().expect("request body should be JSON"))
            .collect()
    }
}
