//! Client for the external palette inference service.
//!
//! Exactly one POST per call. The client never retries or caches; retries
//! come from the session when the user asks for one.

use async_trait::async_trait;
use photo_normalize::NormalizedPayload;
use serde::Serialize;
use std::time::Duration;

use crate::error::AnalysisError;
use crate::models::{AppConfig, PaletteResult};

/// Something that can turn a normalized image into a palette.
#[async_trait]
pub trait PaletteAnalyzer: Send + Sync {
    async fn analyze(&self, payload: &NormalizedPayload) -> Result<PaletteResult, AnalysisError>;
}

/// Request body: `{"image": "<base64 JPEG>"}`
#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    image: &'a str,
}

/// HTTPS client for the inference endpoint
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        Self::new(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PaletteAnalyzer for HttpAnalysisClient {
    async fn analyze(&self, payload: &NormalizedPayload) -> Result<PaletteResult, AnalysisError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            payload_bytes = payload.encoded_len(),
            width = payload.width,
            height = payload.height,
            "Sending image for analysis"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalyzeRequest {
                image: &payload.data,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Analysis request failed");
                AnalysisError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "Analysis service returned an error status"
            );
            return Err(AnalysisError::http(status.as_u16(), &body));
        }

        let body = response.text().await?;
        let result: PaletteResult = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, body_len = body.len(), "Malformed analysis response");
            AnalysisError::Parse(e.to_string())
        })?;

        tracing::debug!(
            colors = result.colors.len(),
            advice_chars = result.advice.chars().count(),
            "Palette received"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(AnalyzeRequest { image: "/9j/AAAA" }).unwrap();
        assert_eq!(body, serde_json::json!({ "image": "/9j/AAAA" }));
    }

    #[test]
    fn test_from_config_uses_endpoint() {
        let config = AppConfig {
            endpoint: "http://127.0.0.1:1/analyze".to_string(),
            ..Default::default()
        };
        let client = HttpAnalysisClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:1/analyze");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 1 on localhost is never listening in test environments
        let client =
            HttpAnalysisClient::new("http://127.0.0.1:1/", Duration::from_secs(2)).unwrap();
        let payload = NormalizedPayload::from_jpeg(
            &[0xff, 0xd8, 0xff],
            photo_normalize::Dimensions::new(1, 1),
        );

        let result = client.analyze(&payload).await;

        assert!(matches!(result, Err(AnalysisError::Transport(_))));
    }
}
