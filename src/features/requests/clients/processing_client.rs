use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::core::config::ProcessingConfig;
use crate::features::requests::models::ValidRequest;

/// Record returned by the processing endpoint once a request is accepted
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRecord {
    pub reference_number: String,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Failure reported while handing a request to the processing endpoint.
/// Always recoverable: the operator may edit the request and resubmit.
#[derive(Debug, Error)]
pub enum SubmissionFailure {
    #[error("Request rejected by processing endpoint: {0}")]
    Rejected(String),

    #[error("Processing endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected response from processing endpoint: {0}")]
    InvalidResponse(String),
}

/// Seam to the downstream collaborator that accepts validated requests and
/// assigns reference numbers. Implemented over HTTP in production, mocked
/// in tests.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, request: &ValidRequest) -> Result<SubmittedRecord, SubmissionFailure>;
}

/// Error body shape the processing endpoint uses for rejections
#[derive(Debug, Deserialize)]
struct ProcessingErrorResponse {
    #[serde(default)]
    message: String,
}

/// HTTP client for the request-processing endpoint
pub struct ProcessingApiClient {
    client: reqwest::Client,
    config: ProcessingConfig,
}

impl ProcessingApiClient {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .user_agent("AeroDeskCore/0.1 (request-submission)")
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }
}

#[async_trait]
impl SubmissionGateway for ProcessingApiClient {
    async fn submit(&self, request: &ValidRequest) -> Result<SubmittedRecord, SubmissionFailure> {
        let url = format!("{}/requests", self.config.base_url);

        tracing::debug!("Submitting request {} to {}", request.request_id, url);

        let mut http_request = self.client.post(&url).json(request);
        if let Some(ref api_key) = self.config.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await.map_err(|e| {
            tracing::error!("Failed to reach processing endpoint: {}", e);
            SubmissionFailure::Unavailable(e.to_string())
        })?;

        let status = response.status();

        if status.is_success() {
            let record = response.json::<SubmittedRecord>().await.map_err(|e| {
                tracing::error!("Failed to parse processing endpoint response: {}", e);
                SubmissionFailure::InvalidResponse(e.to_string())
            })?;

            tracing::info!(
                "Processing endpoint accepted request {}: ref={}",
                request.request_id,
                record.reference_number
            );
            return Ok(record);
        }

        let body = response.text().await.unwrap_or_default();

        if status.is_server_error() {
            tracing::error!("Processing endpoint error: HTTP {} - {}", status, body);
            return Err(SubmissionFailure::Unavailable(format!("HTTP {}", status)));
        }

        // 4xx: prefer the endpoint's own rejection message when the body parses
        let message = serde_json::from_str::<ProcessingErrorResponse>(&body)
            .map(|e| e.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        tracing::warn!(
            "Processing endpoint rejected request {}: {}",
            request.request_id,
            message
        );
        Err(SubmissionFailure::Rejected(message))
    }
}
