//! # Ingest Transport
//!
//! Delivers one submission to the ingest endpoint and interprets the
//! acknowledgement. Anything other than a 2xx response carrying a truthy
//! `ok` field is a [`DeliveryError`].

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use thiserror::Error;

use crate::shared::{IngestAck, IngestRequest, SubmissionFields};

/// Longest response body kept on a status error
const MAX_ERROR_BODY: usize = 512;

/// Why a delivery attempt did not succeed. The display text is what the
/// sync center shows as the entry's last error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Non-2xx response
    #[error("HTTP {code}")]
    Status { code: u16, body: String },
    /// 2xx response whose body is not an acknowledgement
    #[error("Invalid acknowledgement: {0}")]
    InvalidAck(String),
    /// Negative acknowledgement; carries the server's reason
    #[error("{0}")]
    Rejected(String),
    #[error("Request timed out")]
    Timeout,
    /// Connection refused, DNS failure and similar
    #[error("Network error: {0}")]
    Transport(String),
}

impl DeliveryError {
    /// Whether the server was reached at all
    pub fn reached_server(&self) -> bool {
        !matches!(self, DeliveryError::Timeout | DeliveryError::Transport(_))
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryError::Timeout
        } else {
            DeliveryError::Transport(err.to_string())
        }
    }
}

/// Posts submissions to an ingest endpoint
pub trait IngestTransport: Send + Sync {
    /// Deliver one submission payload and return the positive acknowledgement
    fn post_submission(
        &self,
        submission: &SubmissionFields,
    ) -> impl Future<Output = Result<IngestAck, DeliveryError>> + Send;
}

/// HTTP client for the ingest endpoint
#[derive(Debug, Clone)]
pub struct HttpIngestClient {
    client: Client,
    url: Url,
}

impl HttpIngestClient {
    /// Create a client posting to `url`, bounding each request by `timeout`
    pub fn new(url: Url, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, url })
    }

    /// Ingest endpoint URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Underlying HTTP client, shared with the connectivity probe
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

impl IngestTransport for HttpIngestClient {
    async fn post_submission(&self, submission: &SubmissionFields) -> Result<IngestAck, DeliveryError> {
        let request = IngestRequest {
            submission: submission.clone(),
        };

        let response = self
            .client
            .post(self.url.clone())
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(DeliveryError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let ack: IngestAck = serde_json::from_str(&body)
            .map_err(|e| DeliveryError::InvalidAck(e.to_string()))?;

        if !ack.is_ok() {
            let reason = ack.reason().unwrap_or("Sync failed").to_string();
            return Err(DeliveryError::Rejected(reason));
        }

        Ok(ack)
    }
}
