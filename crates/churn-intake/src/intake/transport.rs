use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::payload::TypedPayload;
use crate::config::PredictionConfig;

pub const CONNECTIVITY_MESSAGE: &str =
    "Error: Unable to submit form. Please check your network connection or try again later.";

/// Successful body returned by a prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Failure attributable to the remote collaborator rather than the entered values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("prediction request failed: {0}")]
    Network(String),
    #[error("prediction endpoint returned {status}")]
    Status {
        status: u16,
        status_text: String,
        server_error: Option<String>,
    },
    #[error("prediction response was malformed: {0}")]
    MalformedBody(String),
}

impl TransportError {
    /// Message shown to the user: the server's own error, else the status text, else a
    /// generic connectivity hint.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Status {
                server_error: Some(error),
                ..
            } if !error.trim().is_empty() => format!("Error: {error}"),
            TransportError::Status { status_text, .. } if !status_text.trim().is_empty() => {
                format!("Error: {status_text}. Unable to submit form. Please try again.")
            }
            _ => CONNECTIVITY_MESSAGE.to_string(),
        }
    }
}

/// Sends a payload to a prediction endpoint path such as `/api/bank-churn-prediction`.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn predict(
        &self,
        endpoint: &str,
        payload: &TypedPayload,
    ) -> Result<PredictionResponse, TransportError>;
}

/// JSON-over-HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpPredictionTransport {
    http: Client,
    config: PredictionConfig,
}

impl HttpPredictionTransport {
    pub fn new(config: PredictionConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }
}

#[async_trait]
impl PredictionTransport for HttpPredictionTransport {
    async fn predict(
        &self,
        endpoint: &str,
        payload: &TypedPayload,
    ) -> Result<PredictionResponse, TransportError> {
        let url = self.config.endpoint_url(endpoint);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Network(err.to_string()))?;

        if !status.is_success() {
            let server_error = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.error);
            return Err(TransportError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                server_error,
            });
        }

        serde_json::from_slice::<PredictionResponse>(&body)
            .map_err(|err| TransportError::MalformedBody(err.to_string()))
    }
}
