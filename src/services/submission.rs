use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;

use crate::models::EvaluationRecord;

/// Error types for a single record upload
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Server(StatusCode),
}

/// How one record fared during upload, reported back to the caller so a
/// retry policy can be decided there.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    NetworkError { detail: String },
    ServerError { code: u16 },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmissionOutcome {
    pub iteration: u32,
    #[serde(flatten)]
    pub delivery: DeliveryStatus,
}

/// Destination for completed evaluation records
///
/// Abstracted so tests can substitute a mock for the spreadsheet web app.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Uploads a single record. Success means the endpoint answered 200.
    async fn submit(&self, record: &EvaluationRecord) -> Result<(), SubmissionError>;
}

/// Posts records as JSON to a Google Sheets web-app endpoint
#[derive(Clone)]
pub struct SheetsWebAppClient {
    http_client: HttpClient,
    web_app_url: String,
}

impl SheetsWebAppClient {
    pub fn new(web_app_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            web_app_url,
        }
    }
}

#[async_trait::async_trait]
impl RecordSink for SheetsWebAppClient {
    async fn submit(&self, record: &EvaluationRecord) -> Result<(), SubmissionError> {
        let response = self
            .http_client
            .post(&self.web_app_url)
            .json(record)
            .send()
            .await?;

        // The web app signals acceptance with 200 specifically.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SubmissionError::Server(status));
        }
        Ok(())
    }
}

/// Uploads every record in order and collects a typed outcome per record.
///
/// Failures do not stop the batch and failed records are not retried or
/// persisted; the outcome list is the caller's only signal.
pub async fn submit_all(sink: &dyn RecordSink, records: &[EvaluationRecord]) -> Vec<SubmissionOutcome> {
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
        let delivery = match sink.submit(record).await {
            Ok(()) => {
                tracing::info!(iteration = record.iteration, "Record delivered");
                DeliveryStatus::Delivered
            }
            Err(SubmissionError::Server(status)) => {
                tracing::warn!(
                    iteration = record.iteration,
                    status = %status,
                    "Endpoint rejected record"
                );
                DeliveryStatus::ServerError {
                    code: status.as_u16(),
                }
            }
            Err(SubmissionError::Network(e)) => {
                tracing::warn!(
                    iteration = record.iteration,
                    error = %e,
                    "Could not reach submission endpoint"
                );
                DeliveryStatus::NetworkError {
                    detail: e.to_string(),
                }
            }
        };

        outcomes.push(SubmissionOutcome {
            iteration: record.iteration,
            delivery,
        });
    }

    outcomes
}
