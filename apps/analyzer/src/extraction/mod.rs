//! Extraction client: the single point of contact with the job-description
//! extraction service.
//!
//! One request per analysis, no retries: a failure is reported back to the
//! session, and the user decides whether to analyze again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod job;
pub mod wire;

use crate::extraction::job::ExtractedJob;
use crate::extraction::wire::ServiceJob;

const ANALYZE_ENDPOINT: &str = "/analyze";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extraction service error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed extraction reply: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can turn a raw job description into an `ExtractedJob`.
///
/// Carried in `AppState` as `Arc<dyn Extractor>` so tests can substitute a fake.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, description: &str) -> Result<ExtractedJob, ExtractionError>;
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    description: &'a str,
}

/// HTTP client for the extraction service's `POST /analyze`.
#[derive(Clone)]
pub struct ExtractionClient {
    client: Client,
    base_url: String,
}

impl ExtractionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Extractor for ExtractionClient {
    async fn extract(&self, description: &str) -> Result<ExtractedJob, ExtractionError> {
        let url = format!("{}{}", self.base_url, ANALYZE_ENDPOINT);
        info!("Calling extraction service: {url} ({} chars)", description.len());

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { description })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Extraction service returned {status}: {body}");
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let wire: ServiceJob = serde_json::from_str(&body)?;
        let job = ExtractedJob::from(wire);

        debug!(
            "Extraction succeeded: skills={}, company={:?}",
            job.skills.len(),
            job.company
        );

        Ok(job)
    }
}
