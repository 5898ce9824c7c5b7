//! Azure Document Intelligence layout client
//!
//! Submits an image to the prebuilt layout model over REST and polls the
//! returned operation until the analysis completes. The client is plain
//! data injected wherever analysis is needed; nothing here is a
//! process-wide singleton.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::ocr::document::{AnalyzeResult, OcrDocument};

/// Errors surfaced by the OCR transport layer.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analyze request rejected: {0}")]
    Rejected(String),
    #[error("analyze response missing Operation-Location header")]
    MissingOperationLocation,
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),
    #[error("analysis did not complete within {0:?}")]
    Timeout(Duration),
}

/// Connection options for the layout client.
#[derive(Debug, Clone)]
pub struct AzureOptions {
    /// Model to analyze with
    pub model_id: String,
    /// REST API version
    pub api_version: String,
    /// Delay between operation polls
    pub poll_interval: Duration,
    /// Overall deadline for one analysis
    pub timeout: Duration,
}

impl Default for AzureOptions {
    fn default() -> Self {
        Self {
            model_id: "prebuilt-layout".to_string(),
            api_version: "2024-11-30".to_string(),
            poll_interval: Duration::from_millis(750),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Anything that can turn an image into an OCR document.
#[async_trait]
pub trait DocumentAnalyzer {
    async fn analyze(&self, image: &[u8]) -> Result<OcrDocument, OcrError>;
}

/// REST client for the Azure Document Intelligence layout model.
pub struct AzureLayoutClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    options: AzureOptions,
}

/// Long-running operation envelope returned while polling.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    #[serde(default)]
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Default, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl AzureLayoutClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        options: AzureOptions,
    ) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key: api_key.into(),
            options,
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
            self.endpoint, self.options.model_id, self.options.api_version
        )
    }

    /// Submit the image and return the operation URL to poll.
    async fn submit(&self, image: &[u8]) -> Result<String, OcrError> {
        let body = json!({
            "base64Source": base64::engine::general_purpose::STANDARD.encode(image),
        });

        info!(
            "Submitting {} byte image to the {} model",
            image.len(),
            self.options.model_id
        );

        let response = self
            .http
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(OcrError::Rejected(format!("{status}: {detail}")));
        }

        response
            .headers()
            .get("operation-location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or(OcrError::MissingOperationLocation)
    }

    /// Poll the operation until it succeeds, fails, or the deadline passes.
    async fn poll(&self, operation_url: &str) -> Result<OcrDocument, OcrError> {
        let deadline = tokio::time::Instant::now() + self.options.timeout;

        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(OcrError::Timeout(self.options.timeout));
            }
            tokio::time::sleep(self.options.poll_interval).await;

            let operation: AnalyzeOperation = self
                .http
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.api_key)
                .send()
                .await?
                .json()
                .await?;

            debug!("analyze operation status: {}", operation.status);

            match operation.status.as_str() {
                "succeeded" => {
                    let result = operation.analyze_result.unwrap_or_default();
                    return Ok(OcrDocument::from(result));
                }
                "failed" => {
                    let detail = operation
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_else(|| "unknown error".to_string());
                    return Err(OcrError::AnalysisFailed(detail));
                }
                // notStarted / running
                _ => continue,
            }
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for AzureLayoutClient {
    async fn analyze(&self, image: &[u8]) -> Result<OcrDocument, OcrError> {
        let operation_url = self.submit(image).await?;
        self.poll(&operation_url).await
    }
}
