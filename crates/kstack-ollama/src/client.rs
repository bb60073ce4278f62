// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama embedding API.
//!
//! Provides [`OllamaClient`] which handles request construction, error
//! body decoding, and a single retry on transient errors.

use std::time::Duration;

use kstack_core::KStackError;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, EmbedRequest, EmbedResponse, VersionResponse};

/// Delay before retrying a transient failure.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// HTTP client for a single Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl OllamaClient {
    /// Creates a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, KStackError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KStackError::Embedding {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/embed`.
    ///
    /// On transient errors (429, 500, 503), retries once after a short delay.
    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, KStackError> {
        let url = format!("{}/api/embed", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying embed request after transient error");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| KStackError::Embedding {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "embed response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| KStackError::Embedding {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| KStackError::Embedding {
                    message: format!("failed to parse embed response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(KStackError::embedding(format!(
                    "Ollama returned {status}: {body}"
                )));
                continue;
            }

            return Err(KStackError::embedding(api_error_message(status, &body)));
        }

        Err(last_error
            .unwrap_or_else(|| KStackError::embedding("embed request failed after retries")))
    }

    /// `GET /api/version`.
    pub async fn version(&self) -> Result<String, KStackError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| KStackError::Embedding {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KStackError::embedding(api_error_message(status, &body)));
        }

        let version: VersionResponse = response.json().await.map_err(|e| KStackError::Embedding {
            message: format!("failed to parse version response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(version.version)
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("Ollama API error ({status}): {}", api_err.error),
        Err(_) => format!("Ollama returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
