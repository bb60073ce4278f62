// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama embedding provider for the K-Stack semantic classifier.
//!
//! This crate implements [`EmbeddingAdapter`] against a local Ollama server's
//! `/api/embed` endpoint. Model inference stays in Ollama; this adapter only
//! moves text in and vectors out.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use kstack_config::model::OllamaConfig;
use kstack_core::traits::{EmbeddingAdapter, PluginAdapter};
use kstack_core::types::{EmbeddingInput, EmbeddingOutput, HealthStatus};
use kstack_core::KStackError;
use tracing::{debug, info};

use crate::client::OllamaClient;
use crate::types::EmbedRequest;

/// Embedding adapter backed by an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    /// Creates an embedder from `[ollama]` configuration.
    ///
    /// `timeout` bounds each HTTP request.
    pub fn new(config: &OllamaConfig, timeout: Duration) -> Result<Self, KStackError> {
        let client = OllamaClient::new(&config.base_url, timeout)?;
        info!(
            base_url = client.base_url(),
            model = config.embedding_model.as_str(),
            "Ollama embedder initialized"
        );
        Ok(Self {
            client,
            model: config.embedding_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, KStackError> {
        match self.client.version().await {
            Ok(version) => {
                debug!(version = version.as_str(), "Ollama reachable");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Ollama unreachable at {}: {e}",
                self.client.base_url()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), KStackError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, KStackError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let expected = input.texts.len();
        let request = EmbedRequest {
            model: self.model.clone(),
            input: input.texts,
        };
        let response = self.client.embed(&request).await?;

        if response.embeddings.len() != expected {
            return Err(KStackError::embedding(format!(
                "Ollama returned {} embeddings for {expected} inputs",
                response.embeddings.len()
            )));
        }

        let dimensions = response.embeddings.first().map_or(0, Vec::len);
        if dimensions == 0 || response.embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(KStackError::embedding(
                "Ollama returned embeddings with inconsistent dimensions",
            ));
        }

        Ok(EmbeddingOutput {
            embeddings: response.embeddings,
            dimensions,
        })
    }
}
