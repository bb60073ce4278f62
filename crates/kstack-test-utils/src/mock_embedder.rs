// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter for deterministic testing.
//!
//! `MockEmbedder` implements `EmbeddingAdapter` with a tiny bag-of-features
//! model: each output dimension counts the feature words found in the text.
//! Dimensions 0-3 track the four suits, 4-5 light and dark, and the last
//! dimension is a constant bias so no embedding is ever all zeros.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use kstack_core::traits::adapter::PluginAdapter;
use kstack_core::traits::embedding::EmbeddingAdapter;
use kstack_core::types::{EmbeddingInput, EmbeddingOutput, HealthStatus};
use kstack_core::KStackError;

/// Output dimension of [`MockEmbedder`].
pub const MOCK_DIMENSIONS: usize = 7;

const BIAS: f32 = 0.1;

const FEATURES: [&[&str]; 6] = [
    &[
        "love", "sad", "heart", "emotional", "compassion", "grief", "tears", "joy", "happiness",
        "feel",
    ],
    &[
        "calculate", "logic", "think", "reason", "deduce", "solve", "equation", "proof", "analy",
    ],
    &[
        "money", "gold", "coin", "price", "cost", "wealth", "rich", "buy", "expensive",
        "purchase", "dollar", "sell", "profit",
    ],
    &[
        "build", "action", "move", "create", "run", "strike", "make", "immediately", "fast",
    ],
    &[
        "hope", "joy", "forward", "can do", "grateful", "bright", "ready", "yes", "excited",
        "start",
    ],
    &[
        "stuck", "can't", "blocked", "hard", "lost", "confused", "overwhelmed", "give up",
        "nothing",
    ],
];

/// A deterministic embedding adapter.
///
/// Clones share counters and switches, so a test can keep a handle while
/// the classifier owns another.
#[derive(Clone)]
pub struct MockEmbedder {
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    health: Arc<Mutex<HealthStatus>>,
    delay_ms: Arc<AtomicU64>,
}

impl MockEmbedder {
    /// Create a healthy mock embedder with no latency.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
            health: Arc::new(Mutex::new(HealthStatus::Healthy)),
            delay_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sleep for `delay` inside every `embed` call.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    /// Change the latency of subsequent `embed` calls.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make subsequent `embed` calls fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Status reported by `health_check`.
    pub fn set_health(&self, status: HealthStatus) {
        *self.health.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Number of `embed` calls made so far, failed ones included.
    pub fn embed_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The embedding this mock produces for `text`.
    pub fn embedding_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vec: Vec<f32> = FEATURES
            .iter()
            .map(|words| words.iter().filter(|w| lower.contains(**w)).count() as f32)
            .collect();
        vec.push(BIAS);
        vec
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, KStackError> {
        Ok(self
            .health
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn shutdown(&self) -> Result<(), KStackError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, KStackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay_ms = self.delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(KStackError::embedding("mock embedder failure"));
        }

        debug!(texts = input.texts.len(), "mock embed");
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| Self::embedding_for(t)).collect(),
            dimensions: MOCK_DIMENSIONS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_counts_features_per_dimension() {
        let v = MockEmbedder::embedding_for("I love gold and I'm stuck");
        assert_eq!(v.len(), MOCK_DIMENSIONS);
        assert_eq!(v[0], 1.0);
        assert_eq!(v[2], 1.0);
        assert_eq!(v[5], 1.0);
        assert_eq!(v[6], BIAS);
    }

    #[test]
    fn unknown_text_is_bias_only() {
        let v = MockEmbedder::embedding_for("zzz");
        assert_eq!(&v[..6], &[0.0; 6]);
        assert!(v[6] > 0.0);
    }

    #[tokio::test]
    async fn embed_counts_calls_and_fails_on_demand() {
        let mock = MockEmbedder::new();
        let handle = mock.clone();
        let input = EmbeddingInput {
            texts: vec!["a".into(), "b".into()],
        };

        let out = mock.embed(input.clone()).await.unwrap();
        assert_eq!(out.embeddings.len(), 2);
        assert_eq!(out.dimensions, MOCK_DIMENSIONS);

        handle.set_failing(true);
        assert!(mock.embed(input).await.is_err());
        assert_eq!(handle.embed_calls(), 2);
    }

    #[tokio::test]
    async fn health_is_configurable() {
        let mock = MockEmbedder::new();
        assert_eq!(mock.health_check().await.unwrap(), HealthStatus::Healthy);
        mock.set_health(HealthStatus::Degraded("slow".into()));
        assert_eq!(
            mock.health_check().await.unwrap(),
            HealthStatus::Degraded("slow".into())
        );
    }
}
