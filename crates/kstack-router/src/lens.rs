// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic K-vector classification ("K-lens").
//!
//! Calibrates one centroid per suit and per polarity from fixed exemplar
//! phrases, then classifies queries by nearest-centroid cosine similarity.
//! Every embedding failure or timeout degrades to "unavailable" (`None`);
//! callers fall back to the keyword classifier.
//!
//! Lifecycle: idle -> loading -> ready | error. Initialization is
//! single-flight. [`SemanticClassifier::reset`] bumps a generation counter
//! so calibrations and detections started before the reset never publish.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use kstack_core::types::{EmbeddingInput, EmbeddingOutput};
use kstack_core::{
    EmbeddingAdapter, HealthStatus, KStackError, KVector, Polarity, Suit, SuitScores,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::similarity::{average_vectors, cosine_similarity, l2_normalize};

/// Exemplar phrases for each suit centroid.
pub const SUIT_EXEMPLARS: [(Suit, [&str; 8]); 4] = [
    (
        Suit::Hearts,
        [
            "I love you",
            "feeling sad",
            "emotional warmth",
            "my heart aches",
            "compassion",
            "grief and tears",
            "joy and happiness",
            "loving feeling",
        ],
    ),
    (
        Suit::Spades,
        [
            "calculate this",
            "logical analysis",
            "think carefully",
            "reasoning",
            "deduce the answer",
            "solve equation",
            "proof theorem",
            "analyze data",
        ],
    ),
    (
        Suit::Diamonds,
        [
            "how much money",
            "gold coins",
            "price and cost",
            "wealthy rich",
            "buy this item",
            "expensive purchase",
            "dollar value",
            "sell for profit",
        ],
    ),
    (
        Suit::Clubs,
        [
            "build it now",
            "take action",
            "move forward",
            "create something",
            "run fast",
            "strike hard",
            "make this",
            "do it immediately",
        ],
    ),
];

/// Exemplar phrases for the polarity centroids.
pub const POLARITY_EXEMPLARS: [(Polarity, [&str; 8]); 2] = [
    (
        Polarity::Light,
        [
            "hope and joy",
            "moving forward",
            "I can do this",
            "feeling grateful",
            "bright future",
            "open and ready",
            "yes, let's go",
            "excited to start",
        ],
    ),
    (
        Polarity::Dark,
        [
            "I'm stuck",
            "can't move",
            "feeling blocked",
            "everything is hard",
            "lost and confused",
            "overwhelmed",
            "I give up",
            "nothing works",
        ],
    ),
];

/// Number of embedding calls one calibration makes (one batch per category).
pub const CALIBRATION_BATCHES: usize = SUIT_EXEMPLARS.len() + POLARITY_EXEMPLARS.len();

const PROGRESS_CHECKING: &str = "Checking embedding provider...";
const PROGRESS_SUITS: &str = "Calibrating suit centroids...";
const PROGRESS_POLARITY: &str = "Calibrating polarity centroids...";
const PROGRESS_READY: &str = "K-lens ready";

/// Observable readiness of the semantic classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensState {
    /// False once the embedding provider has proven unusable.
    pub available: bool,
    pub loading: bool,
    pub ready: bool,
    /// Human-readable progress message.
    pub progress: String,
    pub error: Option<String>,
}

impl Default for LensState {
    fn default() -> Self {
        Self {
            available: true,
            loading: false,
            ready: false,
            progress: String::new(),
            error: None,
        }
    }
}

/// Calibrated centroids. Immutable once built.
#[derive(Debug)]
struct CentroidSet {
    suits: Vec<(Suit, Vec<f32>)>,
    light: Vec<f32>,
    dark: Vec<f32>,
}

/// Embedding-centroid K-vector classifier.
pub struct SemanticClassifier {
    embedder: Arc<dyn EmbeddingAdapter>,
    embed_timeout: Duration,
    state: Mutex<LensState>,
    centroids: ArcSwapOption<CentroidSet>,
    generation: AtomicU64,
}

impl std::fmt::Debug for SemanticClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticClassifier")
            .field("embedder", &self.embedder.name())
            .field("embed_timeout", &self.embed_timeout)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl SemanticClassifier {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, embed_timeout: Duration) -> Self {
        Self {
            embedder,
            embed_timeout,
            state: Mutex::new(LensState::default()),
            centroids: ArcSwapOption::const_empty(),
            generation: AtomicU64::new(0),
        }
    }

    /// Calibrate the centroids.
    ///
    /// Returns `true` when the classifier is (or already was) ready. Returns
    /// `false` when another initialization is in flight, when calibration
    /// fails, or when a reset superseded this attempt.
    pub async fn initialize(&self) -> bool {
        let generation = {
            let mut state = self.state.lock().await;
            if state.ready {
                return true;
            }
            if state.loading {
                debug!("K-lens initialization already in flight");
                return false;
            }
            state.loading = true;
            state.error = None;
            state.progress = PROGRESS_CHECKING.to_string();
            self.generation.load(Ordering::SeqCst)
        };

        info!(embedder = self.embedder.name(), "initializing K-lens");
        let result = self.calibrate(generation).await;

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding K-lens calibration from before reset");
            return false;
        }

        match result {
            Ok(centroids) => {
                self.centroids.store(Some(Arc::new(centroids)));
                state.loading = false;
                state.ready = true;
                state.progress = PROGRESS_READY.to_string();
                info!("K-lens ready");
                true
            }
            Err(e) => {
                warn!(error = %e, "K-lens initialization failed");
                state.loading = false;
                state.ready = false;
                state.available = false;
                state.error = Some(format!("Failed to initialize K-lens: {e}"));
                false
            }
        }
    }

    async fn calibrate(&self, generation: u64) -> Result<CentroidSet, KStackError> {
        let health = tokio::time::timeout(self.embed_timeout, self.embedder.health_check())
            .await
            .map_err(|_| KStackError::Timeout {
                duration: self.embed_timeout,
            })??;
        match health {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                warn!(reason = reason.as_str(), "embedding provider degraded");
            }
            HealthStatus::Unhealthy(reason) => {
                return Err(KStackError::embedding(format!(
                    "embedding provider unhealthy: {reason}"
                )));
            }
        }

        self.set_progress(generation, PROGRESS_SUITS).await;
        let mut suits = Vec::with_capacity(SUIT_EXEMPLARS.len());
        for (suit, exemplars) in &SUIT_EXEMPLARS {
            suits.push((*suit, self.centroid(exemplars).await?));
        }

        self.set_progress(generation, PROGRESS_POLARITY).await;
        let [(_, light), (_, dark)] = &POLARITY_EXEMPLARS;
        let light = self.centroid(light).await?;
        let dark = self.centroid(dark).await?;

        let dimension = light.len();
        if dark.len() != dimension || suits.iter().any(|(_, c)| c.len() != dimension) {
            return Err(KStackError::embedding(
                "embedding dimension changed during calibration",
            ));
        }

        Ok(CentroidSet { suits, light, dark })
    }

    /// Mean of the normalized exemplar embeddings.
    async fn centroid(&self, exemplars: &[&str]) -> Result<Vec<f32>, KStackError> {
        let texts: Vec<String> = exemplars.iter().map(|s| s.to_string()).collect();
        let output = self.embed(texts).await?;
        let normalized: Vec<Vec<f32>> = output.embeddings.iter().map(|e| l2_normalize(e)).collect();
        Ok(average_vectors(&normalized))
    }

    /// Embed with the configured timeout, checking the output shape.
    async fn embed(&self, texts: Vec<String>) -> Result<EmbeddingOutput, KStackError> {
        let expected = texts.len();
        let output = tokio::time::timeout(self.embed_timeout, self.embedder.embed(EmbeddingInput { texts }))
            .await
            .map_err(|_| KStackError::Timeout {
                duration: self.embed_timeout,
            })??;
        if output.embeddings.len() != expected {
            return Err(KStackError::embedding(format!(
                "expected {expected} embeddings, provider returned {}",
                output.embeddings.len()
            )));
        }
        uniform_dimension(&output.embeddings)?;
        Ok(output)
    }

    async fn set_progress(&self, generation: u64, progress: &str) {
        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            state.progress = progress.to_string();
        }
    }

    /// Classify `text`, or `None` when not ready or the embedding fails.
    pub async fn classify(&self, text: &str) -> Option<KVector> {
        let generation = self.generation.load(Ordering::SeqCst);
        let centroids = self.centroids.load_full()?;

        let embedding = match self.embed(vec![text.to_string()]).await {
            Ok(output) => output.embeddings.into_iter().next()?,
            Err(e) => {
                warn!(error = %e, "K-lens detection failed");
                return None;
            }
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding K-lens detection from before reset");
            return None;
        }

        if embedding.len() != centroids.light.len() {
            warn!(
                expected = centroids.light.len(),
                actual = embedding.len(),
                "K-lens detection dimension mismatch"
            );
            return None;
        }

        let query = l2_normalize(&embedding);
        Some(nearest_centroid(&query, &centroids))
    }

    /// Whether calibrated centroids are published.
    pub fn is_ready(&self) -> bool {
        self.centroids.load().is_some()
    }

    /// Snapshot of the readiness state.
    pub async fn state(&self) -> LensState {
        self.state.lock().await.clone()
    }

    /// Discard centroids and return to idle. In-flight work is invalidated.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.centroids.store(None);
        *state = LensState::default();
        info!("K-lens reset");
    }
}

/// Length shared by every vector in a batch. Empty or ragged batches are rejected.
fn uniform_dimension(vectors: &[Vec<f32>]) -> Result<usize, KStackError> {
    let Some(first) = vectors.first() else {
        return Ok(0);
    };
    let dimension = first.len();
    if dimension == 0 {
        return Err(KStackError::embedding("provider returned an empty embedding"));
    }
    if let Some(other) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(KStackError::embedding(format!(
            "inconsistent embedding dimensions: {dimension} and {}",
            other.len()
        )));
    }
    Ok(dimension)
}

/// Argmax over suit centroids with a -1 sentinel; first-seen wins ties.
fn nearest_centroid(query: &[f32], centroids: &CentroidSet) -> KVector {
    let mut suit_scores = SuitScores::default();
    let mut best_suit = Suit::Clubs;
    let mut best_score = -1.0f32;
    for (suit, centroid) in &centroids.suits {
        let score = cosine_similarity(query, centroid);
        suit_scores.set(*suit, score);
        if score > best_score {
            best_suit = *suit;
            best_score = score;
        }
    }

    let light = cosine_similarity(query, &centroids.light);
    let dark = cosine_similarity(query, &centroids.dark);
    let polarity = if dark > light {
        Polarity::Dark
    } else {
        Polarity::Light
    };

    KVector {
        suit: best_suit,
        polarity,
        suit_score: best_score,
        polarity_score: (light - dark).abs(),
        suit_scores,
    }
}
