// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for sentence embedding generation.

use async_trait::async_trait;

use crate::error::KStackError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for generating sentence embeddings from text.
///
/// Embedding adapters power the semantic classifier, which calibrates
/// per-category centroids and classifies queries by nearest centroid.
/// Implementations need not normalize their output; callers do.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates one embedding per input text, in input order.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, KStackError>;
}
