// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for K-Stack integration tests.
//!
//! Provides a deterministic embedding adapter so the semantic classifier can
//! be exercised without a running embedding service.
//!
//! # Components
//!
//! - [`MockEmbedder`] - keyword-feature embeddings with failure and latency injection

pub mod mock_embedder;

pub use mock_embedder::MockEmbedder;
