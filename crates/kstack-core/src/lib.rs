// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the K-Stack router.
//!
//! This crate provides the foundational trait definitions, error types, and
//! K-vector types used throughout the K-Stack workspace. Embedding providers
//! implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KStackError;
pub use types::{
    format_k_vector, HealthStatus, KCode, KVector, KVectorSource, Polarity, Rank, Suit,
    SuitScores, Voice,
};

pub use traits::{EmbeddingAdapter, PluginAdapter};
