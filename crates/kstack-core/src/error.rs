// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the K-Stack router.

use thiserror::Error;

/// The primary error type used across K-Stack adapter traits and core operations.
#[derive(Debug, Error)]
pub enum KStackError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Template corpus errors (unreadable file, malformed record, duplicate id).
    #[error("corpus error: {message}")]
    Corpus {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding provider errors (provider down, network failure, bad payload).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KStackError {
    /// Shorthand for an [`KStackError::Embedding`] without an underlying source.
    pub fn embedding(message: impl Into<String>) -> Self {
        KStackError::Embedding {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`KStackError::Corpus`] without an underlying source.
    pub fn corpus(message: impl Into<String>) -> Self {
        KStackError::Corpus {
            message: message.into(),
            source: None,
        }
    }
}
