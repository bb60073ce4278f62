// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template-first query routing for the K-Stack.
//!
//! This crate provides:
//! - [`KeywordClassifier`]: static signal tables, zero-cost, always available
//! - [`SemanticClassifier`]: embedding-centroid classification behind an [`EmbeddingAdapter`](kstack_core::EmbeddingAdapter)
//! - [`TemplateMatcher`]: scores the corpus against the query and K-vector
//! - [`DecisionPolicy`]: resolves template / generate / escalate
//! - [`KRouter`]: ties the above together
//!
//! The router decides before any generation happens; it never produces
//! free text, only selects from the corpus or signals an action.

pub mod classifier;
pub mod corpus;
pub mod lens;
pub mod matcher;
pub mod policy;
pub mod router;
pub mod similarity;

pub use classifier::KeywordClassifier;
pub use corpus::{Template, TemplateCorpus, NO_RESPONSE, NO_SURFACE};
pub use lens::{LensState, SemanticClassifier};
pub use matcher::{MatchCandidate, TemplateMatcher};
pub use policy::{Decision, DecisionPolicy, DecisionRule, RouteAction};
pub use router::{KRouter, RouteResult};
