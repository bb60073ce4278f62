// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decision policy: template, generate, or escalate.
//!
//! Knowledge questions (queries containing an escalation signal) go to the
//! remote model unless a template matches strongly enough to override, or
//! the router runs fully local. Everything else uses a template when the
//! best match clears the template threshold and generates locally otherwise.

use kstack_config::model::RoutingConfig;
use kstack_core::{KVector, KVectorSource};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::matcher::MatchCandidate;

/// Final routing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RouteAction {
    /// Answer from the template corpus.
    Template,
    /// Hand off to local generation.
    Generate,
    /// Hand off to the remote model.
    Escalate,
}

/// Which policy rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DecisionRule {
    /// Knowledge question, but a template scored at or above the override threshold.
    KnowledgeOverride,
    /// Knowledge question in fully-local mode.
    KnowledgeLocal,
    /// Knowledge question with remote escalation allowed.
    KnowledgeEscalate,
    /// Best match cleared the template threshold.
    TemplateMatch,
    /// Nothing cleared the threshold.
    Fallback,
}

/// Outcome of the policy for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: RouteAction,
    pub rule: DecisionRule,
    pub reason: String,
}

/// Tiered routing policy built from `[routing]` configuration.
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    fully_local: bool,
    template_threshold: u32,
    override_threshold: u32,
    escalation_signals: Vec<String>,
}

impl DecisionPolicy {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            fully_local: config.fully_local,
            template_threshold: config.template_threshold,
            override_threshold: config.override_threshold,
            escalation_signals: config
                .escalation_signals
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }

    /// Same policy with the operating mode replaced.
    pub fn with_fully_local(mut self, fully_local: bool) -> Self {
        self.fully_local = fully_local;
        self
    }

    pub fn fully_local(&self) -> bool {
        self.fully_local
    }

    /// First escalation signal contained in `text`, if any.
    pub fn escalation_signal(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.escalation_signals
            .iter()
            .find(|signal| lower.contains(signal.as_str()))
            .map(String::as_str)
    }

    /// Resolve the action for a query. Total: never fails, including on `""`.
    pub fn decide(
        &self,
        text: &str,
        best: Option<&MatchCandidate>,
        kvector: &KVector,
        source: KVectorSource,
    ) -> Decision {
        let score = best.map_or(0, |b| b.score);
        let k = format!("[{source} {kvector}]");

        if let Some(signal) = self.escalation_signal(text) {
            if let Some(b) = best.filter(|b| b.score >= self.override_threshold) {
                return Decision {
                    action: RouteAction::Template,
                    rule: DecisionRule::KnowledgeOverride,
                    reason: format!(
                        "Knowledge question (\"{signal}\") answered by \"{}\" (score: {} >= {}) {k}",
                        b.template.name, b.score, self.override_threshold
                    ),
                };
            }
            if self.fully_local {
                return Decision {
                    action: RouteAction::Generate,
                    rule: DecisionRule::KnowledgeLocal,
                    reason: format!(
                        "Knowledge question (\"{signal}\"), fully local: generating (score: {score}) {k}"
                    ),
                };
            }
            return Decision {
                action: RouteAction::Escalate,
                rule: DecisionRule::KnowledgeEscalate,
                reason: format!(
                    "Knowledge question (\"{signal}\"), escalating (score: {score}) {k}"
                ),
            };
        }

        match best.filter(|b| b.score >= self.template_threshold) {
            Some(b) => Decision {
                action: RouteAction::Template,
                rule: DecisionRule::TemplateMatch,
                reason: format!("Matched \"{}\" (score: {}) {k}", b.template.name, b.score),
            },
            None => Decision {
                action: RouteAction::Generate,
                rule: DecisionRule::Fallback,
                reason: format!(
                    "No template match (score: {score} < {}), falling back to generation {k}",
                    self.template_threshold
                ),
            },
        }
    }
}
