// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the K-Stack router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use kstack_core::Voice;
use serde::{Deserialize, Serialize};

/// Top-level K-Stack configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KStackConfig {
    /// Process identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Decision policy settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Semantic classifier settings.
    #[serde(default)]
    pub lens: LensConfig,

    /// Ollama embedding provider settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Template corpus settings.
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and the shell prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "kstack".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Decision policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Fully-local mode: never escalate, generate locally instead.
    #[serde(default)]
    pub fully_local: bool,

    /// Minimum match score for a template answer when no escalation signal is present.
    #[serde(default = "default_template_threshold")]
    pub template_threshold: u32,

    /// Minimum match score for a template answer to override an escalation signal.
    #[serde(default = "default_override_threshold")]
    pub override_threshold: u32,

    /// Substrings marking a query as needing open-ended knowledge.
    #[serde(default = "default_escalation_signals")]
    pub escalation_signals: Vec<String>,

    /// Seed for surface selection. `None` seeds from OS entropy.
    #[serde(default)]
    pub surface_seed: Option<u64>,

    /// Voice used when rendering template responses.
    #[serde(default)]
    pub voice: Voice,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            fully_local: false,
            template_threshold: default_template_threshold(),
            override_threshold: default_override_threshold(),
            escalation_signals: default_escalation_signals(),
            surface_seed: None,
            voice: Voice::Default,
        }
    }
}

fn default_template_threshold() -> u32 {
    2
}

fn default_override_threshold() -> u32 {
    5
}

/// Default escalation signals.
pub const DEFAULT_ESCALATION_SIGNALS: &[&str] = &[
    "how does",
    "what is",
    "explain",
    "why is",
    "tell me about",
    "define",
    "who is",
    "when did",
    "where is",
    "history of",
    "meaning of",
];

fn default_escalation_signals() -> Vec<String> {
    DEFAULT_ESCALATION_SIGNALS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Semantic classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LensConfig {
    /// Calibrate the semantic classifier at startup. When false, keyword
    /// classification is used for every query.
    #[serde(default = "default_lens_enabled")]
    pub enabled: bool,

    /// Upper bound on a single embedding call, in milliseconds.
    #[serde(default = "default_embed_timeout_ms")]
    pub embed_timeout_ms: u64,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            enabled: default_lens_enabled(),
            embed_timeout_ms: default_embed_timeout_ms(),
        }
    }
}

fn default_lens_enabled() -> bool {
    true
}

fn default_embed_timeout_ms() -> u64 {
    10_000
}

/// Ollama embedding provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Embedding model name, e.g. "all-minilm" or "nomic-embed-text".
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

/// Template corpus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusConfig {
    /// Path to an extra corpus file (`.json` or `.toml`).
    #[serde(default)]
    pub path: Option<String>,

    /// Load the builtin essential templates before `path`.
    #[serde(default = "default_include_builtin")]
    pub include_builtin: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: None,
            include_builtin: default_include_builtin(),
        }
    }
}

fn default_include_builtin() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_defaults_match_policy_constants() {
        let routing = RoutingConfig::default();
        assert!(!routing.fully_local);
        assert_eq!(routing.template_threshold, 2);
        assert_eq!(routing.override_threshold, 5);
        assert_eq!(routing.escalation_signals.len(), 11);
        assert!(routing.escalation_signals.iter().any(|s| s == "what is"));
        assert_eq!(routing.voice, Voice::Default);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: KStackConfig = toml::from_str("").unwrap();
        assert_eq!(config.agent.name, "kstack");
        assert!(config.lens.enabled);
        assert_eq!(config.lens.embed_timeout_ms, 10_000);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert!(config.corpus.include_builtin);
        assert!(config.corpus.path.is_none());
    }

    #[test]
    fn voice_deserializes_lowercase() {
        let config: KStackConfig = toml::from_str("[routing]\nvoice = \"dog\"\n").unwrap();
        assert_eq!(config.routing.voice, Voice::Dog);
    }
}
