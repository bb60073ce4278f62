// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ordering, non-empty signal lists, and URL schemes.

use crate::diagnostic::ConfigError;
use crate::model::KStackConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &KStackConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.to_lowercase().as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of: {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let routing = &config.routing;
    if routing.template_threshold == 0 {
        fail("routing.template_threshold must be at least 1".to_string());
    }
    if routing.override_threshold < routing.template_threshold {
        fail(format!(
            "routing.override_threshold ({}) must not be below routing.template_threshold ({})",
            routing.override_threshold, routing.template_threshold
        ));
    }
    if routing.escalation_signals.is_empty() {
        fail("routing.escalation_signals must not be empty".to_string());
    }
    for (i, signal) in routing.escalation_signals.iter().enumerate() {
        if signal.trim().is_empty() {
            fail(format!("routing.escalation_signals[{i}] must not be empty"));
        }
    }

    if config.lens.embed_timeout_ms == 0 {
        fail("lens.embed_timeout_ms must be greater than zero".to_string());
    }

    let base_url = config.ollama.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "ollama.base_url `{base_url}` must start with http:// or https://"
        ));
    }
    if config.ollama.embedding_model.trim().is_empty() {
        fail("ollama.embedding_model must not be empty".to_string());
    }

    if let Some(path) = &config.corpus.path {
        if path.trim().is_empty() {
            fail("corpus.path must not be empty when set".to_string());
        }
    }
    if !config.corpus.include_builtin && config.corpus.path.is_none() {
        fail("corpus.include_builtin is false and no corpus.path is set; the corpus would be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&KStackConfig::default()).is_ok());
    }

    #[test]
    fn zero_template_threshold_fails_validation() {
        let mut config = KStackConfig::default();
        config.routing.template_threshold = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "template_threshold"));
    }

    #[test]
    fn override_below_template_threshold_fails_validation() {
        let mut config = KStackConfig::default();
        config.routing.template_threshold = 4;
        config.routing.override_threshold = 3;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "override_threshold"));
    }

    #[test]
    fn empty_escalation_signal_fails_validation() {
        let mut config = KStackConfig::default();
        config.routing.escalation_signals.push("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "escalation_signals[11]"));
    }

    #[test]
    fn bad_base_url_fails_validation() {
        let mut config = KStackConfig::default();
        config.ollama.base_url = "localhost:11434".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "ollama.base_url"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = KStackConfig::default();
        config.agent.log_level = "loud".to_string();
        config.lens.embed_timeout_ms = 0;
        config.corpus.include_builtin = false;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
