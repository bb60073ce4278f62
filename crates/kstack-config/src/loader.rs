// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kstack.toml` > `~/.config/kstack/kstack.toml` > `/etc/kstack/kstack.toml`
//! with environment variable overrides via `KSTACK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KStackConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kstack/kstack.toml` (system-wide)
/// 3. `~/.config/kstack/kstack.toml` (user XDG config)
/// 4. `./kstack.toml` (local directory)
/// 5. `KSTACK_*` environment variables
pub fn load_config() -> Result<KStackConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<KStackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KStackConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KStackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KStackConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KStackConfig::default()))
        .merge(Toml::file("/etc/kstack/kstack.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("kstack/kstack.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("kstack.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `KSTACK_ROUTING_FULLY_LOCAL` must map to `routing.fully_local`,
/// not `routing.fully.local`.
fn env_provider() -> Env {
    Env::prefixed("KSTACK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let mapped = map_env_key(key.as_str());
        mapped.into()
    })
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
fn map_env_key(key: &str) -> String {
    for section in ["agent", "routing", "lens", "ollama", "corpus"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("routing_fully_local"), "routing.fully_local");
        assert_eq!(map_env_key("lens_embed_timeout_ms"), "lens.embed_timeout_ms");
        assert_eq!(map_env_key("ollama_base_url"), "ollama.base_url");
        assert_eq!(map_env_key("agent_log_level"), "agent.log_level");
        assert_eq!(map_env_key("corpus_path"), "corpus.path");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }

    #[test]
    fn env_override_applies() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("KSTACK_ROUTING_FULLY_LOCAL", "true");
            jail.set_env("KSTACK_OLLAMA_EMBEDDING_MODEL", "nomic-embed-text");
            let config = load_config()?;
            assert!(config.routing.fully_local);
            assert_eq!(config.ollama.embedding_model, "nomic-embed-text");
            Ok(())
        });
    }
}
