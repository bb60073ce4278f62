// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and output formatting shared by the subcommands.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use kstack_config::model::KStackConfig;
use kstack_core::{format_k_vector, KStackError, KVector, KVectorSource, Rank, Voice};
use kstack_ollama::OllamaEmbedder;
use kstack_router::{KRouter, RouteResult, SemanticClassifier, TemplateCorpus};
use tracing::{info, warn};

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Never escalate; knowledge questions generate locally.
    pub local: bool,
    /// Skip the semantic classifier entirely.
    pub keyword_only: bool,
    pub voice: Option<Voice>,
}

/// Build the router described by `config`.
///
/// The K-lens is calibrated here when enabled. A failed calibration is
/// logged and the router keeps routing with keyword classification.
pub async fn build_router(
    config: &KStackConfig,
    options: &RouterOptions,
) -> Result<KRouter, KStackError> {
    let corpus = Arc::new(TemplateCorpus::from_config(&config.corpus)?);
    let mut router = KRouter::new(corpus, &config.routing);
    if options.local {
        router = router.with_fully_local(true);
    }
    if let Some(voice) = options.voice {
        router = router.with_voice(voice);
    }

    if options.keyword_only || !config.lens.enabled {
        info!("semantic classification disabled, using keyword signals");
        return Ok(router);
    }

    let timeout = Duration::from_millis(config.lens.embed_timeout_ms);
    let embedder = OllamaEmbedder::new(&config.ollama, timeout)?;
    let lens = Arc::new(SemanticClassifier::new(Arc::new(embedder), timeout));
    if !lens.initialize().await {
        let state = lens.state().await;
        warn!(
            error = state.error.as_deref().unwrap_or("unknown"),
            "K-lens unavailable, falling back to keyword classification"
        );
    }
    Ok(router.with_lens(lens))
}

/// Multi-line description of a routing result.
pub fn format_route(result: &RouteResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "action:  {}", result.action);
    let _ = writeln!(out, "reason:  {}", result.reason);
    if let Some(template) = &result.template {
        let _ = writeln!(out, "template: {} ({})", template.name, template.id);
    }
    if let Some(surface) = &result.surface {
        let _ = writeln!(out, "surface: {surface}");
    }
    out
}

/// One-line description of a K-vector, with its K-code when a rank is given.
pub fn format_classification(kvector: &KVector, source: KVectorSource, rank: Option<Rank>) -> String {
    let mut out = format!("{kvector} via {source}");
    if let Some(rank) = rank {
        let _ = write!(out, " [{}]", format_k_vector(kvector, rank));
    }
    out
}

/// Table of the loaded templates.
pub fn format_templates(corpus: &TemplateCorpus) -> String {
    let mut out = String::new();
    for template in corpus.iter() {
        let tag = match (template.suit, template.polarity) {
            (Some(suit), Some(polarity)) => format!("{}{}", polarity.sign(), suit.letter()),
            (Some(suit), None) => suit.letter().to_string(),
            (None, Some(polarity)) => polarity.sign().to_string(),
            (None, None) => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<20} {:<4} {:<20} {} triggers, {} surfaces",
            template.id,
            tag,
            template.name,
            template.triggers.len(),
            template.surfaces.len()
        );
    }
    let _ = writeln!(out, "{} templates", corpus.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kstack_core::{Polarity, Suit};
    use kstack_router::RouteAction;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn keyword_only() -> RouterOptions {
        RouterOptions {
            keyword_only: true,
            ..RouterOptions::default()
        }
    }

    #[tokio::test]
    async fn keyword_router_routes_greeting() {
        let router = build_router(&KStackConfig::default(), &keyword_only())
            .await
            .unwrap();
        assert!(router.lens().is_none());
        let result = router.route("hi").await;
        assert_eq!(result.action, RouteAction::Template);
        let text = format_route(&result);
        assert!(text.contains("action:  template"));
        assert!(text.contains("greeting"));
    }

    #[tokio::test]
    async fn local_flag_turns_escalation_into_generation() {
        let options = RouterOptions {
            local: true,
            ..keyword_only()
        };
        let router = build_router(&KStackConfig::default(), &options).await.unwrap();
        assert_eq!(router.route("what is entropy").await.action, RouteAction::Generate);
    }

    #[tokio::test]
    async fn unreachable_lens_falls_back_to_keyword() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/version"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut config = KStackConfig::default();
        config.ollama.base_url = server.uri();
        config.lens.embed_timeout_ms = 1000;

        let router = build_router(&config, &RouterOptions::default()).await.unwrap();
        let lens = router.lens().expect("lens attached");
        assert!(!lens.is_ready());
        assert!(lens.state().await.error.is_some());

        let result = router.route("hi").await;
        assert_eq!(result.source, KVectorSource::Keyword);
        assert_eq!(result.action, RouteAction::Template);
    }

    #[tokio::test]
    async fn missing_corpus_file_is_an_error() {
        let mut config = KStackConfig::default();
        config.corpus.path = Some("/nonexistent/kstack-corpus.json".into());
        assert!(build_router(&config, &keyword_only()).await.is_err());
    }

    #[test]
    fn classification_includes_code_when_ranked() {
        let k = KVector {
            suit: Suit::Hearts,
            polarity: Polarity::Light,
            suit_score: 4.0,
            polarity_score: 2.0,
            suit_scores: Default::default(),
        };
        let line = format_classification(&k, KVectorSource::Keyword, Some(Rank::Number(5)));
        assert!(line.ends_with("[+5H]"), "got: {line}");
        assert!(line.contains("via keyword"));
        assert!(!format_classification(&k, KVectorSource::Semantic, None).contains('['));
    }

    #[test]
    fn template_listing_counts_entries() {
        let corpus = TemplateCorpus::builtin().unwrap();
        let listing = format_templates(&corpus);
        assert!(listing.contains("greeting"));
        assert!(listing.contains("+H"));
        assert!(listing.trim_end().ends_with(&format!("{} templates", corpus.len())));
    }
}
