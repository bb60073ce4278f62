// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end routing tests with the mock embedder.

use std::sync::Arc;
use std::time::Duration;

use kstack_config::model::{CorpusConfig, RoutingConfig};
use kstack_core::{KVectorSource, Polarity, Suit, Voice};
use kstack_router::lens::CALIBRATION_BATCHES;
use kstack_router::{KRouter, RouteAction, SemanticClassifier, TemplateCorpus, TemplateMatcher};
use kstack_test_utils::MockEmbedder;

fn routing() -> RoutingConfig {
    RoutingConfig {
        surface_seed: Some(11),
        ..RoutingConfig::default()
    }
}

fn builtin() -> Arc<TemplateCorpus> {
    Arc::new(TemplateCorpus::builtin().expect("builtin corpus"))
}

fn lens(embedder: &MockEmbedder) -> Arc<SemanticClassifier> {
    Arc::new(SemanticClassifier::new(
        Arc::new(embedder.clone()),
        Duration::from_secs(5),
    ))
}

#[tokio::test]
async fn hi_routes_to_greeting() {
    let router = KRouter::new(builtin(), &routing());
    let result = router.route("hi").await;
    assert_eq!(result.action, RouteAction::Template);
    assert_eq!(result.template.expect("template").id, "greeting");
    assert!(result.surface.is_some());
}

#[tokio::test]
async fn knowledge_question_escalates_or_generates_by_mode() {
    let remote = KRouter::new(builtin(), &routing());
    assert_eq!(remote.route("what is entropy").await.action, RouteAction::Escalate);

    let local = KRouter::new(builtin(), &routing()).with_fully_local(true);
    assert_eq!(local.route("what is entropy").await.action, RouteAction::Generate);
}

#[tokio::test]
async fn ready_lens_supplies_semantic_kvector() {
    let embedder = MockEmbedder::new();
    let lens = lens(&embedder);
    assert!(lens.initialize().await);

    let router = KRouter::new(builtin(), &routing()).with_lens(Arc::clone(&lens));
    let (kvector, source) = router.detect("I love you").await;
    assert_eq!(source, KVectorSource::Semantic);
    assert_eq!(kvector.suit, Suit::Hearts);
    assert!(kvector.suit_score > 0.5);

    let (kvector, _) = router.detect("I'm stuck and lost").await;
    assert_eq!(kvector.polarity, Polarity::Dark);

    let result = router.route("hello friend").await;
    assert_eq!(result.source, KVectorSource::Semantic);
    assert!(result.reason.contains("semantic"));
}

#[tokio::test]
async fn unready_lens_falls_back_to_keyword() {
    let embedder = MockEmbedder::new();
    let router = KRouter::new(builtin(), &routing()).with_lens(lens(&embedder));
    let (_, source) = router.detect("I love you").await;
    assert_eq!(source, KVectorSource::Keyword);
    assert_eq!(embedder.embed_calls(), 0);
}

#[tokio::test]
async fn failing_lens_falls_back_to_keyword() {
    let embedder = MockEmbedder::new();
    let lens = lens(&embedder);
    assert!(lens.initialize().await);
    embedder.set_failing(true);

    let router = KRouter::new(builtin(), &routing()).with_lens(lens);
    let result = router.route("hi").await;
    assert_eq!(result.source, KVectorSource::Keyword);
    assert_eq!(result.action, RouteAction::Template);
}

#[tokio::test]
async fn slow_lens_times_out_to_keyword() {
    let embedder = MockEmbedder::new();
    let lens = Arc::new(SemanticClassifier::new(
        Arc::new(embedder.clone()),
        Duration::from_millis(50),
    ));
    assert!(lens.initialize().await);

    embedder.set_delay(Duration::from_millis(500));
    let router = KRouter::new(builtin(), &routing()).with_lens(lens);
    assert_eq!(router.detect("I love you").await.1, KVectorSource::Keyword);
}

#[tokio::test]
async fn concurrent_initialize_calibrates_once() {
    let embedder = MockEmbedder::new().with_delay(Duration::from_millis(20));
    let lens = lens(&embedder);

    let (first, second) = tokio::join!(lens.initialize(), lens.initialize());
    assert!(first);
    assert!(!second);
    assert_eq!(embedder.embed_calls(), CALIBRATION_BATCHES);
    assert!(lens.is_ready());
}

#[tokio::test(start_paused = true)]
async fn reset_discards_in_flight_detection() {
    let embedder = MockEmbedder::new().with_delay(Duration::from_millis(30));
    let lens = lens(&embedder);
    assert!(lens.initialize().await);

    let detection = tokio::spawn({
        let lens = Arc::clone(&lens);
        async move { lens.classify("I love you").await }
    });
    tokio::time::sleep(Duration::from_millis(5)).await;
    lens.reset().await;

    assert!(detection.await.expect("join").is_none());
    assert!(!lens.is_ready());
}

#[tokio::test]
async fn voice_variant_is_returned_for_greeting() {
    let router = KRouter::new(builtin(), &routing()).with_voice(Voice::Dog);
    let result = router.route("hello").await;
    assert_eq!(result.surface.as_deref(), Some("HI HI HI! So happy you're here!"));
}

#[test]
fn corpus_file_templates_are_routable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("weather.toml");
    std::fs::write(
        &path,
        r#"
[[templates]]
id = "weather"
name = "Weather"
triggers = ["rain", "umbrella"]
surfaces = ["Looks wet out there."]
suit = "clubs"
polarity = "+"
"#,
    )
    .expect("write corpus");

    let corpus = TemplateCorpus::from_config(&CorpusConfig {
        path: Some(path.display().to_string()),
        include_builtin: true,
    })
    .expect("corpus");
    let router = KRouter::new(Arc::new(corpus), &routing());

    let result = router.route_keyword("rain and umbrella");
    assert_eq!(result.template.expect("template").id, "weather");
    assert_eq!(result.surface.as_deref(), Some("Looks wet out there."));
}

proptest::proptest! {
    #[test]
    fn matcher_is_idempotent(text in "[a-z ']{0,40}") {
        let matcher = TemplateMatcher::new(builtin());
        let k = kstack_router::KeywordClassifier::new().classify(&text);
        let a = matcher.best_match(&text, Some(&k)).map(|c| (c.template.id.clone(), c.score));
        let b = matcher.best_match(&text, Some(&k)).map(|c| (c.template.id.clone(), c.score));
        proptest::prop_assert_eq!(a, b);
    }

    #[test]
    fn routing_never_fails(text in ".{0,80}") {
        let router = KRouter::new(builtin(), &routing());
        let result = router.route_keyword(&text);
        proptest::prop_assert!(!result.reason.is_empty());
        proptest::prop_assert_eq!(result.matched, result.action == RouteAction::Template);
    }
}
