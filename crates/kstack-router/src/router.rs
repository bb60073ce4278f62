// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template-first query router.
//!
//! Produces a K-vector (semantic when the K-lens is ready, keyword
//! otherwise), scores the corpus, and resolves the routing action.

use std::sync::{Arc, Mutex, PoisonError};

use kstack_config::model::RoutingConfig;
use kstack_core::{KVector, KVectorSource, Voice};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::classifier::KeywordClassifier;
use crate::corpus::{Template, TemplateCorpus};
use crate::lens::SemanticClassifier;
use crate::matcher::TemplateMatcher;
use crate::policy::{DecisionPolicy, DecisionRule, RouteAction};

/// Result of routing one query.
#[derive(Debug, Clone)]
pub struct RouteResult {
    /// True when the action is [`RouteAction::Template`].
    pub matched: bool,
    /// The chosen template, present only for template actions.
    pub template: Option<Arc<Template>>,
    /// Response text, present only for template actions.
    pub surface: Option<String>,
    /// Best match score (0 when nothing matched).
    pub score: u32,
    pub action: RouteAction,
    pub rule: DecisionRule,
    pub reason: String,
    pub kvector: KVector,
    pub source: KVectorSource,
}

/// The K-Stack router.
#[derive(Debug)]
pub struct KRouter {
    keyword: KeywordClassifier,
    lens: Option<Arc<SemanticClassifier>>,
    matcher: TemplateMatcher,
    policy: DecisionPolicy,
    voice: Voice,
    rng: Mutex<StdRng>,
}

impl KRouter {
    /// Build a router over `corpus` with keyword classification only.
    ///
    /// Surface selection is reproducible when `surface_seed` is set.
    pub fn new(corpus: Arc<TemplateCorpus>, config: &RoutingConfig) -> Self {
        let rng = match config.surface_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            keyword: KeywordClassifier::new(),
            lens: None,
            matcher: TemplateMatcher::new(corpus),
            policy: DecisionPolicy::new(config),
            voice: config.voice,
            rng: Mutex::new(rng),
        }
    }

    /// Attach a semantic classifier, used whenever it is ready.
    pub fn with_lens(mut self, lens: Arc<SemanticClassifier>) -> Self {
        self.lens = Some(lens);
        self
    }

    pub fn with_fully_local(mut self, fully_local: bool) -> Self {
        self.policy = self.policy.with_fully_local(fully_local);
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    pub fn lens(&self) -> Option<&Arc<SemanticClassifier>> {
        self.lens.as_ref()
    }

    pub fn corpus(&self) -> &TemplateCorpus {
        self.matcher.corpus()
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// K-vector for `text`: semantic if the K-lens is ready and answers,
    /// keyword otherwise.
    pub async fn detect(&self, text: &str) -> (KVector, KVectorSource) {
        if let Some(lens) = self.lens.as_ref().filter(|l| l.is_ready()) {
            if let Some(kvector) = lens.classify(text).await {
                return (kvector, KVectorSource::Semantic);
            }
            debug!("K-lens unavailable, using keyword classification");
        }
        (self.keyword.classify(text), KVectorSource::Keyword)
    }

    /// Keyword-only K-vector for `text`.
    pub fn detect_keyword(&self, text: &str) -> KVector {
        self.keyword.classify(text)
    }

    /// Route `text`. Never fails.
    pub async fn route(&self, text: &str) -> RouteResult {
        let (kvector, source) = self.detect(text).await;
        self.resolve(text, kvector, source)
    }

    /// Route `text` with the keyword classifier only. Never suspends.
    pub fn route_keyword(&self, text: &str) -> RouteResult {
        let kvector = self.keyword.classify(text);
        self.resolve(text, kvector, KVectorSource::Keyword)
    }

    /// Surface for `text` when it routes to a template, `None` otherwise.
    pub async fn quick_route(&self, text: &str) -> Option<String> {
        let result = self.route(text).await;
        if result.matched { result.surface } else { None }
    }

    /// Response from `template` in `voice`.
    ///
    /// The default voice draws a surface (or `[No surface available]`); a
    /// named voice uses its declared line and falls back to a surface.
    pub fn response(&self, template: &Template, voice: Voice) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        match voice {
            Voice::Default => template.pick_surface(&mut *rng).to_string(),
            voice => template.response(voice, &mut *rng).to_string(),
        }
    }

    fn resolve(&self, text: &str, kvector: KVector, source: KVectorSource) -> RouteResult {
        let best = self.matcher.best_match(text, Some(&kvector));
        let decision = self.policy.decide(text, best.as_ref(), &kvector, source);

        let (template, surface) = match (decision.action, best.as_ref()) {
            (RouteAction::Template, Some(b)) => {
                let surface = self.response(&b.template, self.voice);
                (Some(Arc::clone(&b.template)), Some(surface))
            }
            _ => (None, None),
        };

        let score = best.as_ref().map_or(0, |b| b.score);
        debug!(
            action = %decision.action,
            rule = %decision.rule,
            score,
            template = template.as_ref().map(|t| t.id.as_str()),
            kvector = %kvector,
            source = %source,
            "routed query"
        );

        RouteResult {
            matched: template.is_some(),
            template,
            surface,
            score,
            action: decision.action,
            rule: decision.rule,
            reason: decision.reason,
            kvector,
            source,
        }
    }
}
