// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scored template matching over the corpus.

use std::collections::HashSet;
use std::sync::Arc;

use kstack_core::KVector;

use crate::corpus::{Template, TemplateCorpus};

/// Points for a trigger equal to a whole query token.
const TRIGGER_TOKEN_POINTS: u32 = 3;
/// Points for a trigger found only as a substring of the query.
const TRIGGER_SUBSTRING_POINTS: u32 = 1;
/// Points for the template name appearing in the query.
const NAME_POINTS: u32 = 2;
const SUIT_POINTS: u32 = 2;
const POLARITY_POINTS: u32 = 1;

/// The best-scoring template for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub template: Arc<Template>,
    pub score: u32,
}

/// Scores every template in a corpus against a query.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    corpus: Arc<TemplateCorpus>,
}

impl TemplateMatcher {
    pub fn new(corpus: Arc<TemplateCorpus>) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &TemplateCorpus {
        &self.corpus
    }

    /// Highest-scoring template, or `None` when every template scores zero.
    ///
    /// A later template replaces the incumbent only with a strictly greater
    /// score, so ties keep corpus order.
    pub fn best_match(&self, text: &str, kvector: Option<&KVector>) -> Option<MatchCandidate> {
        let lower = text.to_lowercase();
        let words: HashSet<&str> = lower.split_whitespace().collect();

        let mut best: Option<MatchCandidate> = None;
        for template in self.corpus.iter() {
            let score = score_template(template, &lower, &words, kvector);
            if score == 0 {
                continue;
            }
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(MatchCandidate {
                    template: Arc::clone(template),
                    score,
                });
            }
        }
        best
    }
}

/// Score a single template against a lowercased query.
pub fn score_template(
    template: &Template,
    lower: &str,
    words: &HashSet<&str>,
    kvector: Option<&KVector>,
) -> u32 {
    let mut score = 0;

    for trigger in &template.triggers {
        if words.contains(trigger.as_str()) {
            score += TRIGGER_TOKEN_POINTS;
        } else if lower.contains(trigger.as_str()) {
            score += TRIGGER_SUBSTRING_POINTS;
        }
    }

    if lower.contains(&template.name.to_lowercase()) {
        score += NAME_POINTS;
    }

    if let Some(k) = kvector {
        if template.suit == Some(k.suit) {
            score += SUIT_POINTS;
        }
        if template.polarity == Some(k.polarity) {
            score += POLARITY_POINTS;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use kstack_core::{Polarity, Suit, SuitScores};

    fn matcher() -> TemplateMatcher {
        TemplateMatcher::new(Arc::new(TemplateCorpus::builtin().unwrap()))
    }

    fn kv(suit: Suit, polarity: Polarity) -> KVector {
        KVector {
            suit,
            polarity,
            suit_score: 0.0,
            polarity_score: 0.0,
            suit_scores: SuitScores::default(),
        }
    }

    #[test]
    fn whole_token_trigger_scores_three() {
        let m = matcher();
        let greeting = m.corpus().get("greeting").unwrap();
        let words: HashSet<&str> = ["hi"].into_iter().collect();
        assert!(score_template(greeting, "hi", &words, None) >= 3);
    }

    #[test]
    fn hi_matches_greeting() {
        let best = matcher().best_match("hi", None).unwrap();
        assert_eq!(best.template.id, "greeting");
        assert_eq!(best.score, 3);
    }

    #[test]
    fn substring_trigger_scores_one() {
        let corpus = TemplateCorpus::from_json_str(
            r#"[{"block_id": "rain", "name": "Weather", "triggers": ["rain"]}]"#,
        )
        .unwrap();
        let best = TemplateMatcher::new(Arc::new(corpus))
            .best_match("it is raining", None)
            .unwrap();
        assert_eq!(best.score, 1);
    }

    #[test]
    fn name_substring_scores_two() {
        let corpus = TemplateCorpus::from_json_str(
            r#"[{"block_id": "w", "name": "Weather", "triggers": []}]"#,
        )
        .unwrap();
        let best = TemplateMatcher::new(Arc::new(corpus))
            .best_match("any WEATHER today", None)
            .unwrap();
        assert_eq!(best.score, 2);
    }

    #[test]
    fn kvector_adds_suit_and_polarity_points() {
        let corpus = TemplateCorpus::from_json_str(
            r#"[{"block_id": "a", "name": "Alpha", "triggers": ["zzz"], "suit": "spades", "polarity": "-"}]"#,
        )
        .unwrap();
        let m = TemplateMatcher::new(Arc::new(corpus));
        let both = m.best_match("q", Some(&kv(Suit::Spades, Polarity::Dark))).unwrap();
        assert_eq!(both.score, 3);
        let suit_only = m.best_match("q", Some(&kv(Suit::Spades, Polarity::Light))).unwrap();
        assert_eq!(suit_only.score, 2);
        assert!(m.best_match("q", Some(&kv(Suit::Hearts, Polarity::Light))).is_none());
    }

    #[test]
    fn ties_keep_first_template() {
        let corpus = TemplateCorpus::from_json_str(
            r#"[
                {"block_id": "first", "name": "First", "triggers": ["same"]},
                {"block_id": "second", "name": "Second", "triggers": ["same"]}
            ]"#,
        )
        .unwrap();
        let best = TemplateMatcher::new(Arc::new(corpus))
            .best_match("same", None)
            .unwrap();
        assert_eq!(best.template.id, "first");
    }

    #[test]
    fn no_match_returns_none() {
        assert!(matcher().best_match("qqqq zzzz", None).is_none());
    }

    #[test]
    fn empty_corpus_returns_none() {
        let m = TemplateMatcher::new(Arc::new(TemplateCorpus::default()));
        assert!(m.best_match("hi", None).is_none());
    }

    #[test]
    fn matching_is_idempotent() {
        let m = matcher();
        let k = kv(Suit::Hearts, Polarity::Light);
        for text in ["hi", "thanks so much", "what can you do", "bye now", ""] {
            let a = m.best_match(text, Some(&k));
            let b = m.best_match(text, Some(&k));
            assert_eq!(
                a.as_ref().map(|c| (c.template.id.as_str(), c.score)),
                b.as_ref().map(|c| (c.template.id.as_str(), c.score)),
            );
        }
    }
}
