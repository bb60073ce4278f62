// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-signal K-vector classification.
//!
//! Maps text to a suit and polarity using static signal tables. No model,
//! no network, no latency. Always available, and the fallback whenever the
//! semantic classifier is not ready.

use std::collections::HashSet;

use kstack_core::{KVector, Polarity, Suit, SuitScores};

/// Emotional framing signals.
const HEARTS_SIGNALS: &[&str] = &[
    "love", "feel", "feeling", "sad", "happy", "heart", "lonely", "miss", "hurt",
    "grief", "cry", "joy", "afraid", "scared", "angry", "care", "emotion",
];

/// Analytical framing signals.
const SPADES_SIGNALS: &[&str] = &[
    "think", "why", "how", "analyze", "logic", "reason", "calculate", "solve",
    "understand", "explain", "figure", "idea", "question", "math", "proof", "compare",
];

/// Material framing signals.
const DIAMONDS_SIGNALS: &[&str] = &[
    "money", "cost", "price", "buy", "sell", "pay", "rich", "budget", "worth",
    "expensive", "cheap", "gold", "dollar", "profit", "salary", "afford",
];

/// Action framing signals.
const CLUBS_SIGNALS: &[&str] = &[
    "build", "make", "start", "action", "move", "run", "create", "finish", "work",
    "task", "goal", "fix", "plan", "ship", "begin",
];

const LIGHT_SIGNALS: &[&str] = &[
    "hope", "good", "great", "happy", "love", "excited", "ready", "grateful",
    "thanks", "better", "bright", "joy", "glad", "calm", "proud",
];

const DARK_SIGNALS: &[&str] = &[
    "stuck", "lost", "can't", "hate", "bad", "sad", "tired", "overwhelmed",
    "confused", "afraid", "worst", "blocked", "hopeless", "give up", "nothing", "broke",
];

/// Points for a signal equal to a whole query token.
const EXACT_POINTS: u32 = 2;
/// Points for a signal found only as a substring of the query.
const SUBSTRING_POINTS: u32 = 1;

/// Signal table for one suit.
fn suit_signals(suit: Suit) -> &'static [&'static str] {
    match suit {
        Suit::Hearts => HEARTS_SIGNALS,
        Suit::Spades => SPADES_SIGNALS,
        Suit::Diamonds => DIAMONDS_SIGNALS,
        Suit::Clubs => CLUBS_SIGNALS,
    }
}

fn polarity_signals(polarity: Polarity) -> &'static [&'static str] {
    match polarity {
        Polarity::Light => LIGHT_SIGNALS,
        Polarity::Dark => DARK_SIGNALS,
    }
}

/// Heuristic K-vector classifier backed by static signal tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify `text` into a K-vector.
    ///
    /// All-zero suit totals yield clubs; equal positive totals keep the
    /// earliest suit in enumeration order. Polarity ties yield light.
    pub fn classify(&self, text: &str) -> KVector {
        let lower = text.to_lowercase();
        let words: HashSet<&str> = lower.split_whitespace().collect();

        let mut suit_scores = SuitScores::default();
        let mut best_suit = Suit::Clubs;
        let mut best_score = 0u32;
        for suit in Suit::ALL {
            let score = score_signals(&lower, &words, suit_signals(suit));
            suit_scores.set(suit, score as f32);
            if score > best_score {
                best_suit = suit;
                best_score = score;
            }
        }

        let light = score_signals(&lower, &words, polarity_signals(Polarity::Light));
        let dark = score_signals(&lower, &words, polarity_signals(Polarity::Dark));
        let polarity = if dark > light {
            Polarity::Dark
        } else {
            Polarity::Light
        };

        KVector {
            suit: best_suit,
            polarity,
            suit_score: best_score as f32,
            polarity_score: light.abs_diff(dark) as f32,
            suit_scores,
        }
    }
}

/// Sum signal points: exact token match, else substring match.
fn score_signals(lower: &str, words: &HashSet<&str>, signals: &[&str]) -> u32 {
    signals
        .iter()
        .map(|signal| {
            if words.contains(signal) {
                EXACT_POINTS
            } else if lower.contains(signal) {
                SUBSTRING_POINTS
            } else {
                0
            }
        })
        .sum()
}
