// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the classifiers, the matcher, and the adapters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::KStackError;

/// One of the four semantic categories a query can fall into.
///
/// Variant order is the fixed enumeration order used for tie-breaking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Emotional framing.
    Hearts,
    /// Analytical framing.
    Spades,
    /// Material framing.
    Diamonds,
    /// Action framing.
    Clubs,
}

impl Suit {
    /// All suits in enumeration order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Spades, Suit::Diamonds, Suit::Clubs];

    /// Uppercased first letter of the suit name, as used in K-codes.
    pub fn letter(self) -> char {
        match self {
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
        }
    }

    /// Parse a K-code suit letter (case-insensitive).
    pub fn from_letter(c: char) -> Option<Suit> {
        match c.to_ascii_uppercase() {
            'H' => Some(Suit::Hearts),
            'S' => Some(Suit::Spades),
            'D' => Some(Suit::Diamonds),
            'C' => Some(Suit::Clubs),
            _ => None,
        }
    }
}

/// Light/dark valence of a query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Light,
    Dark,
}

impl Polarity {
    /// Both polarities, light first.
    pub const ALL: [Polarity; 2] = [Polarity::Light, Polarity::Dark];

    /// The `+`/`-` tag used by template records and K-codes.
    pub fn sign(self) -> char {
        match self {
            Polarity::Light => '+',
            Polarity::Dark => '-',
        }
    }

    /// Map a `+`/`-` tag to a polarity.
    pub fn from_sign(c: char) -> Option<Polarity> {
        match c {
            '+' => Some(Polarity::Light),
            '-' => Some(Polarity::Dark),
            _ => None,
        }
    }
}

/// Per-suit scores, one slot per suit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SuitScores {
    pub hearts: f32,
    pub spades: f32,
    pub diamonds: f32,
    pub clubs: f32,
}

impl SuitScores {
    /// Score recorded for `suit`.
    pub fn get(&self, suit: Suit) -> f32 {
        match suit {
            Suit::Hearts => self.hearts,
            Suit::Spades => self.spades,
            Suit::Diamonds => self.diamonds,
            Suit::Clubs => self.clubs,
        }
    }

    /// Set the score for `suit`.
    pub fn set(&mut self, suit: Suit, score: f32) {
        match suit {
            Suit::Hearts => self.hearts = score,
            Suit::Spades => self.spades = score,
            Suit::Diamonds => self.diamonds = score,
            Suit::Clubs => self.clubs = score,
        }
    }

    /// Iterate `(suit, score)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Suit, f32)> + '_ {
        Suit::ALL.into_iter().map(|s| (s, self.get(s)))
    }
}

/// The (suit, polarity, confidence) classification of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KVector {
    pub suit: Suit,
    pub polarity: Polarity,
    /// Score of the winning suit (points for keyword, cosine for semantic).
    pub suit_score: f32,
    /// Absolute light/dark margin.
    pub polarity_score: f32,
    pub suit_scores: SuitScores,
}

impl KVector {
    /// Display code for this K-vector with a caller-supplied rank, e.g. `+5H`.
    pub fn code(&self, rank: Rank) -> KCode {
        KCode {
            polarity: self.polarity,
            rank,
            suit: self.suit,
        }
    }
}

impl fmt::Display for KVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (suit {:.2}, polarity {:.2})",
            self.suit, self.polarity, self.suit_score, self.polarity_score
        )
    }
}

/// Which classifier produced a K-vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum KVectorSource {
    Semantic,
    Keyword,
}

/// Card rank used in K-codes. Never computed by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Ace,
    /// Pip ranks 2 through 10.
    Number(u8),
    Jack,
    Queen,
    King,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Ace => f.write_str("A"),
            Rank::Number(n) => write!(f, "{n}"),
            Rank::Jack => f.write_str("J"),
            Rank::Queen => f.write_str("Q"),
            Rank::King => f.write_str("K"),
        }
    }
}

impl FromStr for Rank {
    type Err = KStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(Rank::Ace),
            "J" => Ok(Rank::Jack),
            "Q" => Ok(Rank::Queen),
            "K" => Ok(Rank::King),
            other => match other.parse::<u8>() {
                Ok(n) if (2..=10).contains(&n) => Ok(Rank::Number(n)),
                _ => Err(KStackError::Internal(format!("invalid K-code rank `{s}`"))),
            },
        }
    }
}

/// A K-coordinate such as `+7H` or `-QS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KCode {
    pub polarity: Polarity,
    pub rank: Rank,
    pub suit: Suit,
}

impl fmt::Display for KCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.polarity.sign(), self.rank, self.suit.letter())
    }
}

impl FromStr for KCode {
    type Err = KStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KStackError::Internal(format!("invalid K-code `{s}`"));
        let s = s.trim();
        let mut chars = s.chars();
        let polarity = chars.next().and_then(Polarity::from_sign).ok_or_else(invalid)?;
        let suit = chars.next_back().and_then(Suit::from_letter).ok_or_else(invalid)?;
        let rank = chars.as_str().parse::<Rank>().map_err(|_| invalid())?;
        Ok(KCode {
            polarity,
            rank,
            suit,
        })
    }
}

/// Format a K-vector's display code: `{+|-}{rank}{suitLetter}`.
pub fn format_k_vector(kvector: &KVector, rank: Rank) -> String {
    kvector.code(rank).to_string()
}

/// Named voice variants a template may declare.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Default,
    Cat,
    Dog,
    Turtle,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in input order.
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}
