// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template corpus: typed, validated, immutable after load.
//!
//! Records are read from JSON (a top-level array) or TOML (`[[templates]]`)
//! exports. Extra fields in the exports are ignored; suits, polarities, and
//! identifiers are validated once here so the matcher never sees a malformed
//! record.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use kstack_config::model::CorpusConfig;
use kstack_core::{KStackError, Polarity, Suit, Voice};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info};

/// Surface returned when the winning template has no surfaces.
pub const NO_SURFACE: &str = "[No surface available]";

/// Response returned for a voice request on a template with no surfaces.
pub const NO_RESPONSE: &str = "[No response available]";

/// Builtin essential templates compiled into the binary.
const BUILTIN_CORPUS: &str = include_str!("../corpus/essentials.json");

/// A single response template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    /// Display name; falls back to `id` when the record has none.
    pub name: String,
    /// Trigger phrases, lowercased.
    pub triggers: Vec<String>,
    pub surfaces: Vec<String>,
    pub suit: Option<Suit>,
    pub polarity: Option<Polarity>,
    pub voices: HashMap<Voice, String>,
}

impl Template {
    /// Uniformly random surface, or [`NO_SURFACE`] when there are none.
    pub fn pick_surface<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.surfaces
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(NO_SURFACE)
    }

    /// Response in the requested voice.
    ///
    /// A declared voice line wins; otherwise a random surface is drawn, and
    /// [`NO_RESPONSE`] is returned when the template has no surfaces.
    pub fn response<R: Rng + ?Sized>(&self, voice: Voice, rng: &mut R) -> &str {
        if let Some(line) = self.voices.get(&voice) {
            return line;
        }
        self.surfaces
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(NO_RESPONSE)
    }
}

/// Raw record as found in corpus exports.
#[derive(Debug, Deserialize)]
struct TemplateRecord {
    #[serde(alias = "id")]
    block_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    triggers: Vec<String>,
    #[serde(default)]
    surfaces: Vec<String>,
    #[serde(default)]
    suit: Option<String>,
    #[serde(default)]
    polarity: Option<String>,
    #[serde(default)]
    cat_voice: Option<String>,
    #[serde(default)]
    dog_voice: Option<String>,
    #[serde(default)]
    turtle_voice: Option<String>,
}

impl TryFrom<TemplateRecord> for Template {
    type Error = KStackError;

    fn try_from(record: TemplateRecord) -> Result<Self, Self::Error> {
        let id = record.block_id.trim().to_string();
        if id.is_empty() {
            return Err(KStackError::corpus("template identifier must not be empty"));
        }

        let name = match record.name.trim() {
            "" => id.clone(),
            name => name.to_string(),
        };

        let mut triggers = Vec::with_capacity(record.triggers.len());
        for trigger in record.triggers {
            let trigger = trigger.trim().to_lowercase();
            if trigger.is_empty() {
                return Err(KStackError::corpus(format!(
                    "template `{id}` has an empty trigger"
                )));
            }
            triggers.push(trigger);
        }

        let suit = record
            .suit
            .as_deref()
            .map(|s| {
                s.trim().parse::<Suit>().map_err(|_| {
                    KStackError::corpus(format!("template `{id}` has unknown suit `{s}`"))
                })
            })
            .transpose()?;

        let polarity = record
            .polarity
            .as_deref()
            .map(|p| {
                let mut chars = p.trim().chars();
                match (chars.next().and_then(Polarity::from_sign), chars.next()) {
                    (Some(polarity), None) => Ok(polarity),
                    _ => Err(KStackError::corpus(format!(
                        "template `{id}` has invalid polarity `{p}` (expected `+` or `-`)"
                    ))),
                }
            })
            .transpose()?;

        let voices = [
            (Voice::Cat, record.cat_voice),
            (Voice::Dog, record.dog_voice),
            (Voice::Turtle, record.turtle_voice),
        ]
        .into_iter()
        .filter_map(|(voice, line)| line.map(|l| (voice, l)))
        .collect();

        Ok(Template {
            id,
            name,
            triggers,
            surfaces: record.surfaces,
            suit,
            polarity,
            voices,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TomlCorpus {
    #[serde(default)]
    templates: Vec<TemplateRecord>,
}

/// Immutable, ordered template corpus.
///
/// Order matters: the matcher keeps the first-seen template on score ties.
#[derive(Debug, Clone, Default)]
pub struct TemplateCorpus {
    templates: Vec<Arc<Template>>,
}

impl TemplateCorpus {
    /// Build a corpus from already-typed templates, rejecting duplicate ids.
    pub fn new(templates: Vec<Template>) -> Result<Self, KStackError> {
        let mut corpus = Self::default();
        corpus.extend(templates)?;
        Ok(corpus)
    }

    /// The builtin essential templates.
    pub fn builtin() -> Result<Self, KStackError> {
        Self::from_json_str(BUILTIN_CORPUS)
    }

    /// Parse a JSON array of template records.
    pub fn from_json_str(json: &str) -> Result<Self, KStackError> {
        let records: Vec<TemplateRecord> =
            serde_json::from_str(json).map_err(|e| KStackError::Corpus {
                message: format!("failed to parse JSON corpus: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::from_records(records)
    }

    /// Parse a TOML document with a `[[templates]]` array.
    pub fn from_toml_str(content: &str) -> Result<Self, KStackError> {
        let doc: TomlCorpus = toml::from_str(content).map_err(|e| KStackError::Corpus {
            message: format!("failed to parse TOML corpus: {e}"),
            source: Some(Box::new(e)),
        })?;
        Self::from_records(doc.templates)
    }

    /// Load a corpus file, choosing the format by extension (`.toml`, else JSON).
    pub fn load_file(path: &Path) -> Result<Self, KStackError> {
        let content = std::fs::read_to_string(path).map_err(|e| KStackError::Corpus {
            message: format!("failed to read corpus file {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Assemble the corpus described by configuration: builtin first, then the file.
    pub fn from_config(config: &CorpusConfig) -> Result<Self, KStackError> {
        let mut corpus = if config.include_builtin {
            Self::builtin()?
        } else {
            Self::default()
        };

        if let Some(path) = &config.path {
            let extra = Self::load_file(Path::new(path))?;
            debug!(path = path.as_str(), count = extra.len(), "loaded corpus file");
            corpus.extend(extra.templates.iter().map(|t| Template::clone(t)))?;
        }

        info!(templates = corpus.len(), "template corpus loaded");
        Ok(corpus)
    }

    fn from_records(records: Vec<TemplateRecord>) -> Result<Self, KStackError> {
        let templates = records
            .into_iter()
            .map(Template::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(templates)
    }

    fn extend(&mut self, templates: impl IntoIterator<Item = Template>) -> Result<(), KStackError> {
        let mut seen: HashSet<String> = self.templates.iter().map(|t| t.id.clone()).collect();
        for template in templates {
            if !seen.insert(template.id.clone()) {
                return Err(KStackError::corpus(format!(
                    "duplicate template identifier `{}`",
                    template.id
                )));
            }
            self.templates.push(Arc::new(template));
        }
        Ok(())
    }

    /// Look up a template by identifier.
    pub fn get(&self, id: &str) -> Option<&Arc<Template>> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Template>> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn builtin_corpus_loads() {
        let corpus = TemplateCorpus::builtin().unwrap();
        assert!(corpus.len() >= 8);
        let greeting = corpus.get("greeting").unwrap();
        assert_eq!(greeting.name, "Greeting");
        assert_eq!(greeting.suit, Some(Suit::Hearts));
        assert_eq!(greeting.polarity, Some(Polarity::Light));
        assert!(greeting.triggers.iter().any(|t| t == "hi"));
        assert_eq!(greeting.voices.get(&Voice::Turtle).unwrap(), "...hello.");
    }

    #[test]
    fn builtin_archetypes_are_tagged_and_voiced() {
        let corpus = TemplateCorpus::builtin().unwrap();
        let archetypes = [
            "fool", "grief", "enough", "permission", "presence", "return", "seen", "star",
            "strength", "tower", "transition", "trust", "world",
        ];
        assert_eq!(corpus.len(), 8 + archetypes.len());
        for id in archetypes {
            let t = corpus.get(id).unwrap_or_else(|| panic!("missing archetype {id}"));
            assert!(t.suit.is_some() && t.polarity.is_some(), "{id} untagged");
            assert_eq!(t.surfaces.len(), 5, "{id}");
            assert_eq!(t.voices.len(), 3, "{id}");
        }
        assert_eq!(corpus.get("tower").unwrap().polarity, Some(Polarity::Dark));
        assert!(corpus.get("transition").unwrap().triggers.iter().any(|t| t == "not yet"));
    }

    #[test]
    fn dark_polarity_parses() {
        let corpus = TemplateCorpus::builtin().unwrap();
        assert_eq!(corpus.get("dont_know").unwrap().polarity, Some(Polarity::Dark));
    }

    #[test]
    fn extra_fields_are_ignored_and_name_falls_back_to_id() {
        let json = r#"[{"block_id": "tree_yesod", "shadow": "illusion", "triggers": ["Dream"], "surfaces": []}]"#;
        let corpus = TemplateCorpus::from_json_str(json).unwrap();
        let t = corpus.get("tree_yesod").unwrap();
        assert_eq!(t.name, "tree_yesod");
        assert_eq!(t.triggers, vec!["dream"]);
        assert!(t.suit.is_none());
        assert!(t.voices.is_empty());
    }

    #[test]
    fn unknown_suit_is_rejected() {
        let json = r#"[{"block_id": "x", "name": "X", "suit": "cups"}]"#;
        let err = TemplateCorpus::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("unknown suit"));
    }

    #[test]
    fn invalid_polarity_is_rejected() {
        let json = r#"[{"block_id": "x", "name": "X", "polarity": "+-"}]"#;
        assert!(TemplateCorpus::from_json_str(json).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"[{"block_id": "a", "name": "A"}, {"block_id": "a", "name": "B"}]"#;
        let err = TemplateCorpus::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn empty_trigger_is_rejected() {
        let json = r#"[{"block_id": "a", "name": "A", "triggers": ["ok", " "]}]"#;
        assert!(TemplateCorpus::from_json_str(json).is_err());
    }

    #[test]
    fn toml_corpus_parses() {
        let toml = r#"
[[templates]]
id = "weather"
name = "Weather"
triggers = ["rain", "sunny"]
surfaces = ["Bring an umbrella."]
suit = "Diamonds"
polarity = "-"
"#;
        let corpus = TemplateCorpus::from_toml_str(toml).unwrap();
        let t = corpus.get("weather").unwrap();
        assert_eq!(t.suit, Some(Suit::Diamonds));
        assert_eq!(t.polarity, Some(Polarity::Dark));
    }

    #[test]
    fn config_merges_file_after_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.json");
        std::fs::write(
            &path,
            r#"[{"block_id": "weather", "name": "Weather", "triggers": ["rain"], "surfaces": ["Umbrella."]}]"#,
        )
        .unwrap();

        let config = CorpusConfig {
            path: Some(path.display().to_string()),
            include_builtin: true,
        };
        let corpus = TemplateCorpus::from_config(&config).unwrap();
        assert_eq!(corpus.iter().next().unwrap().id, "greeting");
        assert_eq!(corpus.iter().last().unwrap().id, "weather");
    }

    #[test]
    fn file_colliding_with_builtin_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.json");
        std::fs::write(&path, r#"[{"block_id": "greeting", "name": "Hi again"}]"#).unwrap();
        let config = CorpusConfig {
            path: Some(path.display().to_string()),
            include_builtin: true,
        };
        assert!(TemplateCorpus::from_config(&config).is_err());
    }

    #[test]
    fn missing_file_is_a_corpus_error() {
        let err = TemplateCorpus::load_file(Path::new("/nonexistent/corpus.json")).unwrap_err();
        assert!(matches!(err, KStackError::Corpus { .. }));
    }

    #[test]
    fn empty_surfaces_yield_sentinels() {
        let json = r#"[{"block_id": "bare", "name": "Bare", "cat_voice": "*blinks*"}]"#;
        let corpus = TemplateCorpus::from_json_str(json).unwrap();
        let t = corpus.get("bare").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(t.pick_surface(&mut rng), NO_SURFACE);
        assert_eq!(t.response(Voice::Default, &mut rng), NO_RESPONSE);
        assert_eq!(t.response(Voice::Dog, &mut rng), NO_RESPONSE);
        assert_eq!(t.response(Voice::Cat, &mut rng), "*blinks*");
    }

    #[test]
    fn seeded_surface_selection_is_reproducible() {
        let corpus = TemplateCorpus::builtin().unwrap();
        let t = corpus.get("greeting").unwrap();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..8 {
            let surface = t.pick_surface(&mut a);
            assert_eq!(surface, t.pick_surface(&mut b));
            assert!(t.surfaces.iter().any(|s| s == surface));
        }
    }
}
