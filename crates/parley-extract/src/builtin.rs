//! Built-in reference extractors
//!
//! Rule-based extractors shipped with the pipeline:
//! - [`BooleanExtractor`]: yes/no affirmation detection via a locale lexicon
//! - [`LocationExtractor`]: preposition-anchored proper-noun phrases
//!
//! Both are constructed once with static parameters and reused across
//! calls. User-supplied extractors can be registered before or after them.

use async_trait::async_trait;
use regex::Regex;

use parley_core::{Entity, EntityExtractor, NluError, Result};

/// Dimension emitted by [`BooleanExtractor`]
pub const BOOLEAN_DIM: &str = "boolean";

/// Dimension emitted by [`LocationExtractor`]
pub const LOCATION_DIM: &str = "location";

// ============================================================================
// Boolean extractor
// ============================================================================

/// Detects affirmations and negations in a sentence
///
/// Matches against a per-locale lexicon of yes/no words and emits one
/// `"boolean"` entity per match, payload `true` or `false`.
pub struct BooleanExtractor {
    positive: Regex,
    negative: Regex,
}

impl BooleanExtractor {
    /// Build the extractor for a locale; unknown locales use the English
    /// lexicon.
    pub fn new(locale: &str) -> Result<Self> {
        let (yes_words, no_words) = lexicon_for(locale);
        Ok(Self {
            positive: word_list_regex(yes_words)?,
            negative: word_list_regex(no_words)?,
        })
    }
}

fn lexicon_for(locale: &str) -> (&'static [&'static str], &'static [&'static str]) {
    match locale {
        "fr" => (
            &["oui", "ouais", "d'accord", "ok", "carrement"],
            &["non", "jamais", "pas question"],
        ),
        "de" => (&["ja", "klar", "ok", "sicher"], &["nein", "niemals"]),
        _ => (
            &["yes", "yeah", "yep", "sure", "ok", "okay", "absolutely"],
            &["no", "nope", "nah", "never"],
        ),
    }
}

fn word_list_regex(words: &[&str]) -> Result<Regex> {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
        .map_err(|e| NluError::extractor(BOOLEAN_DIM, e.to_string()))
}

#[async_trait]
impl EntityExtractor for BooleanExtractor {
    async fn compute(&self, sentence: &str) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();

        for m in self.positive.find_iter(sentence) {
            entities.push(
                Entity::new(BOOLEAN_DIM, true)
                    .with_body(m.as_str())
                    .with_span(m.start(), m.end()),
            );
        }
        for m in self.negative.find_iter(sentence) {
            entities.push(
                Entity::new(BOOLEAN_DIM, false)
                    .with_body(m.as_str())
                    .with_span(m.start(), m.end()),
            );
        }

        // Two passes over the sentence; restore sentence order.
        entities.sort_by_key(|e| e.start.unwrap_or(0));
        Ok(entities)
    }

    fn name(&self) -> &str {
        BOOLEAN_DIM
    }
}

// ============================================================================
// Location extractor
// ============================================================================

/// Detects location mentions anchored by a spatial preposition
///
/// Matches phrases like "in Paris", "to New York", "near Lake Tahoe" and
/// emits one `"location"` entity per capitalized phrase, payload the
/// phrase text.
pub struct LocationExtractor {
    pattern: Regex,
}

impl LocationExtractor {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(
            r"\b(?:in|at|to|from|near|around)\s+([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*)",
        )
        .map_err(|e| NluError::extractor(LOCATION_DIM, e.to_string()))?;
        Ok(Self { pattern })
    }
}

#[async_trait]
impl EntityExtractor for LocationExtractor {
    async fn compute(&self, sentence: &str) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();

        for captures in self.pattern.captures_iter(sentence) {
            let Some(place) = captures.get(1) else {
                continue;
            };
            entities.push(
                Entity::new(LOCATION_DIM, place.as_str())
                    .with_body(place.as_str())
                    .with_span(place.start(), place.end()),
            );
        }

        Ok(entities)
    }

    fn name(&self) -> &str {
        LOCATION_DIM
    }
}
