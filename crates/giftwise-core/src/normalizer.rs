//! Normalization of raw model text into gift ideas.
//!
//! The model is asked for a JSON array but nothing guarantees it. The
//! normalizer runs an ordered chain of parse attempts, each more permissive
//! and less structured than the last, and stops at the first one that
//! yields ideas:
//!
//! 1. Direct JSON: the whole (fence-stripped) text is an array
//! 2. Embedded JSON: an array of objects somewhere inside prose
//! 3. Numbered sections: `1.`/`2.` prose with one field per line
//! 4. Samples: the built-in sample set
//!
//! Normalization never fails and never returns an empty list.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::idea::{GiftIdea, DEFAULT_APPEAL, DEFAULT_BUDGET};
use crate::samples::sample_ideas;
use crate::sanitize::{clean_field, contains_keyword, strip_fences, LIST_MARKER_PATTERN};

/// Keywords identifying the budget line of a numbered section.
const BUDGET_KEYWORDS: &[&str] = &["budget", "price", "range"];

/// Keywords identifying the appeal line of a numbered section.
const APPEAL_KEYWORDS: &[&str] = &["like", "meter", "rating"];

/// Lines a numbered section needs before it counts as an idea.
const MIN_SECTION_LINES: usize = 3;

/// Which layer of the chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseLayer {
    DirectJson,
    EmbeddedJson,
    NumberedSections,
    Samples,
}

impl ParseLayer {
    /// Whether the ideas came out of the model text (not the samples).
    pub fn is_extracted(&self) -> bool {
        !matches!(self, ParseLayer::Samples)
    }
}

/// Ideas plus the layer that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalized {
    pub ideas: Vec<GiftIdea>,
    pub layer: ParseLayer,
}

/// A single parse attempt over fence-stripped text.
type Attempt = fn(&str) -> Option<Vec<GiftIdea>>;

/// Extraction layers in the order they are tried.
const ATTEMPTS: [(ParseLayer, Attempt); 3] = [
    (ParseLayer::DirectJson, parse_direct_json),
    (ParseLayer::EmbeddedJson, parse_embedded_json),
    (ParseLayer::NumberedSections, parse_numbered_sections),
];

/// Converts raw model output into gift ideas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw text into at least one gift idea.
    pub fn normalize(&self, raw_text: &str) -> Vec<GiftIdea> {
        self.normalize_detailed(raw_text).ideas
    }

    /// Normalize raw text, reporting which layer produced the ideas.
    pub fn normalize_detailed(&self, raw_text: &str) -> Normalized {
        let cleaned = strip_fences(raw_text);

        for (layer, attempt) in ATTEMPTS {
            if let Some(ideas) = attempt(&cleaned) {
                tracing::debug!(layer = ?layer, count = ideas.len(), "Normalized model output");
                return Normalized { ideas, layer };
            }
        }

        tracing::info!(
            length = raw_text.len(),
            "No extractable ideas in model output, using samples"
        );
        Normalized {
            ideas: sample_ideas(),
            layer: ParseLayer::Samples,
        }
    }
}

/// Normalize raw text with the default normalizer.
pub fn normalize(raw_text: &str) -> Vec<GiftIdea> {
    ResponseNormalizer::new().normalize(raw_text)
}

fn parse_direct_json(text: &str) -> Option<Vec<GiftIdea>> {
    if !(text.starts_with('[') && text.ends_with(']')) {
        return None;
    }
    parse_idea_array(text)
}

fn parse_embedded_json(text: &str) -> Option<Vec<GiftIdea>> {
    let start = text.find("[{")?;
    let end = text.rfind("}]")? + 2;
    if start >= end {
        return None;
    }
    parse_idea_array(&text[start..end])
}

fn parse_idea_array(json: &str) -> Option<Vec<GiftIdea>> {
    let value: JsonValue = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse JSON array");
            return None;
        }
    };

    match value.as_array() {
        Some(items) if !items.is_empty() => Some(items.iter().map(idea_from_value).collect()),
        _ => {
            tracing::debug!("JSON is not a non-empty array");
            None
        }
    }
}

/// Map one array element to an idea, applying field fallbacks.
fn idea_from_value(value: &JsonValue) -> GiftIdea {
    let Some(object) = value.as_object() else {
        return GiftIdea::default();
    };

    let field = |keys: &[&str]| -> String {
        keys.iter()
            .find_map(|key| object.get(*key).and_then(field_text))
            .unwrap_or_default()
    };

    GiftIdea::new(
        field(&["title"]),
        field(&["desc", "description"]),
        field(&["budget", "price"]),
        field(&["likeMeter"]),
    )
}

/// Text of a scalar field; null and blank strings count as absent.
fn field_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => clean_field(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_numbered_sections(text: &str) -> Option<Vec<GiftIdea>> {
    let ideas: Vec<GiftIdea> = LIST_MARKER_PATTERN
        .split(text)
        .filter_map(idea_from_section)
        .collect();

    if ideas.is_empty() {
        None
    } else {
        Some(ideas)
    }
}

// Keyword matching is heuristic: a description mentioning "price" will be
// picked up as the budget line.
fn idea_from_section(section: &str) -> Option<GiftIdea> {
    let lines: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < MIN_SECTION_LINES {
        return None;
    }

    let budget = lines
        .iter()
        .find(|line| contains_keyword(line, BUDGET_KEYWORDS))
        .copied()
        .unwrap_or(DEFAULT_BUDGET);
    let appeal = lines
        .iter()
        .find(|line| contains_keyword(line, APPEAL_KEYWORDS))
        .copied()
        .unwrap_or(DEFAULT_APPEAL);

    Some(GiftIdea::new(lines[0], lines[1], budget, appeal))
}
