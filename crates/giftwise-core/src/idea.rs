//! The gift idea record and its derived identity.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sanitize::clean_field;

/// Title used when none can be extracted.
pub const DEFAULT_TITLE: &str = "Gift Idea";

/// Description used by the normalizer when none can be extracted.
pub const DEFAULT_DESCRIPTION: &str = "A perfect gift";

/// Alternate description default for records built outside the normalizer.
pub const ALTERNATE_DESCRIPTION: &str = "Perfect for someone special";

/// Budget tier used when none can be extracted.
pub const DEFAULT_BUDGET: &str = "Mid-range";

/// Appeal score used when none can be extracted.
pub const DEFAULT_APPEAL: &str = "80%";

/// A single gift suggestion.
///
/// Serialized with the keys the prompt asks the model for
/// (`title`, `desc`, `budget`, `likeMeter`). Missing keys take the field
/// defaults when deserializing stored records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GiftIdea {
    /// Short display name of the gift
    #[serde(default = "default_title")]
    pub title: String,

    /// One or two sentences on why it fits
    #[serde(rename = "desc", alias = "description", default = "alternate_description")]
    pub description: String,

    /// Free-form price band ("Budget", "Mid-range", "Luxury", ...)
    #[serde(rename = "budget", alias = "price", default = "default_budget")]
    pub budget_tier: String,

    /// Free-form enjoyment estimate ("8", "85%", "high", ...)
    #[serde(rename = "likeMeter", default = "default_appeal")]
    pub appeal_score: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn alternate_description() -> String {
    ALTERNATE_DESCRIPTION.to_string()
}

fn default_budget() -> String {
    DEFAULT_BUDGET.to_string()
}

fn default_appeal() -> String {
    DEFAULT_APPEAL.to_string()
}

impl GiftIdea {
    /// Create a gift idea from raw parts.
    ///
    /// Every part is cleaned; blank parts take the field default.
    pub fn new(
        title: impl AsRef<str>,
        description: impl AsRef<str>,
        budget_tier: impl AsRef<str>,
        appeal_score: impl AsRef<str>,
    ) -> Self {
        Self {
            title: clean_or(title.as_ref(), DEFAULT_TITLE),
            description: clean_or(description.as_ref(), DEFAULT_DESCRIPTION),
            budget_tier: clean_or(budget_tier.as_ref(), DEFAULT_BUDGET),
            appeal_score: clean_or(appeal_score.as_ref(), DEFAULT_APPEAL),
        }
    }

    /// Return a copy with every field cleaned and defaulted.
    pub fn cleaned(&self) -> Self {
        Self::new(
            &self.title,
            &self.description,
            &self.budget_tier,
            &self.appeal_score,
        )
    }

    /// Stable identity derived from title and description.
    pub fn identity(&self) -> IdeaId {
        IdeaId::derive(&self.title, &self.description)
    }
}

impl Default for GiftIdea {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            budget_tier: DEFAULT_BUDGET.to_string(),
            appeal_score: DEFAULT_APPEAL.to_string(),
        }
    }
}

fn clean_or(value: &str, default: &str) -> String {
    clean_field(value).unwrap_or_else(|| default.to_string())
}

/// Identity of a gift idea, used to deduplicate saved ideas.
///
/// Base64 of `"{title}:{description}"` with non-alphanumerics removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    /// Derive the identity for a title/description pair.
    pub fn derive(title: &str, description: &str) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", title, description));
        Self(encoded.chars().filter(|c| c.is_ascii_alphanumeric()).collect())
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
