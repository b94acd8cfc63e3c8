//! Saved gift ideas.
//!
//! Saved ideas are kept as one JSON blob under [`SAVED_IDEAS_KEY`] in a
//! flat key/value store. On disk the store is a JSON object mapping keys to
//! serialized strings, so other keys in the same file are preserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::idea::{GiftIdea, IdeaId};

/// Storage key for the saved ideas blob.
pub const SAVED_IDEAS_KEY: &str = "savedGiftIdeas";

/// Errors from reading or writing the saved ideas store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access store file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to serialize saved ideas: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A saved idea with its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedIdea {
    #[serde(flatten)]
    pub idea: GiftIdea,

    pub id: IdeaId,

    #[serde(rename = "savedAt", default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

/// Result of toggling an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Removed,
}

/// Ordered list of saved ideas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedIdeas {
    ideas: Vec<SavedIdea>,
}

impl SavedIdeas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a serialized blob. A corrupt blob yields an empty list.
    pub fn from_blob(blob: &str) -> Self {
        match serde_json::from_str(blob) {
            Ok(ideas) => ideas,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse saved gift ideas, starting empty");
                Self::new()
            }
        }
    }

    /// Serialize to the blob stored under [`SAVED_IDEAS_KEY`].
    pub fn to_blob(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load from a key/value store file. A missing file is an empty list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let entries = read_entries(path.as_ref())?;
        Ok(entries
            .get(SAVED_IDEAS_KEY)
            .map(|blob| Self::from_blob(blob))
            .unwrap_or_default())
    }

    /// Write to a key/value store file, keeping any other keys.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let mut entries = read_entries(path)?;
        entries.insert(SAVED_IDEAS_KEY.to_string(), self.to_blob()?);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&entries)?)?;
        tracing::debug!(path = %path.display(), count = self.len(), "Stored saved ideas");
        Ok(())
    }

    /// Save the idea, or remove it if it is already saved.
    pub fn toggle(&mut self, idea: &GiftIdea) -> SaveOutcome {
        let cleaned = idea.cleaned();
        let id = cleaned.identity();

        let before = self.ideas.len();
        self.ideas.retain(|saved| !matches(saved, &id, &cleaned));

        if self.ideas.len() < before {
            SaveOutcome::Removed
        } else {
            self.ideas.push(SavedIdea {
                idea: cleaned,
                id,
                saved_at: Utc::now(),
            });
            SaveOutcome::Saved
        }
    }

    /// Whether the idea is saved, by identity or by title and description.
    pub fn is_saved(&self, idea: &GiftIdea) -> bool {
        let cleaned = idea.cleaned();
        let id = cleaned.identity();
        self.ideas.iter().any(|saved| matches(saved, &id, &cleaned))
    }

    /// Remove the idea with the given identity.
    pub fn remove(&mut self, id: &IdeaId) -> bool {
        let before = self.ideas.len();
        self.ideas.retain(|saved| &saved.id != id);
        self.ideas.len() < before
    }

    pub fn clear(&mut self) {
        self.ideas.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedIdea> {
        self.ideas.iter()
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }
}

fn matches(saved: &SavedIdea, id: &IdeaId, idea: &GiftIdea) -> bool {
    &saved.id == id
        || (saved.idea.title == idea.title && saved.idea.description == idea.description)
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&contents)?)
}
