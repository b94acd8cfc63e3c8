//! # giftwise-core
//!
//! Deterministic gift-idea normalization and fallback generation.
//!
//! This crate turns loosely structured model output into typed gift ideas
//! and synthesizes ideas without a model when the provider is unavailable.
//!
//! ## Key Guarantees
//!
//! 1. **Never empty**: normalization always returns at least one idea
//! 2. **No LLM calls**: everything here is pure and synchronous
//! 3. **Deterministic fallback**: same inputs always produce the same four ideas
//! 4. **Clean fields**: no code-fence artifacts or outer whitespace survive
//!
//! ## Example
//!
//! ```rust
//! use giftwise_core::{generate_fallback, normalize};
//!
//! let ideas = normalize(r#"[{"title":"Mug","desc":"Warm drinks","budget":"Budget","likeMeter":"70%"}]"#);
//! assert_eq!(ideas[0].title, "Mug");
//!
//! let interests = vec!["Sports".to_string(), "Cooking".to_string()];
//! let fallback = generate_fallback("Birthday", &interests);
//! assert_eq!(fallback.len(), 4);
//! ```

pub mod appeal;
pub mod emoji;
pub mod fallback;
pub mod idea;
pub mod normalizer;
pub mod request;
pub mod samples;
pub mod sanitize;
pub mod saved;

// Re-export main types at crate root
pub use appeal::appeal_percentage;
pub use emoji::gift_emoji;
pub use fallback::{generate_fallback, seed_number, DeterministicFallbackGenerator, FALLBACK_SIZE};
pub use idea::{
    GiftIdea, IdeaId, ALTERNATE_DESCRIPTION, DEFAULT_APPEAL, DEFAULT_BUDGET, DEFAULT_DESCRIPTION,
    DEFAULT_TITLE,
};
pub use normalizer::{normalize, Normalized, ParseLayer, ResponseNormalizer};
pub use request::{GiftRequest, RequestError, MISSING_INPUT_MESSAGE};
pub use samples::sample_ideas;
pub use sanitize::strip_fences;
pub use saved::{SaveOutcome, SavedIdea, SavedIdeas, StoreError, SAVED_IDEAS_KEY};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_then_save() {
        let raw = "```json\n[{\"title\":\"Book\",\"desc\":\"Great read\",\"budget\":\"Mid-range\",\"likeMeter\":\"8\"}]\n```";
        let ideas = normalize(raw);

        let mut saved = SavedIdeas::new();
        assert_eq!(saved.toggle(&ideas[0]), SaveOutcome::Saved);
        assert!(saved.is_saved(&ideas[0]));
        assert_eq!(appeal_percentage(&ideas[0].appeal_score), 80);
    }

    #[test]
    fn test_fallback_for_request() {
        let request = GiftRequest::new("Birthday", ["Sports", "Cooking"]);
        request.validate().unwrap();

        let ideas = generate_fallback(&request.occasion, &request.interests);
        assert_eq!(ideas.len(), FALLBACK_SIZE);
        assert_eq!(ideas, generate_fallback("Birthday", &request.interests));
    }
}
