//! Deterministic fallback generation.
//!
//! Used in place of the model when the provider is rate limited. The
//! output is a pure function of `(occasion, interests)`: the seed is the
//! sum of the UTF-16 code units of `occasion + interests.join("+")`, and
//! each template slot indexes fixed word tables with `seed + slot`.

use crate::idea::{GiftIdea, DEFAULT_APPEAL};

/// Number of ideas the fallback always produces.
pub const FALLBACK_SIZE: usize = 4;

/// Descriptive words for fallback titles.
pub const ADJECTIVES: [&str; 10] = [
    "Premium",
    "Ultimate",
    "Luxury",
    "Classic",
    "Essential",
    "Custom",
    "Artisan",
    "Signature",
    "Handcrafted",
    "Elite",
];

/// Price tiers for fallback ideas.
pub const PRICE_TIERS: [&str; 4] = [
    "Budget-friendly ($20-$50)",
    "Mid-range ($50-$150)",
    "Premium ($150-$300)",
    "Luxury ($300+)",
];

/// Produces gift ideas without calling any external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicFallbackGenerator;

impl DeterministicFallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate exactly four ideas for the given inputs.
    pub fn generate(&self, occasion: &str, interests: &[String]) -> [GiftIdea; FALLBACK_SIZE] {
        let seed = seed_number(occasion, interests);
        let occasion = occasion.to_lowercase();
        let first = interest_at(interests, 0);
        let second = interest_at(interests, 1);

        [
            GiftIdea::new(
                format!("{} {}", adjective(seed, 0), first.unwrap_or("Gift")),
                format!(
                    "Perfect for {} celebrations, this gift combines their love of {} with practicality. \
                     It's thoughtfully designed to bring joy for years to come.",
                    occasion,
                    first.unwrap_or("special things")
                ),
                price_tier(seed, 0),
                DEFAULT_APPEAL,
            ),
            GiftIdea::new(
                format!("{} Experience", adjective(seed, 1)),
                format!(
                    "This unique {}-based experience creates lasting memories. \
                     It's the perfect way to celebrate {} with something meaningful.",
                    second.or(first).unwrap_or("interest"),
                    occasion
                ),
                price_tier(seed, 1),
                DEFAULT_APPEAL,
            ),
            GiftIdea::new(
                format!("Curated {} Collection", first.unwrap_or("Gift")),
                format!(
                    "A hand-selected assortment of premium items related to their passion for {}. \
                     Each piece is chosen for quality and enjoyment.",
                    first.unwrap_or("interests")
                ),
                price_tier(seed, 2),
                DEFAULT_APPEAL,
            ),
            GiftIdea::new(
                format!("Personalized {} Kit", second.unwrap_or("Gift")),
                format!(
                    "Customized specifically for their unique taste and love of {}. \
                     This thoughtful gift shows how well you know them.",
                    second.or(first).unwrap_or("special interests")
                ),
                price_tier(seed, 3),
                DEFAULT_APPEAL,
            ),
        ]
    }
}

/// Generate fallback ideas with the default generator.
pub fn generate_fallback(occasion: &str, interests: &[String]) -> [GiftIdea; FALLBACK_SIZE] {
    DeterministicFallbackGenerator::new().generate(occasion, interests)
}

/// The seed string: occasion followed by the `+`-joined interests.
pub fn seed_string(occasion: &str, interests: &[String]) -> String {
    format!("{}{}", occasion, interests.join("+"))
}

/// Sum of the UTF-16 code units of the seed string.
pub fn seed_number(occasion: &str, interests: &[String]) -> u64 {
    seed_string(occasion, interests)
        .encode_utf16()
        .map(u64::from)
        .sum()
}

fn adjective(seed: u64, slot: u64) -> &'static str {
    ADJECTIVES[((seed + slot) % ADJECTIVES.len() as u64) as usize]
}

fn price_tier(seed: u64, slot: u64) -> &'static str {
    PRICE_TIERS[((seed + slot) % PRICE_TIERS.len() as u64) as usize]
}

/// Interest at `index`; blank entries count as missing.
fn interest_at(interests: &[String], index: usize) -> Option<&str> {
    interests
        .get(index)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
