//! Built-in sample ideas returned when nothing can be extracted.

use crate::idea::GiftIdea;

/// The fixed sample set, spanning several budget tiers.
pub fn sample_ideas() -> Vec<GiftIdea> {
    vec![
        GiftIdea::new(
            "Smart Speaker",
            "A voice-controlled speaker with digital assistant features",
            "Mid-range",
            "85%",
        ),
        GiftIdea::new(
            "Wireless Earbuds",
            "Premium wireless earbuds with noise cancellation",
            "Mid-range",
            "90%",
        ),
        GiftIdea::new(
            "Reusable Gift Set",
            "Set of eco-friendly items like metal straws and cloth bags",
            "Budget",
            "75%",
        ),
        GiftIdea::new(
            "Art Supplies",
            "Professional drawing and painting kit for creative expression",
            "Varies",
            "80%",
        ),
    ]
}
