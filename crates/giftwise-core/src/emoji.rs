//! Title keyword to emoji mapping for idea listings.

use crate::sanitize::contains_keyword;

/// Emoji used when no keyword matches.
pub const DEFAULT_EMOJI: &str = "🎁";

/// Checked in order; the first matching row wins.
const EMOJI_TABLE: &[(&[&str], &str)] = &[
    (&["headphone", "earbuds", "audio"], "🎧"),
    (&["speaker", "sound"], "🔊"),
    (&["camera", "photo"], "📸"),
    (&["book", "reading"], "📚"),
    (&["game", "gaming"], "🎮"),
    (&["art", "creative", "paint"], "🎨"),
    (&["coffee", "tea", "drink"], "☕"),
    (&["eco", "reusable", "sustainable"], "♻️"),
    (&["music", "playlist"], "🎵"),
    (&["cook", "kitchen"], "🍳"),
    (&["plant", "garden"], "🪴"),
    (&["tech", "gadget"], "📱"),
    (&["puzzle", "brain"], "🧩"),
    (&["travel", "adventure"], "✈️"),
    (&["watch", "time"], "⌚"),
];

/// Pick an emoji for a gift title by substring keyword, ignoring case.
pub fn gift_emoji(title: &str) -> &'static str {
    EMOJI_TABLE
        .iter()
        .find(|(keywords, _)| contains_keyword(title, keywords))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_EMOJI)
}
