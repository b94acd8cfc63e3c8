//! Interpretation of free-form appeal scores.
//!
//! The model reports how much the recipient will like a gift as a 1-10
//! rating, a percentage, or a word. Display code wants a number.

use crate::sanitize::{contains_keyword, strip_fences};

/// Percentage used when a score cannot be interpreted.
pub const NEUTRAL_PERCENTAGE: u8 = 75;

const LOW_TERMS: &[&str] = &["low", "poor", "bad"];
const MEDIUM_TERMS: &[&str] = &["medium", "moderate", "average", "ok"];
const HIGH_TERMS: &[&str] = &["high", "great", "excellent", "perfect", "love"];

/// Convert an appeal score to a percentage in `0..=100`.
pub fn appeal_percentage(score: &str) -> u8 {
    let cleaned = strip_fences(score);
    if cleaned.is_empty() {
        return NEUTRAL_PERCENTAGE;
    }

    let numeric = cleaned.strip_suffix('%').unwrap_or(&cleaned).trim();
    if let Ok(value) = numeric.parse::<f64>() {
        return from_number(value, cleaned.ends_with('%'));
    }

    if contains_keyword(&cleaned, LOW_TERMS) {
        40
    } else if contains_keyword(&cleaned, MEDIUM_TERMS) {
        70
    } else if contains_keyword(&cleaned, HIGH_TERMS) {
        90
    } else {
        NEUTRAL_PERCENTAGE
    }
}

fn from_number(value: f64, is_percent: bool) -> u8 {
    if !value.is_finite() || value < 0.0 {
        return NEUTRAL_PERCENTAGE;
    }
    let percent = if value <= 10.0 && !is_percent {
        value * 10.0
    } else if value <= 100.0 {
        value
    } else {
        return NEUTRAL_PERCENTAGE;
    };
    percent.round() as u8
}
