//! Prompt construction for gift idea generation.
//!
//! The prompt asks for a bare JSON array; the normalizer tolerates
//! anything looser, so the wording here is not load-bearing.

use giftwise_core::{GiftRequest, FALLBACK_SIZE};

use crate::providers::ChatMessage;

/// Field guidance and output format, appended to every request.
pub const OUTPUT_FORMAT_PROMPT: &str = r#"For each gift idea, provide in order to the JSON array:

A short, catchy title (maximum 3 words)

A description (1 sentence max) explaining why this gift is perfect

An approximate price range (Budget, Mid-range, or Luxury)

Like Meter: how much the receiver will like the gift.

You have to give me ONLY array of JSON output like this:
[{
title: ""
desc: ""
budget: ""
likeMeter: ""
},
]"#;

/// Build the user prompt for a request.
pub fn build_gift_prompt(request: &GiftRequest) -> String {
    format!(
        "Generate {} thoughtful gift ideas for a {} that align with these interests: {}.\n\n{}",
        FALLBACK_SIZE,
        request.occasion.trim(),
        request.clean_interests().join(", "),
        OUTPUT_FORMAT_PROMPT
    )
}

/// The messages sent to the provider for a request.
pub fn gift_messages(request: &GiftRequest) -> Vec<ChatMessage> {
    vec![ChatMessage::user(build_gift_prompt(request))]
}
