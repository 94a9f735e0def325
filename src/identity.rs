//! Fixed answer for "who are you" style questions.
//!
//! Both the mediator and the proxy consult this before doing anything else, so
//! the attribution never depends on which reply source is active.

use once_cell::sync::Lazy;
use regex::Regex;

pub const ATTRIBUTION: &str = "I am HridayAi and I was created by Hriday.";

static IDENTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(who (are you|r you)|what(?:'| i)?s your name|what is your name|your name|who made you|who created you|who built you)\b",
    )
    .expect("identity pattern is valid")
});

/// Case-insensitive check against the known identity phrasings.
pub fn is_identity_question(text: &str) -> bool {
    IDENTITY_PATTERN.is_match(&text.trim().to_lowercase())
}
