//! Local reply rules used when no remote provider is selected, and as the
//! fallback whenever the remote path fails.
//!
//! Rules are evaluated in table order and the first match answers. The last
//! rule always matches, so every input gets a reply.

pub mod calculator;

use crate::identity::{self, ATTRIBUTION};
use once_cell::sync::Lazy;
use regex::Regex;
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

const TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero]:[second padding:zero] [period case:upper]");
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

static GREETING: Lazy<Regex> = Lazy::new(|| pattern(r"^(hi|hello|hey|yo|greetings)\b"));
static TIME_OR_DATE: Lazy<Regex> = Lazy::new(|| pattern(r"\b(time|date)\b"));
static HELP: Lazy<Regex> = Lazy::new(|| pattern(r"\b(help|how to|how do i|how can i)\b"));
static DEFINITION: Lazy<Regex> =
    Lazy::new(|| pattern(r"\b(defin(e|ition)|what is|who is|explain)\b"));
static WEATHER: Lazy<Regex> = Lazy::new(|| pattern(r"\b(weather|forecast)\b"));

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("reply pattern is valid")
}

/// Per-turn inputs a rule may draw on.
#[derive(Clone, Debug)]
pub struct ReplyContext<'a> {
    pub friendly: bool,
    pub name: Option<&'a str>,
    pub now: OffsetDateTime,
}

impl<'a> ReplyContext<'a> {
    pub fn new(friendly: bool, name: Option<&'a str>, now: OffsetDateTime) -> Self {
        Self {
            friendly,
            name,
            now,
        }
    }

    fn pick(&self, friendly: impl Into<String>, terse: impl Into<String>) -> String {
        if self.friendly {
            friendly.into()
        } else {
            terse.into()
        }
    }
}

/// A user turn, trimmed, with a lowercased copy for matching.
#[derive(Clone, Debug)]
pub struct Utterance<'a> {
    pub text: &'a str,
    pub lowered: String,
}

impl<'a> Utterance<'a> {
    pub fn new(input: &'a str) -> Self {
        let text = input.trim();
        Self {
            text,
            lowered: text.to_lowercase(),
        }
    }
}

pub struct Rule {
    pub name: &'static str,
    matches: fn(&Utterance<'_>) -> bool,
    respond: fn(&Utterance<'_>, &ReplyContext<'_>) -> String,
}

impl Rule {
    pub fn matches(&self, utterance: &Utterance<'_>) -> bool {
        (self.matches)(utterance)
    }

    pub fn respond(&self, utterance: &Utterance<'_>, ctx: &ReplyContext<'_>) -> String {
        (self.respond)(utterance, ctx)
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "identity",
        matches: |u| identity::is_identity_question(&u.lowered),
        respond: |_, _| ATTRIBUTION.to_string(),
    },
    Rule {
        name: "greeting",
        matches: |u| GREETING.is_match(&u.lowered),
        respond: greeting,
    },
    Rule {
        name: "time",
        matches: |u| TIME_OR_DATE.is_match(&u.lowered),
        respond: current_time,
    },
    Rule {
        name: "arithmetic",
        matches: |u| calculator::looks_like_arithmetic(&u.lowered),
        respond: arithmetic,
    },
    Rule {
        name: "help",
        matches: |u| HELP.is_match(&u.lowered),
        respond: |_, ctx| {
            ctx.pick(
                "I can help. Tell me a bit more about what you want to do and I'll walk you through it.",
                "Please provide more details about the task.",
            )
        },
    },
    Rule {
        name: "definition",
        matches: |u| DEFINITION.is_match(&u.lowered),
        respond: |u, ctx| {
            ctx.pick(
                format!(
                    "I can explain that. Do you mean: \"{}\"? Give me a specific term or context.",
                    u.text
                ),
                format!("Please clarify what you mean by: \"{}\".", u.text),
            )
        },
    },
    Rule {
        name: "weather",
        matches: |u| WEATHER.is_match(&u.lowered),
        respond: |_, ctx| {
            ctx.pick(
                "I can't fetch live weather from here, but tell me your city and I can suggest how to check it.",
                "Cannot fetch live weather in demo mode.",
            )
        },
    },
    Rule {
        name: "fallback",
        matches: |_| true,
        respond: fallback,
    },
];

fn greeting(_: &Utterance<'_>, ctx: &ReplyContext<'_>) -> String {
    match (ctx.friendly, ctx.name) {
        (true, Some(name)) => format!("Hey {name}! Nice to see you. How can I help?"),
        (true, None) => "Hey! Nice to see you. How can I help?".to_string(),
        (false, Some(name)) => format!("Hello {name}. How can I assist you?"),
        (false, None) => "Hello. How can I assist you?".to_string(),
    }
}

fn current_time(_: &Utterance<'_>, ctx: &ReplyContext<'_>) -> String {
    let time = ctx.now.format(TIME_FORMAT).unwrap_or_default();
    if ctx.friendly {
        let date = ctx.now.format(DATE_FORMAT).unwrap_or_default();
        format!("It's {time} on {date}.")
    } else {
        format!("Current time: {time}")
    }
}

fn arithmetic(u: &Utterance<'_>, ctx: &ReplyContext<'_>) -> String {
    match calculator::evaluate(u.text) {
        Ok(value) => {
            let value = calculator::format_number(value);
            ctx.pick(format!("That comes out to {value}."), format!("Result: {value}"))
        }
        Err(err) => {
            tracing::debug!(%err, "arithmetic rule could not evaluate input");
            ctx.pick(
                "I couldn't calculate that. Can you check the expression?",
                "Unable to calculate expression.",
            )
        }
    }
}

fn fallback(u: &Utterance<'_>, ctx: &ReplyContext<'_>) -> String {
    if u.text.is_empty() {
        return ctx.pick(
            "Hey, what would you like to talk about today?",
            "Hi, how can I help?",
        );
    }
    ctx.pick(
        format!(
            "I heard you ask: \"{}\". Can you give a little more detail so I can answer better?",
            u.text
        ),
        format!("I didn't understand fully: \"{}\". Please rephrase.", u.text),
    )
}

/// The first rule that accepts `input`.
pub fn matching_rule(input: &str) -> &'static Rule {
    let utterance = Utterance::new(input);
    RULES
        .iter()
        .find(|rule| rule.matches(&utterance))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// Produce the local reply for `input`.
pub fn mock_reply(input: &str, ctx: &ReplyContext<'_>) -> String {
    let utterance = Utterance::new(input);
    matching_rule(input).respond(&utterance, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-05-01 14:30:05 UTC);

    fn friendly() -> ReplyContext<'static> {
        ReplyContext::new(true, None, NOW)
    }

    fn terse() -> ReplyContext<'static> {
        ReplyContext::new(false, None, NOW)
    }

    #[test]
    fn rules_are_checked_in_priority_order() {
        let cases = [
            ("who are you", "identity"),
            ("hello, who are you?", "identity"),
            ("hi there", "greeting"),
            ("hello what time is it", "greeting"),
            ("what time is it", "time"),
            ("2+2*3", "arithmetic"),
            ("how do i bake bread", "help"),
            ("define entropy", "definition"),
            ("what is a monad", "definition"),
            ("weather tomorrow?", "weather"),
            ("bananas", "fallback"),
            ("", "fallback"),
        ];
        for (input, expected) in cases {
            assert_eq!(matching_rule(input).name, expected, "input {input:?}");
        }
    }

    #[test]
    fn identity_rule_returns_attribution() {
        assert_eq!(mock_reply("Who built you?", &friendly()), ATTRIBUTION);
        assert_eq!(mock_reply("Who built you?", &terse()), ATTRIBUTION);
    }

    #[test]
    fn greeting_uses_stored_name() {
        let ctx = ReplyContext::new(true, Some("Asha"), NOW);
        assert!(mock_reply("hey", &ctx).contains("Asha"));
        let ctx = ReplyContext::new(false, Some("Asha"), NOW);
        assert!(mock_reply("hello", &ctx).contains("Asha"));
    }

    #[test]
    fn arithmetic_reply_contains_value() {
        assert_eq!(mock_reply("2+2*3", &friendly()), "That comes out to 8.");
        assert_eq!(mock_reply(" (1 + 2) / 4 ", &terse()), "Result: 0.75");
    }

    #[test]
    fn arithmetic_failure_uses_error_phrase() {
        assert_eq!(
            mock_reply("2 + * 3", &terse()),
            "Unable to calculate expression."
        );
        assert!(mock_reply("((", &friendly()).starts_with("I couldn't calculate"));
    }

    #[test]
    fn time_reply_uses_context_clock() {
        assert_eq!(
            mock_reply("what's the date", &friendly()),
            "It's 02:30:05 PM on 2024-05-01."
        );
        assert_eq!(mock_reply("time?", &terse()), "Current time: 02:30:05 PM");
    }

    #[test]
    fn fallback_echoes_original_casing() {
        let reply = mock_reply("  Tell me About Cats  ", &terse());
        assert_eq!(
            reply,
            "I didn't understand fully: \"Tell me About Cats\". Please rephrase."
        );
    }

    #[test]
    fn friendly_and_terse_variants_differ() {
        for input in ["help me", "explain rust", "forecast", "qwerty", ""] {
            assert_ne!(
                mock_reply(input, &friendly()),
                mock_reply(input, &terse()),
                "input {input:?}"
            );
        }
    }
}
