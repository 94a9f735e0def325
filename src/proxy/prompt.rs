use crate::identity::ATTRIBUTION;
use crate::types::ImageRef;
use serde::Serialize;

/// Persona instruction sent ahead of every user message.
pub fn system_prompt() -> String {
    format!(
        "You are HridayAi, a friendly assistant. If asked who you are or who created you, reply: \"{ATTRIBUTION}\""
    )
}

/// The user turn as sent upstream. Images are only named, never forwarded.
pub fn user_content(message: &str, image: Option<&ImageRef>) -> String {
    match image {
        Some(image) => format!(
            "{message}\n\n[User attached an image: {}]",
            image.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("image")
        ),
        None => message.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: &'static str,
    pub content: String,
}

pub fn build_messages(message: &str, image: Option<&ImageRef>) -> Vec<PromptMessage> {
    vec![
        PromptMessage {
            role: "system",
            content: system_prompt(),
        },
        PromptMessage {
            role: "user",
            content: user_content(message, image),
        },
    ]
}
