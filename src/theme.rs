use crate::types::{ChatMessage, Role};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }
}

/// ANSI styling for each transcript role.
pub struct ThemeDefinition {
    pub user: &'static str,
    pub assistant: &'static str,
    pub debug: &'static str,
    pub muted: &'static str,
}

const RESET: &str = "\x1b[0m";

pub fn theme_definition(mode: ThemeMode) -> ThemeDefinition {
    match mode {
        ThemeMode::Dark => ThemeDefinition {
            user: "\x1b[1;97m",
            assistant: "\x1b[96m",
            debug: "\x1b[93m",
            muted: "\x1b[90m",
        },
        ThemeMode::Light => ThemeDefinition {
            user: "\x1b[1;30m",
            assistant: "\x1b[34m",
            debug: "\x1b[31m",
            muted: "\x1b[2m",
        },
    }
}

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "HridayAi",
        Role::Debug => "debug",
    }
}

/// One transcript entry as a styled terminal line.
pub fn render_message(mode: ThemeMode, message: &ChatMessage) -> String {
    let theme = theme_definition(mode);
    let color = match message.role {
        Role::User => theme.user,
        Role::Assistant => theme.assistant,
        Role::Debug => theme.debug,
    };
    let mut line = format!("{color}{}>{RESET} {}", label(message.role), message.content);
    if let Some(attachment) = &message.attachment {
        if !message.content.is_empty() {
            line.push(' ');
        }
        line.push_str(&format!("{}[image: {}]{RESET}", theme.muted, attachment.name));
    }
    line
}
