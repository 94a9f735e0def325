use crate::storage::{
    DARK_MODE_KEY, FRIENDLY_MODE_KEY, NAME_KEY, PreferenceStore, StorageResult, UserPreferences,
};
use crate::theme::ThemeMode;
use crate::types::{Attachment, ChatMessage};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Mock,
    Remote,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" | "local" => Ok(Self::Mock),
            "remote" | "proxy" => Ok(Self::Remote),
            other => Err(format!("unknown provider '{other}', expected 'mock' or 'remote'")),
        }
    }
}

/// Ordered list of rendered messages. Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    pub fn since(&self, start: usize) -> &[ChatMessage] {
        self.entries.get(start..).unwrap_or(&[])
    }

    pub fn latest(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything one chat session carries between turns.
pub struct Session<S> {
    store: S,
    preferences: UserPreferences,
    pub provider: ProviderKind,
    pub(crate) awaiting_name: bool,
    pending_attachment: Option<Attachment>,
    pub transcript: Transcript,
}

impl<S: PreferenceStore> Session<S> {
    pub fn new(store: S, provider: ProviderKind) -> Self {
        let preferences = UserPreferences::load(&store);
        Self {
            store,
            preferences,
            provider,
            awaiting_name: false,
            pending_attachment: None,
            transcript: Transcript::default(),
        }
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn display_name(&self) -> Option<&str> {
        self.preferences.display_name.as_deref()
    }

    pub fn is_awaiting_name(&self) -> bool {
        self.awaiting_name
    }

    pub fn theme(&self) -> ThemeMode {
        ThemeMode::from_dark_flag(self.preferences.dark_mode)
    }

    pub fn set_display_name(&mut self, name: &str) -> StorageResult<()> {
        self.preferences.display_name = Some(name.to_string());
        self.store.set(NAME_KEY, name)
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> StorageResult<()> {
        self.preferences.dark_mode = enabled;
        self.store.set_flag(DARK_MODE_KEY, enabled)
    }

    pub fn set_friendly_mode(&mut self, enabled: bool) -> StorageResult<()> {
        self.preferences.friendly_mode = enabled;
        self.store.set_flag(FRIENDLY_MODE_KEY, enabled)
    }

    /// Hold an attachment for the next send, replacing any earlier one.
    pub fn attach(&mut self, attachment: Attachment) {
        let mut shown = ChatMessage::user("");
        shown.attachment = Some(attachment.clone());
        self.transcript.push(shown);
        if let Some(previous) = self.pending_attachment.replace(attachment) {
            tracing::debug!(name = %previous.name, "replaced pending attachment");
        }
    }

    pub fn pending_attachment(&self) -> Option<&Attachment> {
        self.pending_attachment.as_ref()
    }

    pub(crate) fn take_attachment(&mut self) -> Option<Attachment> {
        self.pending_attachment.take()
    }

    pub fn clear_transcript(&mut self) {
        self.transcript.clear();
    }
}
