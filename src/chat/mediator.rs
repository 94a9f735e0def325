use super::provider::{ProviderRequest, ProviderResult, RemoteProvider};
use super::session::{ProviderKind, Session};
use crate::identity::{self, ATTRIBUTION};
use crate::replies::{self, ReplyContext};
use crate::storage::PreferenceStore;
use crate::types::ChatMessage;
use time::OffsetDateTime;
use tracing::{debug, warn};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Decides how each user turn is answered and records the outcome in the
/// session transcript.
pub struct Mediator<P> {
    provider: P,
    model: String,
    clock: fn() -> OffsetDateTime,
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Outcome of [`Mediator::begin`].
#[derive(Debug, PartialEq, Eq)]
pub enum Turn {
    /// Whatever the turn produced is already in the transcript.
    Answered,
    Remote(PendingReply),
}

/// A turn waiting on the remote provider. Owns everything the call needs,
/// including the local reply to fall back on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReply {
    pub message: String,
    pub image_name: Option<String>,
    fallback: String,
}

impl<P: RemoteProvider> Mediator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            model: DEFAULT_MODEL.to_string(),
            clock: local_now,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Opening message for a fresh session. Asks for a name when friendly
    /// mode is on and none is stored yet.
    pub fn welcome<S: PreferenceStore>(&self, session: &mut Session<S>) -> ChatMessage {
        let friendly = session.preferences().friendly_mode;
        let text = match (friendly, session.display_name()) {
            (true, None) => {
                session.awaiting_name = true;
                "Hi! I'm HridayAi, your friendly assistant. What's your name?".to_string()
            }
            (true, Some(name)) => format!("Hey {name}! I'm here. What's on your mind today?"),
            (false, None) => "Hello. How can I help?".to_string(),
            (false, Some(name)) => format!("Hello {name}. How can I assist you?"),
        };
        let message = ChatMessage::assistant(text);
        session.transcript.push(message.clone());
        message
    }

    /// Start one user turn.
    ///
    /// Everything that needs the session happens here: the identity answer,
    /// the user echo, the attachment hand-off, name capture and local replies
    /// are in the transcript before this returns. A turn bound for the remote
    /// provider comes back as a [`PendingReply`] holding no borrow of the
    /// session, so later turns can start while it is in flight.
    pub fn begin<S: PreferenceStore>(&self, session: &mut Session<S>, input: &str) -> Turn {
        let text = input.trim();

        if text.is_empty() && session.pending_attachment().is_none() {
            return Turn::Answered;
        }

        if identity::is_identity_question(text) {
            session.transcript.push(ChatMessage::assistant(ATTRIBUTION));
            return Turn::Answered;
        }

        if !text.is_empty() {
            session.transcript.push(ChatMessage::user(text));
        }
        let attachment = session.take_attachment();

        if session.awaiting_name && session.display_name().is_none() && !text.is_empty() {
            self.capture_name(session, text);
            return Turn::Answered;
        }

        let local = self.local_reply(session, text);
        match session.provider {
            ProviderKind::Remote if !text.is_empty() => Turn::Remote(PendingReply {
                message: text.to_string(),
                image_name: attachment.map(|a| a.name),
                fallback: local,
            }),
            _ => {
                session.transcript.push(ChatMessage::assistant(local));
                Turn::Answered
            }
        }
    }

    /// Ask the remote provider for a pending turn's reply. Provider failures
    /// become a debug entry followed by the local reply.
    pub async fn resolve(&self, pending: PendingReply) -> Vec<ChatMessage> {
        let request = ProviderRequest {
            message: &pending.message,
            model: &self.model,
            image_name: pending.image_name.as_deref(),
        };
        let outcome = self.provider.complete(request).await;
        compose_remote_reply(outcome, || pending.fallback)
    }

    /// Handle one user turn to completion. Returns the messages it appended.
    pub async fn send<'s, S: PreferenceStore>(
        &self,
        session: &'s mut Session<S>,
        input: &str,
    ) -> &'s [ChatMessage] {
        let start = session.transcript.len();
        if let Turn::Remote(pending) = self.begin(session, input) {
            for message in self.resolve(pending).await {
                session.transcript.push(message);
            }
        }
        session.transcript.since(start)
    }

    fn capture_name<S: PreferenceStore>(&self, session: &mut Session<S>, text: &str) {
        let name = text.split_whitespace().next().unwrap_or(text).to_string();
        session.awaiting_name = false;
        if let Err(err) = session.set_display_name(&name) {
            warn!(%err, "failed to persist display name");
            session
                .transcript
                .push(ChatMessage::debug(format!("Could not save your name: {err}")));
        }
        debug!(%name, "captured display name");
        session.transcript.push(ChatMessage::assistant(format!(
            "Lovely to meet you, {name}! I'm HridayAi, your friendly assistant. How can I help today?"
        )));
    }

    fn local_reply<S: PreferenceStore>(&self, session: &Session<S>, text: &str) -> String {
        let prefs = session.preferences();
        let ctx = ReplyContext::new(
            prefs.friendly_mode,
            prefs.display_name.as_deref(),
            (self.clock)(),
        );
        replies::mock_reply(text, &ctx)
    }
}

/// Turn a remote outcome into transcript entries. Failures become a debug
/// entry followed by the local reply, so a turn always gets an answer.
pub fn compose_remote_reply(
    outcome: ProviderResult<String>,
    fallback: impl FnOnce() -> String,
) -> Vec<ChatMessage> {
    match outcome {
        Ok(reply) if !reply.trim().is_empty() => vec![ChatMessage::assistant(reply)],
        Ok(_) => vec![
            ChatMessage::debug("No reply from provider, falling back to local replies."),
            ChatMessage::assistant(fallback()),
        ],
        Err(err) => {
            warn!(%err, "remote provider failed, using local reply");
            vec![
                ChatMessage::debug(format!("Provider error: {err}")),
                ChatMessage::assistant(fallback()),
            ]
        }
    }
}
