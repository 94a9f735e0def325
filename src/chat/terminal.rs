//! Interactive terminal session driving the mediator.

use super::mediator::{Mediator, Turn};
use super::provider::RemoteProvider;
use super::session::{ProviderKind, Session};
use crate::storage::{PreferenceStore, StorageResult};
use crate::theme::render_message;
use crate::types::{Attachment, ChatMessage, Role};
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Dark(bool),
    Friendly(bool),
    Provider(ProviderKind),
    Attach(PathBuf),
    Clear,
    Help,
    Quit,
    Invalid(String),
}

const HELP_TEXT: &str = "Commands: /dark on|off, /friendly on|off, /provider mock|remote, /attach <path>, /clear, /quit";

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Say(trimmed.to_string());
    };
    let (name, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let arg = arg.trim();
    match name.to_ascii_lowercase().as_str() {
        "dark" => parse_switch(arg)
            .map(Command::Dark)
            .unwrap_or_else(|| Command::Invalid("usage: /dark on|off".into())),
        "friendly" => parse_switch(arg)
            .map(Command::Friendly)
            .unwrap_or_else(|| Command::Invalid("usage: /friendly on|off".into())),
        "provider" => arg
            .parse()
            .map(Command::Provider)
            .unwrap_or_else(Command::Invalid),
        "attach" if !arg.is_empty() => Command::Attach(PathBuf::from(arg)),
        "attach" => Command::Invalid("usage: /attach <path>".into()),
        "clear" => Command::Clear,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command /{other}")),
    }
}

/// Read a file into an attachment with base64 inline data.
pub async fn load_attachment(path: &Path) -> Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(Attachment {
        name,
        inline_data: STANDARD.encode(bytes),
    })
}

async fn render<W, S>(out: &mut W, session: &Session<S>, messages: &[ChatMessage]) -> Result<()>
where
    W: AsyncWrite + Unpin,
    S: PreferenceStore,
{
    for message in messages {
        let line = render_message(session.theme(), message);
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await?;
    Ok(())
}

async fn note<W, S>(out: &mut W, session: &Session<S>, text: String) -> Result<()>
where
    W: AsyncWrite + Unpin,
    S: PreferenceStore,
{
    render(out, session, &[ChatMessage::debug(text)]).await
}

/// A failed preference write is logged and kept in the transcript; the toggle
/// still applies for this session.
async fn report_unsaved<W, S>(
    out: &mut W,
    session: &mut Session<S>,
    saved: StorageResult<()>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
    S: PreferenceStore,
{
    let Err(err) = saved else {
        return Ok(());
    };
    tracing::warn!(%err, "failed to persist preference");
    let entry = ChatMessage::debug(format!("Could not save preference: {err}"));
    session.transcript.push(entry.clone());
    render(out, session, &[entry]).await
}

/// Run on stdin/stdout until `/quit` or end of input.
pub async fn run<P, S>(mediator: &Mediator<P>, session: &mut Session<S>) -> Result<()>
where
    P: RemoteProvider,
    S: PreferenceStore,
{
    let mut out = tokio::io::stdout();
    run_with(mediator, session, BufReader::new(tokio::io::stdin()), &mut out).await
}

/// Drive a session from `input` lines, rendering to `out`.
///
/// Remote turns are polled alongside the input, so a slow provider only
/// delays its own reply. Replies are rendered in completion order. Once input
/// ends, outstanding replies are still awaited; `/quit` drops them.
pub async fn run_with<P, S, R, W>(
    mediator: &Mediator<P>,
    session: &mut Session<S>,
    input: R,
    out: &mut W,
) -> Result<()>
where
    P: RemoteProvider,
    S: PreferenceStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, Vec<ChatMessage>>> =
        FuturesUnordered::new();
    let mut input_open = true;

    let welcome = mediator.welcome(session);
    render(out, session, &[welcome]).await?;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Command::Say(text) => {
                        let start = session.transcript.len();
                        if let Turn::Remote(pending) = mediator.begin(session, &text) {
                            in_flight.push(mediator.resolve(pending).boxed_local());
                        }
                        // The typed line is already on screen.
                        let fresh: Vec<_> = session
                            .transcript
                            .since(start)
                            .iter()
                            .filter(|m| m.role != Role::User)
                            .cloned()
                            .collect();
                        render(out, session, &fresh).await?;
                    }
                    Command::Dark(enabled) => {
                        let saved = session.set_dark_mode(enabled);
                        report_unsaved(out, session, saved).await?;
                        note(out, session, format!("dark mode {}", on_off(enabled))).await?;
                    }
                    Command::Friendly(enabled) => {
                        let saved = session.set_friendly_mode(enabled);
                        report_unsaved(out, session, saved).await?;
                        note(out, session, format!("friendly mode {}", on_off(enabled))).await?;
                    }
                    Command::Provider(kind) => {
                        session.provider = kind;
                        note(out, session, format!("provider set to {kind:?}")).await?;
                    }
                    Command::Attach(path) => match load_attachment(&path).await {
                        Ok(attachment) => {
                            session.attach(attachment);
                            let shown = session.transcript.latest().cloned();
                            render(out, session, shown.as_slice()).await?;
                        }
                        Err(err) => note(out, session, format!("{err:#}")).await?,
                    },
                    Command::Clear => {
                        session.clear_transcript();
                        note(out, session, "transcript cleared".to_string()).await?;
                    }
                    Command::Help => note(out, session, HELP_TEXT.to_string()).await?,
                    Command::Invalid(reason) => note(out, session, reason).await?,
                    Command::Quit => break,
                }
            }
            Some(replies) = in_flight.next(), if !in_flight.is_empty() => {
                for message in &replies {
                    session.transcript.push(message.clone());
                }
                render(out, session, &replies).await?;
            }
            else => break,
        }
    }

    if !in_flight.is_empty() {
        tracing::debug!(pending = in_flight.len(), "dropping unanswered turns on quit");
    }
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
