//! Client side of HridayAi.
//!
//! The mediator answers each user turn either from the local reply rules or
//! through a remote provider, falling back to the local rules whenever the
//! remote path fails.
//!
//! # Architecture
//!
//! - `session` - Explicit per-session state: preferences, pending attachment, transcript
//! - `mediator` - Turn handling and fallback composition. A turn starts
//!   synchronously against the session; only the remote call is awaited.
//! - `provider` - Remote reply sources (the HTTP proxy client)
//! - `terminal` - Interactive front-end over stdin/stdout
//!
//! # Usage
//!
//! ```rust,no_run
//! use hridayai::chat::{Mediator, ProviderKind, ProxyClient, Session};
//! use hridayai::storage::MemoryStore;
//!
//! # async fn example() {
//! let mediator = Mediator::new(ProxyClient::new("http://localhost:3000/api/chat"));
//! let mut session = Session::new(MemoryStore::new(), ProviderKind::Remote);
//! let replies = mediator.send(&mut session, "2+2*3").await;
//! # }
//! ```

mod mediator;
mod provider;
mod session;
pub mod terminal;

pub use mediator::{DEFAULT_MODEL, Mediator, PendingReply, Turn, compose_remote_reply};
pub use provider::{
    ProviderError, ProviderRequest, ProviderResult, ProxyClient, RemoteProvider,
};
pub use session::{ProviderKind, Session, Transcript};
