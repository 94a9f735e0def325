//! # hridayai
//!
//! A small chat assistant: a client-side mediator that answers locally or
//! through a provider proxy, and the proxy that relays messages to an
//! upstream model API with a fixed persona.

pub mod chat;
pub mod config;
pub mod identity;
pub mod logging;
pub mod proxy;
pub mod replies;
pub mod storage;
pub mod theme;
pub mod types;
