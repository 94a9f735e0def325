//! Process configuration for the proxy and the chat client.

use crate::chat::{DEFAULT_MODEL, ProviderKind};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Bundled defaults, used when no .env file is present.
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000/api/chat";

/// Load `.env` if there is one, otherwise the bundled defaults.
///
/// Must run before any threads are spawned.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if env::var(key).is_err() {
            // SAFETY: We're setting env vars at startup before any threads are spawned
            unsafe {
                env::set_var(key, value);
            }
        }
    }
}

fn parse_env_lines(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(key, env::var(key).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(key: &str, raw: Option<&str>, default: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring unparseable configuration value");
            default
        }),
        None => default,
    }
}

fn string_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Configuration for the provider proxy.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Interface to bind the HTTP listener on.
    pub host: String,
    pub port: u16,
    /// Upstream credential. Requests fail at call time when absent.
    pub api_key: Option<String>,
    /// Chat completions endpoint of the upstream model API.
    pub upstream_url: String,
    /// Model used when the caller does not name one.
    pub model: String,
    pub max_tokens: u32,
}

impl ProxyConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable            | Default                                      |
    /// |---------------------|----------------------------------------------|
    /// | `HOST`              | `127.0.0.1`                                  |
    /// | `PORT`              | `3000`                                       |
    /// | `OPENAI_API_KEY`    | unset                                        |
    /// | `OPENAI_API_URL`    | `https://api.openai.com/v1/chat/completions` |
    /// | `OPENAI_MODEL`      | `gpt-4o-mini`                                |
    /// | `OPENAI_MAX_TOKENS` | `500`                                        |
    pub fn from_env() -> Self {
        Self {
            host: string_or("HOST", "127.0.0.1"),
            port: var_or("PORT", DEFAULT_PORT),
            api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            upstream_url: string_or("OPENAI_API_URL", DEFAULT_UPSTREAM_URL),
            model: string_or("OPENAI_MODEL", DEFAULT_MODEL),
            max_tokens: var_or("OPENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS),
        }
    }

    /// Listener address, e.g. "127.0.0.1:3000".
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Configuration for the chat client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub provider: ProviderKind,
    pub proxy_url: String,
    pub model: String,
    /// Preference directory; `None` means the platform default.
    pub prefs_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// | Variable             | Default                          |
    /// |----------------------|----------------------------------|
    /// | `HRIDAYAI_PROVIDER`  | `mock`                           |
    /// | `HRIDAYAI_PROXY_URL` | `http://localhost:3000/api/chat` |
    /// | `HRIDAYAI_MODEL`     | `gpt-4o-mini`                    |
    /// | `HRIDAYAI_PREFS_DIR` | platform local data dir          |
    pub fn from_env() -> Self {
        Self {
            provider: var_or("HRIDAYAI_PROVIDER", ProviderKind::Mock),
            proxy_url: string_or("HRIDAYAI_PROXY_URL", DEFAULT_PROXY_URL),
            model: string_or("HRIDAYAI_MODEL", DEFAULT_MODEL),
            prefs_dir: env::var("HRIDAYAI_PREFS_DIR").ok().map(PathBuf::from),
        }
    }
}
