use crate::types::{ImageRef, ProxyRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("could not reach provider: {0}")]
    Transport(String),

    #[error("provider error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("no reply from provider: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// What the mediator hands to a remote reply source for one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRequest<'a> {
    pub message: &'a str,
    pub model: &'a str,
    pub image_name: Option<&'a str>,
}

#[async_trait]
pub trait RemoteProvider: Send + Sync {
    async fn complete(&self, request: ProviderRequest<'_>) -> ProviderResult<String>;
}

#[async_trait]
impl<T: RemoteProvider + ?Sized> RemoteProvider for std::sync::Arc<T> {
    async fn complete(&self, request: ProviderRequest<'_>) -> ProviderResult<String> {
        (**self).complete(request).await
    }
}

/// Talks to the provider proxy over HTTP.
pub struct ProxyClient {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct ReplyBody {
    reply: Option<String>,
}

impl ProxyClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RemoteProvider for ProxyClient {
    async fn complete(&self, request: ProviderRequest<'_>) -> ProviderResult<String> {
        let payload = ProxyRequest {
            message: Some(request.message.to_string()),
            model: Some(request.model.to_string()),
            image: request.image_name.map(|name| ImageRef {
                name: Some(name.to_string()),
            }),
        };

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<ReplyBody>(&body) {
            Ok(ReplyBody {
                reply: Some(reply),
            }) if !reply.trim().is_empty() => Ok(reply),
            Ok(_) => Err(ProviderError::Malformed("response has no reply".to_string())),
            Err(err) => Err(ProviderError::Malformed(err.to_string())),
        }
    }
}
