use super::error::{ProxyError, ProxyResult};
use super::prompt::PromptMessage;
use crate::config::ProxyConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Client for the upstream chat completions endpoint. Holds the credential;
/// nothing here is ever echoed back to proxy callers.
pub struct UpstreamClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

impl UpstreamClient {
    pub fn new(endpoint: String, api_key: Option<String>, max_tokens: u32) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            max_tokens,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(
            config.upstream_url.clone(),
            config.api_key.clone(),
            config.max_tokens,
        )
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// One request, no retries.
    pub async fn complete(&self, model: &str, messages: &[PromptMessage]) -> ProxyResult<String> {
        let api_key = self.api_key.as_ref().ok_or(ProxyError::MissingCredential)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model,
                messages,
                max_tokens: self.max_tokens,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "upstream responded");

        if !status.is_success() {
            return Err(ProxyError::Upstream(format!("{status}: {body}")));
        }

        extract_reply(&body)
    }
}

/// First completion's text, or the raw payload when the shape is unexpected.
pub fn extract_reply(body: &str) -> ProxyResult<String> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProxyError::Upstream(format!("malformed payload: {e}")))?;

    if let Ok(parsed) = serde_json::from_value::<CompletionResponse>(value.clone())
        && let Some(choice) = parsed.choices.into_iter().next()
        && let Some(message) = choice.message
        && let Some(content) = message.content
    {
        return Ok(content);
    }

    warn!("unexpected upstream response shape, relaying raw payload");
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hi!"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "Hi!");
    }

    #[test]
    fn unexpected_shape_is_relayed_raw() {
        let body = r#"{"choices":[]}"#;
        assert_eq!(extract_reply(body).unwrap(), r#"{"choices":[]}"#);
        let body = r#"{"output":"x"}"#;
        assert_eq!(extract_reply(body).unwrap(), r#"{"output":"x"}"#);
    }

    #[test]
    fn non_json_is_an_upstream_failure() {
        assert!(matches!(
            extract_reply("<html>bad gateway</html>"),
            Err(ProxyError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let client = UpstreamClient::new("http://127.0.0.1:9/unused".into(), None, 10);
        let result = client.complete("m", &[]).await;
        assert!(matches!(result, Err(ProxyError::MissingCredential)));
    }
}
