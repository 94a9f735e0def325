//! Proxy error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::types::ErrorBody;

/// Convenience alias for handler return types.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Proxy errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0}")]
    InvalidInput(String),

    /// Body could not be read, e.g. over the size limit. Keeps the status the
    /// extractor chose.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Upstream credential is not configured")]
    MissingCredential,

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::Rejected { status, .. } => *status,
            ProxyError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Transport(_) | ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "chat request failed");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Transport(e.to_string())
    }
}
