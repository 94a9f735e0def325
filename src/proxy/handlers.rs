use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use tracing::{debug, info};

use super::AppState;
use super::error::{ProxyError, ProxyResult};
use super::prompt;
use crate::identity::{self, ATTRIBUTION};
use crate::types::{ProxyRequest, ProxyResponse};

/// `POST /api/chat` - relay one message to the upstream model.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProxyRequest>, JsonRejection>,
) -> ProxyResult<Json<ProxyResponse>> {
    let Json(request) = payload.map_err(rejection)?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ProxyError::InvalidInput("Missing message".into()))?;

    if identity::is_identity_question(message) {
        debug!("answering identity question locally");
        return Ok(Json(ProxyResponse {
            reply: ATTRIBUTION.to_string(),
        }));
    }

    let model = request
        .model
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(state.config.model.as_str());
    let messages = prompt::build_messages(message, request.image.as_ref());

    info!(%model, has_image = request.image.is_some(), "forwarding chat message");
    let reply = state.upstream.complete(model, &messages).await?;

    Ok(Json(ProxyResponse { reply }))
}

/// Malformed JSON is the caller's input error; a body that could not be read
/// at all (size limit, broken stream) keeps the extractor's status.
fn rejection(err: JsonRejection) -> ProxyError {
    match err {
        JsonRejection::BytesRejection(_) => ProxyError::Rejected {
            status: err.status(),
            message: err.body_text(),
        },
        other => ProxyError::InvalidInput(other.body_text()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub credential_configured: bool,
}

/// `GET /api/health` - liveness plus whether a credential is loaded.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        credential_configured: state.upstream.has_credential(),
    })
}
