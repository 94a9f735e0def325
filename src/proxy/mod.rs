//! Provider proxy: a stateless HTTP endpoint in front of the upstream model
//! API. Each inbound request makes at most one upstream call.

pub mod error;
pub mod handlers;
pub mod prompt;
pub mod upstream;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ProxyConfig;
use upstream::UpstreamClient;

pub const CHAT_ROUTE: &str = "/api/chat";
pub const HEALTH_ROUTE: &str = "/api/health";

/// Largest JSON body accepted on the chat route.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Shared state passed to all handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        let upstream = UpstreamClient::from_config(&config);
        Self {
            config: Arc::new(config),
            upstream: Arc::new(upstream),
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(CHAT_ROUTE, post(handlers::chat_handler))
        .route(HEALTH_ROUTE, get(handlers::health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(config: ProxyConfig) -> anyhow::Result<()> {
    if !config.has_credential() {
        warn!("OPENAI_API_KEY is not set. Add it to a .env file or your environment.");
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    let local_addr = listener.local_addr()?;
    let app = router(AppState::new(config));

    info!(addr = %local_addr, "HridayAi proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}
