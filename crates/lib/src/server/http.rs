//! Chat server HTTP routes (single port).

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::config::{self, Config, ProviderConfig, ServerConfig};
use crate::llm::{CompletionRequest, GroqClient};
use crate::protocol::{ChatRequest, ChatResponse, HealthResponse};
use crate::server::error::ApiError;

static INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct ServerState {
    pub provider: Arc<ProviderConfig>,
    /// None when no API key is configured; `/chat` then answers 500.
    pub client: Option<GroqClient>,
}

impl ServerState {
    pub fn new(provider: ProviderConfig, api_key: Option<String>) -> Result<Self> {
        let client = match api_key {
            Some(key) => Some(
                GroqClient::from_config(&provider, key).context("building provider client")?,
            ),
            None => None,
        };
        Ok(Self {
            provider: Arc::new(provider),
            client,
        })
    }

    /// Provider settings from config; key from GROQ_API_KEY or `provider.apiKey`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.provider.clone(), config::resolve_api_key(config))
    }
}

/// Routes: `GET /` chat page, `GET /health`, `POST /chat`.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .with_state(state)
}

/// Run the chat server; binds to config.server.bind:config.server.port.
/// Fails at startup when no API key is configured. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_server(config: Config) -> Result<()> {
    let state = ServerState::from_config(&config)?;
    serve(&config.server, state).await
}

async fn serve(server: &ServerConfig, state: ServerState) -> Result<()> {
    if state.client.is_none() {
        anyhow::bail!(
            "refusing to start without an API key (set GROQ_API_KEY or provider.apiKey in the config)"
        );
    }
    let bind = server.bind.trim();
    if !config::is_loopback_bind(bind) {
        log::warn!("chat server bound to non-loopback address {}; /chat has no auth", bind);
    }
    log::info!(
        "provider {} (model {})",
        state.provider.api_url,
        state.provider.model
    );

    let bind_addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("chat server listening on {}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("chat server exited")?;
    log::info!("chat server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / serves the browser chat page.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health returns a simple health JSON (for probes).
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        api_key_configured: state.client.is_some(),
    })
}

/// POST /chat forwards one message to the provider and returns `{"reply": ...}`.
async fn chat(
    State(state): State<ServerState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::EmptyMessage);
    }
    let client = state.client.as_ref().ok_or(ApiError::MissingApiKey)?;
    log::debug!("chat: forwarding {} byte(s) to provider", req.message.len());
    let reply = client
        .complete(CompletionRequest::from_config(&state.provider, &req.message))
        .await?;
    Ok(Json(ChatResponse { reply }))
}
