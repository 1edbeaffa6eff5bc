//! Application startup and lifecycle management.
//!
//! Wires the upstream clients into the request handler, builds the HTTP
//! router and runs it until a shutdown signal arrives.

use crate::config::AssistantConfig;
use crate::handlers::{ask, echo, health_check, metrics, news};
use crate::middleware::metrics_middleware;
use crate::services::providers::{AnswerGenerator, NewsApiClient, NewsLookup, OpenAiClient};
use crate::services::{AskService, KeywordIntent, NewsIntent};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, RequestId};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<AskService>,
}

impl AppState {
    pub fn new(assistant: AskService) -> Self {
        Self {
            assistant: Arc::new(assistant),
        }
    }
}

/// Build the HTTP router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    // The browser frontend is a local file, so any origin may call the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(ask))
        .route("/news", post(news))
        .route("/echo", post(echo))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(from_fn(metrics_middleware))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .extensions()
                    .get::<RequestId>()
                    .map(|id| id.as_str())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Construct the request handler backed by the real upstream clients.
pub fn build_assistant(config: &AssistantConfig) -> Result<AskService, AppError> {
    let news: Arc<dyn NewsLookup> =
        Arc::new(NewsApiClient::new(config.news.clone()).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Failed to build NewsAPI client: {}", e))
        })?);

    let openai = OpenAiClient::new(config.openai.clone()).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Failed to build OpenAI client: {}", e))
    })?;
    tracing::info!(model = %openai.model(), "Initialized OpenAI answer generator");
    let generator: Arc<dyn AnswerGenerator> = Arc::new(openai);

    let intent: Arc<dyn NewsIntent> =
        Arc::new(KeywordIntent::new(&config.assistant.news_keywords));

    Ok(AskService::new(
        news,
        generator,
        intent,
        config.assistant.clone(),
    ))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: AssistantConfig) -> Result<Self, AppError> {
        let assistant = build_assistant(&config)?;
        Self::build_with_state(&config, AppState::new(assistant)).await
    }

    /// Bind the listener for an already constructed state.
    pub async fn build_with_state(
        config: &AssistantConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = config.common.socket_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Assistant service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal is received.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
