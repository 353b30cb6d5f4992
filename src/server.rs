use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get_service, post},
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::llm::ChatCompletionsClient;
use crate::recommender::{Catalog, FastEmbedder, RagChatbot};
use crate::widget::{CHAT_PATH, ChatReply, ErrorBody};

/// Returned with 400 when the message is missing or empty.
pub const EMPTY_MESSAGE_ERROR: &str = "Message cannot be empty";

/// Returned with 500 when the recommender fails.
pub const GENERATION_ERROR: &str = "Sorry, an error occurred while generating a response.";

/// Build the chatbot and serve until Ctrl-C.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = config.llm_settings();
    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = ?settings.provider,
        "LLM configuration loaded"
    );

    let catalog = Catalog::load(&config.catalog.db_path)
        .await
        .with_context(|| format!("Failed to load catalog {}", config.catalog.db_path.display()))?;
    info!(songs = catalog.len(), path = %config.catalog.db_path.display(), "Catalog loaded");

    let embedder = Arc::new(FastEmbedder::load(&config.embedding.model).await?);
    let generator = Arc::new(ChatCompletionsClient::new(settings));

    let chatbot = RagChatbot::bootstrap(
        catalog,
        &config.catalog.index_path,
        embedder,
        generator,
        config.catalog.top_k,
    )
    .await?;
    info!("Chatbot initialized.");

    let state = AppState {
        responder: Arc::new(chatbot),
    };
    let app = router(state, &config.server.static_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Routes: the chat page at `/`, assets under `/static`, and `POST /chat`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route(
            "/",
            get_service(ServeFile::new(static_dir.join("index.html"))),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .route(CHAT_PATH, post(chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
struct IncomingChat {
    /// Treated the same as empty when absent.
    #[serde(default)]
    message: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

/// POST /chat - Answer one message.
///
/// A body that is not the expected JSON is answered like any other
/// internal failure: 500 with an [`ErrorBody`].
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<IncomingChat>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::error!(error = %rejection.body_text(), "Unreadable chat request");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, GENERATION_ERROR)
    })?;
    let message = req.message.unwrap_or_default();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, EMPTY_MESSAGE_ERROR));
    }

    tracing::info!(length = message.len(), "Received chat request");

    match state.responder.respond(&message).await {
        Ok(answer) => {
            tracing::debug!(answer_length = answer.len(), "Chat response generated");
            Ok(Json(ChatReply::text(answer)))
        }
        Err(e) => {
            tracing::error!(error = ?e, "Error during chat");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, GENERATION_ERROR))
        }
    }
}
