//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse, ThreadResponse};
use super::AppState;
use crate::runtime::ChatError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/threads/:thread_id", get(get_thread))
        .route("/threads/:thread_id/end", post(end_thread))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Unprocessable(e.body_text()))?;
    req.validate().map_err(AppError::Unprocessable)?;

    tracing::info!(thread_id = req.thread_id, len = req.message.len(), "Chat request");

    let reply = state
        .manager
        .send_message(req.thread_id, req.message)
        .await
        .map_err(AppError::from)?;

    Ok(Json(ChatResponse {
        response: reply.response,
        timestamp: Local::now(),
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Local::now(),
    })
}

// ============================================================
// Threads
// ============================================================

async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<i64>,
) -> Result<Json<ThreadResponse>, AppError> {
    let checkpoint = state
        .manager
        .thread(thread_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Thread {thread_id} not found")))?;
    Ok(Json(checkpoint.into()))
}

/// Resume a suspended thread without new input, finishing it
async fn end_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<i64>,
) -> Result<Json<ThreadResponse>, AppError> {
    let checkpoint = state
        .manager
        .end_thread(thread_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Thread {thread_id} not found")))?;
    Ok(Json(checkpoint.into()))
}

async fn get_version() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    Unprocessable(String),
    NotFound(String),
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyResponse => {
                AppError::Unprocessable(ChatError::EmptyResponse.to_string())
            }
            ChatError::Workflow(e) => {
                tracing::error!(error = %e, "Chat request failed");
                AppError::Internal(format!("Error processing chat request: {e}"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
