//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{ChatRequest, ChatResponse, ErrorResponse, SuccessResponse, WidgetResponse};
use super::AppState;
use crate::render::render_page;
use crate::runtime::{ChatWidget, WidgetEvent};
use crate::state_machine::TransitionError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Server-rendered widget page
        .route("/", get(new_widget_page))
        .route("/w/:id", get(widget_page))
        .route("/w/:id/toggle", post(toggle_form))
        .route("/w/:id/chat", post(chat_form))
        // JSON API
        .route("/api/widgets", post(create_widget))
        .route("/api/widgets/:id", get(get_widget))
        .route("/api/widgets/:id/toggle", post(toggle_widget))
        .route("/api/widgets/:id/chat", post(send_chat))
        .route("/api/widgets/:id/stream", get(stream_widget))
        .route("/api/widgets/:id/close", post(close_widget))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn find_widget(state: &AppState, id: &str) -> Result<Arc<ChatWidget>, AppError> {
    state
        .registry
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Widget not found: {id}")))
}

fn widget_location(id: &str) -> String {
    format!("/w/{id}")
}

// ============================================================
// Server-rendered Page
// ============================================================

async fn new_widget_page(State(state): State<AppState>) -> Redirect {
    let widget = state.registry.create().await;
    Redirect::to(&widget_location(widget.id()))
}

async fn widget_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let widget = find_widget(&state, &id).await?;
    Ok(Html(render_page(&widget.snapshot(), state.registry.config())))
}

async fn toggle_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let widget = find_widget(&state, &id).await?;
    widget.toggle();
    Ok(Redirect::to(&widget_location(&id)))
}

async fn chat_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(req): Form<ChatRequest>,
) -> Result<Redirect, AppError> {
    let widget = find_widget(&state, &id).await?;
    match widget.submit(&req.text) {
        // The page already shows the typing indicator
        Ok(()) | Err(TransitionError::ReplyPending) => {
            Ok(Redirect::to(&widget_location(&id)))
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================
// Widget Lifecycle
// ============================================================

async fn create_widget(State(state): State<AppState>) -> Json<WidgetResponse> {
    let widget = state.registry.create().await;
    Json(WidgetResponse {
        widget: widget.snapshot(),
    })
}

async fn get_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WidgetResponse>, AppError> {
    let widget = find_widget(&state, &id).await?;
    Ok(Json(WidgetResponse {
        widget: widget.snapshot(),
    }))
}

async fn close_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.registry.close(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Widget not found: {id}")))
    }
}

// ============================================================
// User Actions
// ============================================================

async fn toggle_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WidgetResponse>, AppError> {
    let widget = find_widget(&state, &id).await?;
    widget.toggle();
    Ok(Json(WidgetResponse {
        widget: widget.snapshot(),
    }))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let widget = find_widget(&state, &id).await?;
    widget.submit(&req.text)?;

    let queued = !req.text.trim().is_empty();
    Ok((StatusCode::ACCEPTED, Json(ChatResponse { queued })))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let widget = find_widget(&state, &id).await?;

    // Subscribe before the snapshot so no event falls between the two
    let broadcast_rx = widget.subscribe();
    let init_event = WidgetEvent::Init {
        snapshot: widget.snapshot(),
    };

    Ok(sse_stream(init_event, broadcast_rx))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Conflict(String),
    Gone(String),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::ReplyPending => AppError::Conflict(e.to_string()),
            TransitionError::Disposed => AppError::Gone(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Gone(msg) => (StatusCode::GONE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
