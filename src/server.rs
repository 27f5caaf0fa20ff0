//! HTTP surface of the proxy
//!
//! Exposes `GET /` (welcome) and `POST /api/chat` on an axum router with
//! permissive CORS. Each request is handled strictly sequentially: validate,
//! map parameters, call the backend, relay the result. Streaming responses
//! re-emit backend fragments one at a time as `data: <json>` server-sent
//! events, in arrival order and without buffering.

use std::{convert::Infallible, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{sse::Event, IntoResponse, Response, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{
    backend::{self, ChatBackend, FragmentStream},
    chat::ChatRequest,
    config::RelaySettings,
    error::{RelayError, Result},
};

/// Shared per-process state: one stateless backend client, built at startup
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn ChatBackend>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the router for the given backend
pub fn build_router(backend: Arc<dyn ChatBackend>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(AppState { backend })
}

/// Run the proxy until the process is stopped
///
/// # Errors
///
/// Returns an error if the backend client cannot be built or the listen
/// address cannot be bound.
pub async fn serve(settings: &RelaySettings) -> Result<()> {
    let backend = backend::create(settings)?;
    let app = build_router(backend);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, backend = %settings.backend_url, dialect = ?settings.dialect, "ollama-relay listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| RelayError::Other(format!("server error: {e}")))
}

async fn home(State(state): State<AppState>) -> &'static str {
    state.backend.welcome()
}

async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    match handle_chat(&state, &body).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "chat request failed");
            err.into_response()
        }
    }
}

async fn handle_chat(state: &AppState, body: &[u8]) -> Result<Response> {
    let raw: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::InvalidRequest(format!("Invalid JSON in request body: {e}")))?;

    // Reject a non-list `messages` by name before the typed parse, which
    // would only report a serde type mismatch
    if let Some(messages) = raw.get("messages") {
        if !messages.is_array() {
            return Err(RelayError::InvalidRequest(
                "Messages ('messages') must be a list of chat message objects".to_string(),
            ));
        }
    }

    let request: ChatRequest = serde_json::from_value(raw)
        .map_err(|e| RelayError::InvalidRequest(format!("Invalid request body: {e}")))?;
    request.validate()?;

    if request.stream {
        let fragments = state.backend.chat_stream(&request).await?;
        Ok(relay_stream(fragments))
    } else {
        let reply = state.backend.chat(&request).await?;
        Ok(Json(reply).into_response())
    }
}

/// Relay backend fragments as SSE, one `data:` event per fragment
///
/// Fragment N is flushed only after fragment N-1; nothing is held back
/// pending later fragments, and no synthetic end marker is appended. A
/// backend error after fragments have been flushed cannot be signalled to
/// the caller (the partial response is already committed), so the stream
/// simply ends.
fn relay_stream(fragments: FragmentStream) -> Response {
    let events = async_stream::stream! {
        let mut fragments = fragments;
        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    let data = fragment.to_string();
                    yield Ok::<_, Infallible>(Event::default().data(data));
                }
                Err(e) => {
                    warn!(error = %e, "backend stream failed mid-relay");
                    break;
                }
            }
        }
    };

    Sse::new(events).into_response()
}
