//! NeuroAsha server - hosts isolated assessment sessions over HTTP.
//!
//! Sessions live in memory only; restarting the server discards them.
//!
//! Endpoints:
//! - GET /api/health - Liveness and session count
//! - GET /api/script - The question script
//! - POST /api/sessions - Start a session
//! - GET /api/sessions - List sessions
//! - GET /api/sessions/{id} - Session snapshot
//! - POST /api/sessions/{id}/messages - Submit a participant message
//! - DELETE /api/sessions/{id} - Discard a session
//! - WS /api/sessions/{id}/ws - Stream of appended messages

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{ws::WebSocket, Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::{script, SubmitError};
use crate::config::AppConfig;
use crate::models::{Message, Phase, Progress, QuestionSpec};
use crate::session::{PacedSession, Pacing, SessionManager, SessionSnapshot};

/// Shared server state.
pub struct ServerState {
    sessions: SessionManager,
}

impl ServerState {
    pub const fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(SessionManager::new(
            Pacing::from(&config.pacing),
            config.assessment.fallback_seed,
        ))
    }

    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}

// === Errors ===

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ServerError {
    const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Submit(e) => e.kind(),
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Submit(SubmitError::EmptyInput) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Submit(SubmitError::BusySubmission) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// === Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

/// Full view of one session.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

/// Session summary for listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub phase: Phase,
    pub busy: bool,
    pub progress: Progress,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Request to submit a participant message.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

// === Server Lifecycle ===

/// Build the API router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/script", get(get_script))
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route(
            "/api/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/messages", post(submit_message))
        .route("/api/sessions/{id}/ws", get(websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server and run until interrupted.
pub async fn start_server(config: &AppConfig, port: u16, open_browser: bool) -> Result<()> {
    let state = Arc::new(ServerState::from_config(config));
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("NeuroAsha server listening on http://{addr}");

    if open_browser {
        if let Err(e) = open::that(format!("http://{addr}/api/health")) {
            warn!("Could not open browser: {e}");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
}

// === Handlers ===

async fn lookup(state: &ServerState, id: Uuid) -> Result<Arc<PacedSession>, ServerError> {
    state
        .sessions()
        .get(&id)
        .await
        .ok_or(ServerError::NotFound(id))
}

async fn view(id: Uuid, session: &PacedSession) -> SessionView {
    SessionView {
        id,
        created_at: session.created_at(),
        snapshot: session.snapshot().await,
    }
}

async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions().len().await,
    })
}

async fn get_script() -> Json<&'static [QuestionSpec]> {
    Json(script::QUESTIONS)
}

async fn create_session(State(state): State<Arc<ServerState>>) -> (StatusCode, Json<SessionView>) {
    let (id, session) = state.sessions().create().await;
    (StatusCode::CREATED, Json(view(id, &session).await))
}

async fn list_sessions(State(state): State<Arc<ServerState>>) -> Json<Vec<SessionSummary>> {
    let mut summaries = Vec::new();
    for (id, session) in state.sessions().list().await {
        let snapshot = session.snapshot().await;
        summaries.push(SessionSummary {
            id,
            phase: snapshot.phase,
            busy: snapshot.busy,
            progress: snapshot.progress,
            message_count: snapshot.transcript.len(),
            created_at: session.created_at(),
        });
    }
    Json(summaries)
}

async fn get_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ServerError> {
    let session = lookup(&state, id).await?;
    Ok(Json(view(id, &session).await))
}

async fn delete_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    if state.sessions().remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(id))
    }
}

async fn submit_message(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let session = lookup(&state, id).await?;
    let message = session.submit(&req.text).await?;
    Ok((StatusCode::ACCEPTED, Json(message)))
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let session = lookup(&state, id).await?;
    Ok(ws.on_upgrade(move |socket| handle_websocket(socket, session)))
}

/// Replay the transcript, then forward new messages as they are appended.
async fn handle_websocket(mut socket: WebSocket, session: Arc<PacedSession>) {
    use axum::extract::ws::Message as WsMessage;

    let mut stream = BroadcastStream::new(session.subscribe());
    let mut last_sent = 0;

    if catch_up(&mut socket, &session, &mut last_sent).await.is_err() {
        return;
    }

    while let Some(item) = stream.next().await {
        let sent = match item {
            Ok(message) if message.id > last_sent => {
                last_sent = message.id;
                send_json(&mut socket, &message).await
            }
            Ok(_) => Ok(()),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "WebSocket observer lagged behind, resending from transcript");
                catch_up(&mut socket, &session, &mut last_sent).await
            }
        };
        if sent.is_err() {
            break;
        }
    }

    let _ = socket.send(WsMessage::Close(None)).await;
}

/// Send every transcript message newer than `last_sent`.
async fn catch_up(
    socket: &mut WebSocket,
    session: &PacedSession,
    last_sent: &mut u64,
) -> Result<(), axum::Error> {
    for message in session.transcript().await {
        if message.id > *last_sent {
            send_json(socket, &message).await?;
            *last_sent = message.id;
        }
    }
    Ok(())
}

async fn send_json(socket: &mut WebSocket, message: &Message) -> Result<(), axum::Error> {
    use axum::extract::ws::Message as WsMessage;

    let json = serde_json::to_string(message).map_err(|e| {
        warn!(id = message.id, "Failed to serialize message: {e}");
        axum::Error::new(e)
    })?;
    socket.send(WsMessage::Text(json.into())).await
}
