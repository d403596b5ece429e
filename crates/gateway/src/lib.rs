//! HTTP gateway for ragline.
//!
//! A thin axum surface over the agent service: query answering, knowledge
//! ingestion, a streaming chat passthrough, user management, and health.
//! Failures map to a labeled JSON envelope `{"error", "message"}` — a turn
//! failure is a 502 with a distinct label, never an empty success payload.

pub mod users;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, Sse},
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use ragline_agent::AgentService;
use ragline_core::error::Error;
use ragline_core::provider::{Provider, ProviderRequest};
use ragline_core::vector::Metadata;

use users::{UserError, UserService};

/// Process-wide application context, constructed once at startup and shared
/// by reference into every handler.
pub struct GatewayState {
    pub agent: Arc<AgentService>,
    pub users: Arc<UserService>,
    pub provider: Arc<dyn Provider>,
    pub chat_model: String,
    pub context_limit: usize,
}

pub type SharedState = Arc<GatewayState>;

/// Build the router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/query", post(query_handler))
        .route("/v1/knowledge", post(add_knowledge_handler))
        .route("/v1/knowledge/stats", get(knowledge_stats_handler))
        .route("/v1/knowledge/{id}", delete(delete_knowledge_handler))
        .route("/v1/chat/stream", post(chat_stream_handler))
        .route("/v1/users", post(create_user_handler))
        .route("/v1/users/{id}", get(get_user_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn serve(state: SharedState, host: &str, port: u16) -> std::io::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Gateway listening");
    axum::serve(listener, build_router(state)).await
}

// ── Error envelope ────────────────────────────────────────────────────────

/// A client-facing error with a labeled JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    label: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            label: "Bad Request",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(serde_json::json!({
            "error": self.label,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::Provider(_) | Error::Vector(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                label: "Upstream Service Error",
                message: err.to_string(),
            },
            Error::Protocol { .. } => {
                error!(error = %err, "Turn failed on a protocol violation");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    label: "Internal Server Error",
                    message: "Something went wrong".into(),
                }
            }
            _ => {
                error!(error = %err, "Unhandled internal error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    label: "Internal Server Error",
                    message: "Something went wrong".into(),
                }
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match &err {
            UserError::InvalidEmail(_) => Self::bad_request(err.to_string()),
            UserError::EmailExists(_) => Self {
                status: StatusCode::CONFLICT,
                label: "Email Not Allowed",
                message: err.to_string(),
            },
            UserError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                label: "User Not Found",
                message: err.to_string(),
            },
        }
    }
}

// ── Request / response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
    #[serde(default)]
    context_limit: Option<usize>,
}

#[derive(Deserialize)]
struct AddKnowledgeRequest {
    documents: Vec<String>,
    #[serde(default)]
    metadatas: Option<Vec<Metadata>>,
}

#[derive(Deserialize)]
struct ChatStreamRequest {
    prompt: String,
}

#[derive(Deserialize)]
struct CreateUserRequest {
    name: String,
    email: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn query_handler(
    State(state): State<SharedState>,
    Json(request): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    let limit = request.context_limit.unwrap_or(state.context_limit);
    let outcome = state.agent.process_query(&request.query, limit).await?;
    Ok(Json(outcome))
}

async fn add_knowledge_handler(
    State(state): State<SharedState>,
    Json(request): Json<AddKnowledgeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.documents.is_empty() {
        return Err(ApiError::bad_request("documents must not be empty"));
    }

    let report = state
        .agent
        .add_knowledge(request.documents, request.metadatas)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn knowledge_stats_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.agent.knowledge_stats().await?;
    Ok(Json(stats))
}

async fn delete_knowledge_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.agent.delete_knowledge(&[id]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stream a plain chat completion (no retrieval, no tools) as SSE content
/// fragments.
async fn chat_stream_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatStreamRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("prompt must not be empty"));
    }

    let mut provider_request = ProviderRequest::new(
        &state.chat_model,
        vec![ragline_core::message::Message::user(&request.prompt)],
    );
    provider_request.stream = true;

    let rx = state
        .provider
        .stream(provider_request)
        .await
        .map_err(|e| ApiError::from(Error::Provider(e)))?;

    let stream = ReceiverStream::new(rx).map(|chunk| {
        let event = match chunk {
            Ok(chunk) if chunk.done => SseEvent::default().event("done").data(""),
            Ok(chunk) => SseEvent::default().data(chunk.content.unwrap_or_default()),
            Err(e) => SseEvent::default().event("error").data(e.to_string()),
        };
        Ok(event)
    });

    Ok(Sse::new(stream))
}

async fn create_user_handler(
    State(state): State<SharedState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .create_user(&request.name, &request.email)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.get_user(&id).await?;
    Ok(Json(user))
}
