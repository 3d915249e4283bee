//! HTTP intake: the synchronous edge of the service.
//!
//! Every route answers within a bounded time. Accepting work means storing
//! the payload and handing a [`Job`] to the bridge with a non-blocking
//! dispatch; nothing here ever waits on extraction or delivery. `/health`
//! is deliberately independent of the bridge so liveness probes keep
//! passing even when the worker is backlogged.

use crate::bridge::{Bridge, Job};
use crate::config::ServiceConfig;
use crate::convert::Target;
use crate::error::RelayError;
use crate::pipeline::input;
use crate::session::SessionStore;
use crate::storage::BlobStore;
use crate::transport::ChatTransport;
use crate::worker::Worker;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Bridge,
    pub sessions: Arc<SessionStore>,
    pub blobs: BlobStore,
    pub config: Arc<ServiceConfig>,
}

/// Acknowledgment returned by the accepting endpoints.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Delivery request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeliverRequest {
    pub caller_id: String,
    pub target: Target,
}

/// Reset request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetRequest {
    pub caller_id: String,
}

/// HTTP-facing error: a status code plus a user-visible message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        let status = match &e {
            RelayError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RelayError::DispatchFailure => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::FetchFailed { .. } => StatusCode::BAD_GATEWAY,
            RelayError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            RelayError::FileNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Create the API router with all routes configured.
///
/// Public so the router can be embedded in a larger application.
pub fn router(state: AppState) -> Router {
    let max_body = state.config.max_upload_bytes;
    Router::new()
        .route("/ingest", post(ingest_handler))
        .route("/deliver", post(deliver_handler))
        .route("/reset", post(reset_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — fixed literal, independent of worker state.
async fn health_handler() -> &'static str {
    "ok"
}

/// POST /ingest — multipart upload (or URL reference) of one PDF.
///
/// Fields: `caller_id` (required), plus either `document` (file part,
/// `application/pdf`) or `document_url` (text). Any other payload type is
/// rejected with a user-visible message and no task is submitted.
async fn ingest_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    let mut caller_id: Option<String> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut document_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "caller_id" => {
                caller_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            }
            "document" => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                upload = Some((mime, bytes.to_vec()));
            }
            "document_url" => {
                document_url = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let caller_id =
        caller_id.ok_or_else(|| ApiError::bad_request("missing 'caller_id' field"))?;

    let bytes = match (upload, document_url) {
        (Some((mime, bytes)), _) => {
            input::validate_upload(&mime, &bytes)?;
            bytes
        }
        (None, Some(url)) => {
            // fetch_document validates the magic bytes itself
            input::fetch_document(&url, state.config.fetch_timeout_secs).await?
        }
        (None, None) => {
            return Err(ApiError::bad_request(
                "missing 'document' file or 'document_url' field",
            ))
        }
    };

    state.blobs.put(&caller_id, &bytes).await?;
    state.bridge.dispatch(Job::Ingest { caller: caller_id })?;

    Ok((StatusCode::ACCEPTED, Json(AckResponse { status: "accepted" })))
}

/// POST /deliver — request one output format for the caller's last upload.
async fn deliver_handler(
    State(state): State<AppState>,
    Json(request): Json<DeliverRequest>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    if !state.sessions.contains(&request.caller_id) {
        return Err(ApiError {
            status: StatusCode::CONFLICT,
            message: "no document uploaded for this caller".to_string(),
        });
    }

    state.bridge.dispatch(Job::Deliver {
        caller: request.caller_id,
        target: request.target,
    })?;

    Ok((StatusCode::ACCEPTED, Json(AckResponse { status: "accepted" })))
}

/// POST /reset — drop the caller's session and stored upload.
async fn reset_handler(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Result<(StatusCode, Json<AckResponse>), ApiError> {
    state.bridge.dispatch(Job::Reset {
        caller: request.caller_id,
    })?;
    Ok((StatusCode::ACCEPTED, Json(AckResponse { status: "accepted" })))
}

/// Wire everything together and run the service until the listener fails.
///
/// Spawns the single worker task, then serves the router. The caller picks
/// the outbound transport; tests substitute a recording one.
pub async fn serve(
    config: ServiceConfig,
    transport: Arc<dyn ChatTransport>,
) -> Result<(), RelayError> {
    let sessions = Arc::new(SessionStore::new());
    let blobs = BlobStore::new(&config.storage_dir)?;
    let (bridge, rx) = Bridge::new(config.queue_capacity);

    let worker = Worker::new(
        Arc::clone(&sessions),
        blobs.clone(),
        Arc::clone(&transport),
        config.clone(),
    );
    tokio::spawn(worker.run(rx));

    let addr = config.bind_addr();
    let app = router(AppState {
        bridge,
        sessions,
        blobs,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RelayError::Internal(format!("bind {addr}: {e}")))?;
    info!("listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| RelayError::Internal(e.to_string()))
}
