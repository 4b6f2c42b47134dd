//! Interaction endpoint handlers.
//!
//! The interaction handler is synchronous from the caller's point of view:
//! 1. Verify the Ed25519 signature
//! 2. Parse the envelope
//! 3. Dispatch on the interaction type and respond
//!
//! Publishing to the sink is spawned by the dispatcher and never awaited here.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::interaction::{
    dispatch, parse_envelope, DispatchError, InteractionResponse, ParseError,
};
use crate::sink::Publisher;
use crate::web::signature::verify_signature;
use crate::Config;

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(config: Config, publisher: Publisher) -> Self {
        Self {
            config: Arc::new(config),
            publisher,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Interactions
// =============================================================================

/// Error response body. Messages are fixed strings and never echo input.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidSignature,
    InvalidJson,
    UnsupportedType,
}

impl RejectReason {
    pub fn status(self) -> StatusCode {
        match self {
            RejectReason::InvalidSignature => StatusCode::UNAUTHORIZED,
            RejectReason::InvalidJson | RejectReason::UnsupportedType => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RejectReason::InvalidSignature => "invalid signature",
            RejectReason::InvalidJson => "invalid JSON",
            RejectReason::UnsupportedType => "unsupported interaction type",
        }
    }
}

impl From<ParseError> for RejectReason {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MalformedJson(_) | ParseError::InvalidShape => RejectReason::InvalidJson,
            ParseError::MissingType => RejectReason::UnsupportedType,
        }
    }
}

impl From<DispatchError> for RejectReason {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnsupportedType(_) => RejectReason::UnsupportedType,
        }
    }
}

impl IntoResponse for RejectReason {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Interaction webhook endpoint (`POST /` and `POST /interactions`).
pub async fn interaction_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match handle_interaction(&state, &headers, &body) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(reason) => reason.into_response(),
    }
}

fn handle_interaction(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<InteractionResponse, RejectReason> {
    let signature = header(headers, SIGNATURE_HEADER);
    let timestamp = header(headers, TIMESTAMP_HEADER);

    info!(
        body_length = body.len(),
        has_signature = !signature.is_empty(),
        has_timestamp = !timestamp.is_empty(),
        "interaction_received"
    );

    if !verify_signature(signature, timestamp, body, state.config.public_key.as_bytes()) {
        warn!("interaction_signature_invalid");
        return Err(RejectReason::InvalidSignature);
    }

    let envelope = parse_envelope(body).map_err(|e| {
        warn!(error = %e, "interaction_parse_failed");
        RejectReason::from(e)
    })?;

    let response = dispatch(envelope, &state.publisher)?;

    info!(response_type = response.kind, "interaction_responded");

    Ok(response)
}
