//! Webhook endpoint handler.
//!
//! Verifies the delivery signature, then hands the body to the event
//! router. The one exemption is `ping`: GitHub sends it while the hook is
//! being registered, before the secret has necessarily propagated, so it is
//! answered before verification and never recorded.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::webhooks::{verify_signature, RouteOutcome};

use super::AppState;

const HEADER_EVENT: &str = "x-github-event";
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("failed to record delivery: {0}")]
    Record(#[from] crate::store::StoreError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::Record(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Response
///
/// - 200 OK: delivery handled (body says whether a notification went out)
/// - 400 Bad Request: missing event header
/// - 401 Unauthorized: missing or invalid signature
/// - 500 Internal Server Error: audit-trail write failed
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;

    // Ping arrives during hook registration and is answered before
    // signature verification.
    if event_type == "ping" {
        debug!("answering webhook ping");
        return Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "message": "pong" })),
        )
            .into_response());
    }

    // A delivery without a signature is unauthenticated, not malformed.
    let signature_header = headers
        .get(HEADER_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::InvalidSignature)?;
    if !verify_signature(&body, signature_header, app_state.webhook_secret()) {
        warn!(event_type = %event_type, "invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let outcome = app_state.dispatcher().route(&event_type, &body).await?;
    let outcome_label = match outcome {
        RouteOutcome::Dispatched => "dispatched",
        RouteOutcome::Ignored => "ignored",
        RouteOutcome::DispatchFailed => "dispatch_failed",
    };

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "success": true, "outcome": outcome_label })),
    )
        .into_response())
}

/// Extracts a header value as a string, or returns a `MissingHeader` error.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
