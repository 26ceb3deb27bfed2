//! Repository mirror and watch-management endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::github::EnsureOutcome;
use crate::types::ChannelId;

use super::error::ApiError;
use super::issues::resolve_repo;
use super::AppState;

/// POST /repositories/sync
pub async fn sync_repositories_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = app_state.engine().sync_repositories().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": report })))
}

/// Optional body for watch requests.
#[derive(Debug, Default, Deserialize)]
pub struct WatchRequest {
    /// Event types to subscribe; defaults to the full managed set.
    pub events: Option<Vec<String>>,
    /// Channel that this repository's notifications go to.
    pub channel_id: Option<String>,
}

/// POST /repositories/{repo}/watch
///
/// Idempotent: re-watching an already watched repository converges the
/// remote hook instead of duplicating it.
pub async fn watch_handler(
    State(app_state): State<AppState>,
    Path(repo): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    // The body is optional; an empty one means defaults.
    let request: WatchRequest = if body.is_empty() {
        WatchRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::Validation(format!("invalid request body: {err}")))?
    };
    if let Some(events) = &request.events {
        if events.is_empty() {
            return Err(ApiError::Validation(
                "events must not be an empty list".to_string(),
            ));
        }
    }

    let channel = request.channel_id.map(ChannelId::new);
    let outcome = app_state
        .reconciler()
        .ensure(&repo, request.events, channel)
        .await?;

    let outcome_label = match outcome {
        EnsureOutcome::Created => "created",
        EnsureOutcome::Updated => "updated",
        EnsureOutcome::Unchanged => "unchanged",
    };
    Ok(Json(serde_json::json!({
        "success": true,
        "outcome": outcome_label,
    })))
}

/// DELETE /repositories/{repo}/watch
pub async fn unwatch_handler(
    State(app_state): State<AppState>,
    Path(repo): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = app_state.reconciler().remove(&repo).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "removed": removed,
    })))
}

/// GET /repositories/{repo}/webhook
pub async fn webhook_status_handler(
    State(app_state): State<AppState>,
    Path(repo): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = app_state.reconciler().check(&repo).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": status })))
}

/// DELETE /repositories/{repo}
///
/// Drops the repository from the local mirror along with every mirrored
/// issue that belongs to it. The remote repository is untouched.
pub async fn delete_repository_handler(
    State(app_state): State<AppState>,
    Path(repo): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let full_name = resolve_repo(&app_state, &repo)?;
    let issues_removed = app_state.engine().forget_repository(&full_name).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "issues_removed": issues_removed,
    })))
}
