//! Health check endpoint.

use axum::extract::State;
use axum::Json;

use super::error::ApiError;
use super::AppState;

/// GET /health
///
/// Reports liveness plus mirror counts, so a probe can also tell whether
/// the initial sync has happened.
pub async fn health_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repositories = app_state.repos().count().await?;
    let issues = app_state.issues().count().await?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "repositories": repositories,
        "issues": issues,
    })))
}
