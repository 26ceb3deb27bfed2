//! API error responses.
//!
//! Every handler error funnels through [`ApiError`], which maps the domain
//! error taxonomy onto HTTP statuses and renders the common
//! `{"success": false, "error": ...}` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::github::{GithubError, ReconcileError};
use crate::store::StoreError;
use crate::sync::SyncError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request itself is malformed (bad query parameter, missing body
    /// field).
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Sync(err) => sync_status(err),
            ApiError::Reconcile(err) => match err {
                ReconcileError::RepositoryNotFound(_) => StatusCode::NOT_FOUND,
                ReconcileError::Github(gh) => github_status(gh),
                ReconcileError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn sync_status(err: &SyncError) -> StatusCode {
    match err {
        SyncError::NoRepositories => StatusCode::BAD_REQUEST,
        SyncError::RepositoryNotMirrored(_) => StatusCode::NOT_FOUND,
        SyncError::IssueNotFound { .. } => StatusCode::NOT_FOUND,
        SyncError::Github(gh) => github_status(gh),
        SyncError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Upstream GitHub failures surface with their own semantics; the caller
/// can tell a missing resource from an exhausted rate limit.
fn github_status(err: &GithubError) -> StatusCode {
    match err {
        GithubError::NotFound(_) => StatusCode::NOT_FOUND,
        GithubError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        GithubError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        GithubError::Conflict(_) => StatusCode::CONFLICT,
        GithubError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        GithubError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%self, "request failed");
        }
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_errors_map_to_matching_statuses() {
        assert_eq!(
            github_status(&GithubError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            github_status(&GithubError::RateLimited("x".into())),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            github_status(&GithubError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            github_status(&GithubError::Unauthenticated("x".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn empty_mirror_is_a_client_error() {
        assert_eq!(sync_status(&SyncError::NoRepositories), StatusCode::BAD_REQUEST);
    }
}
