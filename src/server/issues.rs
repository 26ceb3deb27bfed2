//! Issue query and sync endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::cache::{paginate, StateFilter};
use crate::types::{IssueNumber, RepoFullName};

use super::error::ApiError;
use super::AppState;

const DEFAULT_PER_PAGE: usize = 30;
const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
pub struct IssueListParams {
    state: Option<String>,
    repo: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

/// GET /issues
///
/// Paginated view over the local issue mirror. `state` is `open`, `closed`,
/// or `all` (default); `repo` narrows to one repository and accepts either
/// a bare name or an `owner/name` full name.
pub async fn list_issues_handler(
    State(app_state): State<AppState>,
    Query(params): Query<IssueListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state_filter = match params.state.as_deref() {
        None => StateFilter::All,
        Some(raw) => StateFilter::parse(raw).ok_or_else(|| {
            ApiError::Validation(format!(
                "invalid state {raw:?}: expected open, closed, or all"
            ))
        })?,
    };

    let repo = params
        .repo
        .as_deref()
        .map(|raw| resolve_repo(&app_state, raw))
        .transpose()?;
    if let Some(full_name) = &repo {
        if app_state.repos().get(full_name).await?.is_none() {
            return Err(crate::sync::SyncError::RepositoryNotMirrored(full_name.clone()).into());
        }
    }

    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(ApiError::Validation("page must be at least 1".to_string()));
    }
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(ApiError::Validation(format!(
            "per_page must be between 1 and {MAX_PER_PAGE}"
        )));
    }

    let issues = app_state.engine().list_issues(repo, state_filter).await?;
    let page = paginate(&issues, page, per_page);

    Ok(Json(serde_json::json!({
        "success": true,
        "data": page.items,
        "total": page.total,
        "pagination": {
            "page": page.page,
            "per_page": page.per_page,
            "total_pages": page.total_pages,
            "has_more": page.has_more,
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct IssueGetParams {
    repo: Option<String>,
}

/// GET /issues/{number}
///
/// The `repo` query parameter is required: issue numbers only identify an
/// issue within one repository.
pub async fn get_issue_handler(
    State(app_state): State<AppState>,
    Path(number): Path<u64>,
    Query(params): Query<IssueGetParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw_repo = params.repo.as_deref().ok_or_else(|| {
        ApiError::Validation("the repo query parameter is required".to_string())
    })?;
    let repo = resolve_repo(&app_state, raw_repo)?;

    let issue = app_state
        .engine()
        .get_issue(&repo, IssueNumber(number))
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": issue })))
}

/// POST /issues/sync
pub async fn sync_issues_handler(
    State(app_state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let report = app_state.engine().sync_issues().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": report })))
}

/// Resolves a `repo` parameter to a full name. A bare name is qualified
/// with the configured owner; a full name must belong to that owner.
pub(super) fn resolve_repo(app_state: &AppState, raw: &str) -> Result<RepoFullName, ApiError> {
    if raw.contains('/') {
        let full = RepoFullName::parse(raw)
            .map_err(|err| ApiError::Validation(err.to_string()))?;
        if full.owner() != app_state.owner() {
            return Err(ApiError::Validation(format!(
                "repository {raw} does not belong to the configured owner"
            )));
        }
        Ok(full)
    } else if raw.is_empty() {
        Err(ApiError::Validation("repo must not be empty".to_string()))
    } else {
        Ok(RepoFullName::new(app_state.owner(), raw))
    }
}
