//! HTTP server.
//!
//! # Endpoints
//!
//! - `POST /webhooks/github` - verified webhook intake
//! - `GET /issues` - paginated mirror query
//! - `GET /issues/{number}` - single issue lookup (`repo` parameter required)
//! - `POST /issues/sync` - pull issues for every mirrored repository
//! - `POST /repositories/sync` - mirror the owner's repositories
//! - `POST /repositories/{repo}/watch` - register/converge the webhook
//! - `DELETE /repositories/{repo}/watch` - remove the webhook
//! - `GET /repositories/{repo}/webhook` - remote hook status
//! - `DELETE /repositories/{repo}` - drop repository and its issues locally
//! - `GET /health` - liveness plus mirror counts

use std::sync::Arc;

pub mod error;
pub mod health;
pub mod issues;
pub mod repos;
pub mod webhook;

pub use error::ApiError;
pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::config::Config;
use crate::github::HookReconciler;
use crate::store::{IssueStore, RepositoryStore};
use crate::sync::SyncEngine;
use crate::webhooks::EventRouter;

/// Shared application state, passed to handlers via Axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engine: Arc<SyncEngine>,
    reconciler: Arc<HookReconciler>,
    dispatcher: Arc<EventRouter>,
    repos: Arc<dyn RepositoryStore>,
    issues: Arc<dyn IssueStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        engine: Arc<SyncEngine>,
        reconciler: Arc<HookReconciler>,
        dispatcher: Arc<EventRouter>,
        repos: Arc<dyn RepositoryStore>,
        issues: Arc<dyn IssueStore>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                reconciler,
                dispatcher,
                repos,
                issues,
            }),
        }
    }

    pub fn webhook_secret(&self) -> &[u8] {
        self.inner.config.secret_bytes()
    }

    pub fn owner(&self) -> &str {
        &self.inner.config.github_owner
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.inner.engine
    }

    pub fn reconciler(&self) -> &HookReconciler {
        &self.inner.reconciler
    }

    pub fn dispatcher(&self) -> &EventRouter {
        &self.inner.dispatcher
    }

    pub fn repos(&self) -> &dyn RepositoryStore {
        self.inner.repos.as_ref()
    }

    pub fn issues(&self) -> &dyn IssueStore {
        self.inner.issues.as_ref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{delete, get, post};

    axum::Router::new()
        .route("/webhooks/github", post(webhook::webhook_handler))
        .route("/issues", get(issues::list_issues_handler))
        .route("/issues/{number}", get(issues::get_issue_handler))
        .route("/issues/sync", post(issues::sync_issues_handler))
        .route("/repositories/sync", post(repos::sync_repositories_handler))
        .route(
            "/repositories/{repo}/watch",
            post(repos::watch_handler).delete(repos::unwatch_handler),
        )
        .route(
            "/repositories/{repo}/webhook",
            get(repos::webhook_status_handler),
        )
        .route(
            "/repositories/{repo}",
            delete(repos::delete_repository_handler),
        )
        .route("/health", get(health::health_handler))
        .with_state(app_state)
}
