//! Local persistence seams.
//!
//! The bridge keeps a queryable mirror of repositories and issues, plus an
//! append-only audit trail of received webhook deliveries. Each concern is a
//! trait so the HTTP layer and the sync engine stay independent of the
//! backing store; [`memory::MemoryStore`] is the in-process implementation.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{
    Issue, IssueNumber, IssueState, RawWebhookEvent, RepoFullName, Repository,
};

pub use memory::MemoryStore;

/// Error from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend-specific failure.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Mirrored repository records, keyed by full name.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Insert or fully replace a repository record.
    async fn upsert(&self, repo: Repository) -> Result<(), StoreError>;

    async fn get(&self, full_name: &RepoFullName) -> Result<Option<Repository>, StoreError>;

    /// All mirrored repositories, sorted by full name.
    async fn list(&self) -> Result<Vec<Repository>, StoreError>;

    /// Remove a repository record. Returns whether one existed.
    async fn delete(&self, full_name: &RepoFullName) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Filter for issue queries. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueQuery {
    pub state: Option<IssueState>,
    pub repo: Option<RepoFullName>,
}

/// Mirrored issues. Identity is the (repository full name, GitHub ID) pair:
/// issue numbers repeat across repositories, GitHub IDs do not repeat within
/// one.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Upsert a batch of issues by identity.
    async fn upsert_many(&self, issues: Vec<Issue>) -> Result<(), StoreError>;

    /// Issues matching the filter, most recently updated first.
    async fn query(&self, query: &IssueQuery) -> Result<Vec<Issue>, StoreError>;

    async fn get(
        &self,
        repo: &RepoFullName,
        number: IssueNumber,
    ) -> Result<Option<Issue>, StoreError>;

    /// Remove every issue belonging to the repository. Returns how many
    /// were removed.
    async fn delete_for_repo(&self, repo: &RepoFullName) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// Append-only audit trail of received webhook deliveries. Recording happens
/// before any dispatch attempt, so the trail holds deliveries the
/// notification side later failed on.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn record(&self, event: RawWebhookEvent) -> Result<(), StoreError>;

    /// Most recent deliveries, newest first, at most `limit`.
    async fn recent(&self, limit: usize) -> Result<Vec<RawWebhookEvent>, StoreError>;
}
