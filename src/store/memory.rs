//! In-process store backed by `tokio::sync::RwLock`-guarded maps.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{
    GithubId, Issue, IssueNumber, RawWebhookEvent, RepoFullName, Repository,
};

use super::{EventStore, IssueQuery, IssueStore, RepositoryStore, StoreError};

/// One store serving all three persistence seams. Cheap to construct; the
/// server holds it behind an `Arc` and hands out trait-object views.
#[derive(Default)]
pub struct MemoryStore {
    repositories: RwLock<HashMap<RepoFullName, Repository>>,
    issues: RwLock<HashMap<(RepoFullName, GithubId), Issue>>,
    events: RwLock<Vec<RawWebhookEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryStore for MemoryStore {
    async fn upsert(&self, repo: Repository) -> Result<(), StoreError> {
        self.repositories
            .write()
            .await
            .insert(repo.full_name.clone(), repo);
        Ok(())
    }

    async fn get(&self, full_name: &RepoFullName) -> Result<Option<Repository>, StoreError> {
        Ok(self.repositories.read().await.get(full_name).cloned())
    }

    async fn list(&self) -> Result<Vec<Repository>, StoreError> {
        let mut repos: Vec<Repository> =
            self.repositories.read().await.values().cloned().collect();
        repos.sort_by(|a, b| a.full_name.as_str().cmp(b.full_name.as_str()));
        Ok(repos)
    }

    async fn delete(&self, full_name: &RepoFullName) -> Result<bool, StoreError> {
        Ok(self.repositories.write().await.remove(full_name).is_some())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.repositories.read().await.len())
    }
}

#[async_trait]
impl IssueStore for MemoryStore {
    async fn upsert_many(&self, issues: Vec<Issue>) -> Result<(), StoreError> {
        let mut guard = self.issues.write().await;
        for issue in issues {
            guard.insert(issue.identity(), issue);
        }
        Ok(())
    }

    async fn query(&self, query: &IssueQuery) -> Result<Vec<Issue>, StoreError> {
        let guard = self.issues.read().await;
        let mut matches: Vec<Issue> = guard
            .values()
            .filter(|issue| {
                query.state.map_or(true, |state| issue.state == state)
                    && query.repo.as_ref().map_or(true, |repo| &issue.repo == repo)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(matches)
    }

    async fn get(
        &self,
        repo: &RepoFullName,
        number: IssueNumber,
    ) -> Result<Option<Issue>, StoreError> {
        Ok(self
            .issues
            .read()
            .await
            .values()
            .find(|issue| &issue.repo == repo && issue.number == number)
            .cloned())
    }

    async fn delete_for_repo(&self, repo: &RepoFullName) -> Result<usize, StoreError> {
        let mut guard = self.issues.write().await;
        let before = guard.len();
        guard.retain(|(owner_repo, _), _| owner_repo != repo);
        Ok(before - guard.len())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.issues.read().await.len())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn record(&self, event: RawWebhookEvent) -> Result<(), StoreError> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RawWebhookEvent>, StoreError> {
        let guard = self.events.read().await;
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}
