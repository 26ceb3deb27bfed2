//! The sync engine.
//!
//! Repositories first, then issues: the issue pass walks the mirrored
//! repository list, so running it against an empty mirror is an operator
//! error and fails fast with a pointer to the fix.
//!
//! Issue fetches run in batches of three repositories at a time. One
//! repository failing never aborts the pass; it is logged, counted, and the
//! rest of the batch proceeds.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::{QueryCache, StateFilter};
use crate::github::{GithubClient, GithubError};
use crate::store::{IssueQuery, IssueStore, RepositoryStore, StoreError};
use crate::types::{Issue, IssueNumber, IssueState, RepoFullName, Repository};

/// How many repositories have their issues fetched concurrently.
const SYNC_BATCH_SIZE: usize = 3;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Issue sync requested before any repositories were mirrored.
    #[error("no repositories mirrored; sync repositories first")]
    NoRepositories,

    /// The named repository is not in the local mirror.
    #[error("repository {0} is not mirrored")]
    RepositoryNotMirrored(RepoFullName),

    /// The repository exists but the issue does not.
    #[error("issue {number} not found in {repo}")]
    IssueNotFound {
        repo: RepoFullName,
        number: IssueNumber,
    },

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result summary of a repository sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepoSyncReport {
    pub total: usize,
    pub synced: usize,
}

/// Result summary of an issue sync pass.
///
/// `total` and `synced` count issues: fetched from the remote, and written
/// to the mirror. The repository counters break down where a shortfall
/// came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssueSyncReport {
    pub total: usize,
    pub synced: usize,
    pub repos_total: usize,
    pub repos_failed: usize,
}

/// Pulls remote state into the local mirror and serves mirror reads.
pub struct SyncEngine {
    client: GithubClient,
    repos: Arc<dyn RepositoryStore>,
    issues: Arc<dyn IssueStore>,
    cache: Arc<QueryCache>,
}

impl SyncEngine {
    pub fn new(
        client: GithubClient,
        repos: Arc<dyn RepositoryStore>,
        issues: Arc<dyn IssueStore>,
        cache: Arc<QueryCache>,
    ) -> Self {
        SyncEngine {
            client,
            repos,
            issues,
            cache,
        }
    }

    /// Mirrors every repository under the configured owner.
    ///
    /// Each record is a full replacement of the previous one, except for the
    /// locally owned watch fields, which are carried forward from the
    /// existing record.
    pub async fn sync_repositories(&self) -> Result<RepoSyncReport, SyncError> {
        let remote = self.client.list_repositories().await?;
        let total = remote.len();

        let mut synced = 0;
        for repo in remote {
            let fresh = match self.repos.get(&repo.full_name).await? {
                Some(existing) => repo.carry_local_fields_from(&existing),
                None => repo,
            };
            self.repos.upsert(fresh).await?;
            synced += 1;
        }

        info!(total, synced, "repository sync complete");
        Ok(RepoSyncReport { total, synced })
    }

    /// Mirrors issues for every mirrored repository.
    pub async fn sync_issues(&self) -> Result<IssueSyncReport, SyncError> {
        let repos = self.repos.list().await?;
        if repos.is_empty() {
            return Err(SyncError::NoRepositories);
        }

        // A full pass rewrites the mirror wholesale; drop cached queries up
        // front so nothing stale is served while it runs.
        self.cache.invalidate_all();

        let repos_total = repos.len();
        let mut repos_failed = 0;
        let mut total = 0;
        let mut synced = 0;

        for batch in repos.chunks(SYNC_BATCH_SIZE) {
            let fetches = batch.iter().map(|repo| self.fetch_repo_issues(repo));
            for (repo, result) in batch.iter().zip(join_all(fetches).await) {
                match result {
                    Ok(issues) => {
                        let fetched = issues.len();
                        total += fetched;
                        match self.issues.upsert_many(issues).await {
                            Ok(()) => synced += fetched,
                            Err(err) => {
                                error!(repo = %repo.full_name, %err, "mirror write failed for repository");
                                repos_failed += 1;
                            }
                        }
                    }
                    Err(err) => {
                        error!(repo = %repo.full_name, %err, "issue sync failed for repository");
                        repos_failed += 1;
                    }
                }
            }
        }

        // Any mirror write can make any cached query stale.
        self.cache.invalidate_all();

        info!(
            repos_total,
            repos_failed, total, synced, "issue sync complete"
        );
        Ok(IssueSyncReport {
            total,
            synced,
            repos_total,
            repos_failed,
        })
    }

    /// Open and closed issues for one repository, merged.
    ///
    /// GitHub's issue listing accepts one state per call; `all` exists but
    /// interleaves pull requests more aggressively in older API versions, so
    /// two explicit calls keep the behavior predictable.
    async fn fetch_repo_issues(&self, repo: &Repository) -> Result<Vec<Issue>, GithubError> {
        let name = repo.full_name.name();
        let mut issues = self.client.list_issues(name, IssueState::Open).await?;
        issues.extend(self.client.list_issues(name, IssueState::Closed).await?);
        Ok(issues)
    }

    /// Mirror-backed issue listing with a read-through cache.
    pub async fn list_issues(
        &self,
        repo: Option<RepoFullName>,
        state: StateFilter,
    ) -> Result<Arc<Vec<Issue>>, SyncError> {
        if let Some(hit) = self.cache.get(repo.as_ref(), state) {
            return Ok(hit);
        }

        let results = self
            .issues
            .query(&IssueQuery {
                state: state.as_state(),
                repo: repo.clone(),
            })
            .await?;
        self.cache.insert(repo.clone(), state, results);

        // The entry was just written; a miss here would mean a concurrent
        // invalidation, in which case an empty result is still correct.
        Ok(self
            .cache
            .get(repo.as_ref(), state)
            .unwrap_or_else(|| Arc::new(Vec::new())))
    }

    /// Looks up one issue, falling back to the remote API on a local miss.
    ///
    /// The two not-found cases stay distinct: an unmirrored repository is
    /// an addressing error, a missing issue number is a data miss.
    pub async fn get_issue(
        &self,
        repo: &RepoFullName,
        number: IssueNumber,
    ) -> Result<Issue, SyncError> {
        if self.repos.get(repo).await?.is_none() {
            return Err(SyncError::RepositoryNotMirrored(repo.clone()));
        }

        if let Some(issue) = self.issues.get(repo, number).await? {
            return Ok(issue);
        }

        // Local miss: the issue may postdate the last sync.
        match self.client.get_issue(repo.name(), number).await {
            Ok(issue) => {
                self.issues.upsert_many(vec![issue.clone()]).await?;
                self.cache.invalidate_all();
                Ok(issue)
            }
            Err(err) if err.is_not_found() => {
                warn!(%repo, %number, "issue not found locally or remotely");
                Err(SyncError::IssueNotFound {
                    repo: repo.clone(),
                    number,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Drops a repository and its issues from the mirror.
    pub async fn forget_repository(&self, repo: &RepoFullName) -> Result<usize, SyncError> {
        if !self.repos.delete(repo).await? {
            return Err(SyncError::RepositoryNotMirrored(repo.clone()));
        }
        let removed_issues = self.issues.delete_for_repo(repo).await?;
        self.cache.invalidate_all();
        info!(%repo, removed_issues, "repository dropped from mirror");
        Ok(removed_issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_sync_report_serializes_issue_counts() {
        let report = IssueSyncReport {
            total: 7,
            synced: 7,
            repos_total: 2,
            repos_failed: 0,
        };

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["total"], 7);
        assert_eq!(json["synced"], 7);
        assert_eq!(json["repos_total"], 2);
        assert_eq!(json["repos_failed"], 0);
    }
}
