//! Octocrab client wrapper scoped to a single account.
//!
//! Every operation targets repositories under the configured owner. Hook
//! endpoints go through octocrab's generic JSON methods since it exposes no
//! typed surface for them; responses deserialize into our own wire structs.

use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{
    GithubId, HookId, Issue, IssueNumber, IssueState, Label, Milestone, RepoFullName, RepoOwner,
    Repository, UserRef,
};

use super::error::GithubError;

const PER_PAGE: u8 = 100;

/// A GitHub API client scoped to one account (user or organization).
#[derive(Clone)]
pub struct GithubClient {
    client: Octocrab,
    owner: String,
}

impl GithubClient {
    pub fn new(client: Octocrab, owner: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
        }
    }

    /// Creates a client from a personal access token.
    pub fn from_token(
        token: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client, owner))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn qualify(&self, repo: &str) -> RepoFullName {
        RepoFullName::new(&self.owner, repo)
    }

    // ========================================================================
    // Repositories
    // ========================================================================

    /// Every repository under the owner, across all pages.
    pub async fn list_repositories(&self) -> Result<Vec<Repository>, GithubError> {
        let mut repos = Vec::new();
        let mut page: u32 = 1;
        loop {
            let batch: Vec<RawRepoRecord> = self
                .client
                .get(
                    format!(
                        "/users/{}/repos?per_page={PER_PAGE}&page={page}&sort=updated",
                        self.owner
                    ),
                    None::<&()>,
                )
                .await
                .map_err(GithubError::from_octocrab)?;

            let len = batch.len();
            repos.extend(batch.into_iter().map(RawRepoRecord::into_repository));
            if len < PER_PAGE as usize {
                break;
            }
            page += 1;
        }
        debug!(owner = %self.owner, count = repos.len(), "listed repositories");
        Ok(repos)
    }

    pub async fn get_repository(&self, repo: &str) -> Result<Repository, GithubError> {
        let raw: RawRepoRecord = self
            .client
            .get(format!("/repos/{}/{repo}", self.owner), None::<&()>)
            .await
            .map_err(GithubError::from_octocrab)?;
        Ok(raw.into_repository())
    }

    // ========================================================================
    // Webhooks
    // ========================================================================

    pub async fn list_hooks(&self, repo: &str) -> Result<Vec<Hook>, GithubError> {
        self.client
            .get(format!("/repos/{}/{repo}/hooks", self.owner), None::<&()>)
            .await
            .map_err(GithubError::from_octocrab)
    }

    pub async fn create_hook(&self, repo: &str, options: &HookOptions) -> Result<Hook, GithubError> {
        let hook: Hook = self
            .client
            .post(format!("/repos/{}/{repo}/hooks", self.owner), Some(options))
            .await
            .map_err(GithubError::from_octocrab)?;
        debug!(repo = %self.qualify(repo), hook_id = %hook.id, "created webhook");
        Ok(hook)
    }

    pub async fn update_hook(
        &self,
        repo: &str,
        hook_id: HookId,
        options: &HookOptions,
    ) -> Result<Hook, GithubError> {
        let hook: Hook = self
            .client
            .patch(
                format!("/repos/{}/{repo}/hooks/{hook_id}", self.owner),
                Some(options),
            )
            .await
            .map_err(GithubError::from_octocrab)?;
        debug!(repo = %self.qualify(repo), hook_id = %hook.id, "updated webhook");
        Ok(hook)
    }

    pub async fn delete_hook(&self, repo: &str, hook_id: HookId) -> Result<(), GithubError> {
        // DELETE returns 204 with an empty body, which the typed helpers
        // cannot deserialize.
        let response = self
            .client
            ._delete(
                format!("/repos/{}/{repo}/hooks/{hook_id}", self.owner),
                None::<&()>,
            )
            .await
            .map_err(GithubError::from_octocrab)?;

        if let Err(err) = octocrab::map_github_error(response).await {
            return Err(GithubError::from_octocrab(err));
        }
        debug!(repo = %self.qualify(repo), %hook_id, "deleted webhook");
        Ok(())
    }

    // ========================================================================
    // Issues
    // ========================================================================

    /// Issues in one state, across all pages. Pull requests arrive on the
    /// same endpoint and are dropped here by their `pull_request` marker.
    pub async fn list_issues(
        &self,
        repo: &str,
        state: IssueState,
    ) -> Result<Vec<Issue>, GithubError> {
        let full_name = self.qualify(repo);
        let mut issues = Vec::new();
        let mut page: u32 = 1;
        loop {
            let batch: Vec<RawIssueRecord> = self
                .client
                .get(
                    format!(
                        "/repos/{}/{repo}/issues?state={state}&per_page={PER_PAGE}&page={page}",
                        self.owner
                    ),
                    None::<&()>,
                )
                .await
                .map_err(GithubError::from_octocrab)?;

            let len = batch.len();
            issues.extend(
                batch
                    .into_iter()
                    .filter(|raw| raw.pull_request.is_none())
                    .map(|raw| raw.into_issue(full_name.clone())),
            );
            if len < PER_PAGE as usize {
                break;
            }
            page += 1;
        }
        Ok(issues)
    }

    pub async fn get_issue(&self, repo: &str, number: IssueNumber) -> Result<Issue, GithubError> {
        let raw: RawIssueRecord = self
            .client
            .get(
                format!("/repos/{}/{repo}/issues/{}", self.owner, number.0),
                None::<&()>,
            )
            .await
            .map_err(GithubError::from_octocrab)?;

        if raw.pull_request.is_some() {
            return Err(GithubError::NotFound(format!(
                "{}/{repo}#{} is a pull request, not an issue",
                self.owner, number.0
            )));
        }
        Ok(raw.into_issue(self.qualify(repo)))
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Hook wire types
// ============================================================================

/// Hook delivery configuration as GitHub stores it.
///
/// GitHub never echoes the secret back in responses, so it is optional on
/// the way in and omitted when absent on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    pub url: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default)]
    pub insecure_ssl: Option<String>,
}

/// A registered repository webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct Hook {
    pub id: HookId,
    pub active: bool,
    pub events: Vec<String>,
    pub config: HookConfig,
}

/// Body for hook create/update calls.
#[derive(Debug, Clone, Serialize)]
pub struct HookOptions {
    /// Always "web" for repository webhooks.
    pub name: &'static str,
    pub active: bool,
    pub events: Vec<String>,
    pub config: HookConfig,
}

// ============================================================================
// Repository / issue wire records
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepoRecord {
    id: GithubId,
    name: String,
    full_name: RepoFullName,
    description: Option<String>,
    html_url: String,
    private: bool,
    language: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    default_branch: String,
    #[serde(default)]
    topics: Vec<String>,
    owner: RawOwner,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
    id: GithubId,
    #[serde(rename = "type")]
    kind: String,
    avatar_url: Option<String>,
}

impl RawRepoRecord {
    fn into_repository(self) -> Repository {
        Repository {
            github_id: self.id,
            name: self.name,
            full_name: self.full_name,
            description: self.description.unwrap_or_default(),
            url: self.html_url,
            private: self.private,
            language: self.language,
            stars: self.stargazers_count,
            forks: self.forks_count,
            default_branch: self.default_branch,
            topics: self.topics,
            owner: RepoOwner {
                login: self.owner.login,
                id: self.owner.id,
                kind: self.owner.kind,
                avatar_url: self.owner.avatar_url,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
            // Locally owned fields; the caller carries forward any existing
            // watch state.
            webhook_active: false,
            webhook_settings: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawIssueRecord {
    id: GithubId,
    number: IssueNumber,
    title: String,
    body: Option<String>,
    state: IssueState,
    #[serde(default)]
    labels: Vec<RawLabel>,
    user: RawUserRef,
    assignee: Option<RawUserRef>,
    #[serde(default)]
    comments: u64,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    closed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    locked: bool,
    milestone: Option<RawMilestone>,
    html_url: String,
    /// Present when this record is actually a pull request.
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    id: GithubId,
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
struct RawUserRef {
    login: String,
    id: GithubId,
    avatar_url: Option<String>,
}

impl RawUserRef {
    fn into_user_ref(self) -> UserRef {
        UserRef {
            login: self.login,
            id: self.id,
            avatar_url: self.avatar_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMilestone {
    id: GithubId,
    number: u64,
    title: String,
    state: String,
}

impl RawIssueRecord {
    fn into_issue(self, repo: RepoFullName) -> Issue {
        Issue {
            github_id: self.id,
            number: self.number,
            repo,
            title: self.title,
            body: self.body.unwrap_or_default(),
            state: self.state,
            labels: self
                .labels
                .into_iter()
                .map(|l| Label {
                    id: l.id,
                    name: l.name,
                    color: l.color,
                })
                .collect(),
            author: self.user.into_user_ref(),
            assignee: self.assignee.map(RawUserRef::into_user_ref),
            comments: self.comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
            closed_at: self.closed_at,
            locked: self.locked,
            milestone: self.milestone.map(|m| Milestone {
                id: m.id,
                number: m.number,
                title: m.title,
                state: m.state,
            }),
            html_url: self.html_url,
        }
    }
}
