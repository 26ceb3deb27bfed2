//! Typed GitHub webhook events.
//!
//! One tagged variant per recognized event type, with exhaustive matching
//! downstream. Event types the bridge does not render (workflow, check,
//! deployment, status) and unknown types are represented by the parser
//! returning `None`: the raw delivery is still persisted for audit, but no
//! notification is composed.
//!
//! # Recognized events
//!
//! - `push` - commits pushed to a ref
//! - `pull_request` - PR lifecycle (opened, closed/merged, reopened, ...)
//! - `issues` - issue lifecycle
//! - `release` - release published/created
//! - `create` / `delete` - branch created/deleted (`ref_type == "branch"` only)

use serde::{Deserialize, Serialize};

use crate::types::RepoFullName;

/// A parsed GitHub webhook event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GithubEvent {
    /// Commits were pushed to a branch or tag.
    Push(PushEvent),

    /// A pull request was opened, closed, reopened, edited, or updated.
    PullRequest(PullRequestEvent),

    /// An issue was opened, closed, reopened, or edited.
    Issues(IssuesEvent),

    /// A release was published or created.
    Release(ReleaseEvent),

    /// A branch was created.
    ///
    /// GitHub's `create` event also fires for tags; the parser filters
    /// those out (`ref_type` must be `branch`).
    BranchCreate(BranchEvent),

    /// A branch was deleted. Tag deletions are filtered like creations.
    BranchDelete(BranchEvent),
}

impl GithubEvent {
    /// Returns the repository this event belongs to.
    pub fn repo(&self) -> &RepoFullName {
        match self {
            GithubEvent::Push(e) => &e.repo,
            GithubEvent::PullRequest(e) => &e.repo,
            GithubEvent::Issues(e) => &e.repo,
            GithubEvent::Release(e) => &e.repo,
            GithubEvent::BranchCreate(e) => &e.repo,
            GithubEvent::BranchDelete(e) => &e.repo,
        }
    }

    /// Short label for the event kind, used in logs and footers.
    pub fn kind(&self) -> &'static str {
        match self {
            GithubEvent::Push(_) => "commit",
            GithubEvent::PullRequest(_) => "pull_request",
            GithubEvent::Issues(_) => "issue",
            GithubEvent::Release(_) => "release",
            GithubEvent::BranchCreate(_) => "create",
            GithubEvent::BranchDelete(_) => "delete",
        }
    }
}

/// Actor rendered in a notification's author line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub name: String,
    pub avatar_url: Option<String>,
}

/// A single commit within a push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushedCommit {
    /// Full commit SHA.
    pub id: String,
    /// First line and beyond of the commit message.
    pub message: String,
}

impl PushedCommit {
    /// Short (7-character) SHA for display.
    ///
    /// `get` rather than slicing: deserialized input may be shorter than
    /// seven bytes or land off a char boundary.
    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }
}

/// A `push` webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub repo: RepoFullName,
    /// The full git ref that was pushed to (e.g., `refs/heads/main`).
    pub git_ref: String,
    pub commits: Vec<PushedCommit>,
    /// Provider compare URL covering the pushed range.
    pub compare_url: Option<String>,
    pub pusher: Sender,
}

/// Action performed on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Closed,
    Reopened,
    Edited,
    Synchronize,
}

impl PullRequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestAction::Opened => "opened",
            PullRequestAction::Closed => "closed",
            PullRequestAction::Reopened => "reopened",
            PullRequestAction::Edited => "edited",
            PullRequestAction::Synchronize => "synchronize",
        }
    }
}

/// A `pull_request` webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub repo: RepoFullName,
    pub action: PullRequestAction,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    /// `open` or `closed` as reported by the provider.
    pub state: String,
    /// True when the PR was merged. Only meaningful with `action == Closed`:
    /// closed-with-merge and closed-without-merge render differently.
    pub merged: bool,
    pub head_branch: String,
    pub base_branch: String,
    pub additions: u64,
    pub deletions: u64,
    pub html_url: String,
    pub author: Sender,
}

impl PullRequestEvent {
    /// A closed PR that was merged, as opposed to closed-unmerged.
    pub fn is_merged(&self) -> bool {
        self.action == PullRequestAction::Closed && self.merged
    }
}

/// Action performed on an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    Opened,
    Closed,
    Reopened,
    Edited,
}

impl IssueAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueAction::Opened => "opened",
            IssueAction::Closed => "closed",
            IssueAction::Reopened => "reopened",
            IssueAction::Edited => "edited",
        }
    }
}

/// An `issues` webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuesEvent {
    pub repo: RepoFullName,
    pub action: IssueAction,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    pub html_url: String,
    pub author: Sender,
}

/// Action performed on a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseAction {
    Published,
    Created,
    Released,
}

impl ReleaseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseAction::Published => "published",
            ReleaseAction::Created => "created",
            ReleaseAction::Released => "released",
        }
    }
}

/// A `release` webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub repo: RepoFullName,
    pub action: ReleaseAction,
    pub tag_name: String,
    pub body: Option<String>,
    pub prerelease: bool,
    pub published_at: Option<String>,
    pub html_url: String,
    pub author: Sender,
}

/// A branch `create` or `delete` event (already filtered to branches).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEvent {
    pub repo: RepoFullName,
    /// The branch name (GitHub sends the short ref here, not `refs/heads/`).
    pub branch: String,
    /// Repository home page, used to build the notification link.
    pub repo_html_url: String,
    pub sender: Sender,
}
