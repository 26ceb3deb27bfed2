//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON into typed [`GithubEvent`] values. Designed to be
//! robust against unknown fields and event types.
//!
//! # Parsing strategy
//!
//! 1. The event type comes from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types return `Ok(None)` (ignored, not an error) - this
//!    includes the reserved-but-inert workflow/check/deployment/status types
//! 4. `create`/`delete` events whose `ref_type` is not `branch` return
//!    `Ok(None)` as well
//! 5. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::RepoFullName;

use super::events::{
    BranchEvent, GithubEvent, IssueAction, IssuesEvent, PullRequestAction, PullRequestEvent,
    PushEvent, PushedCommit, ReleaseAction, ReleaseEvent, Sender,
};

/// Event types we accept and persist but never render.
///
/// These are part of the hook subscription so the audit trail captures
/// them; no notification composer exists for them yet.
pub const INERT_EVENT_TYPES: &[&str] = &[
    "workflow_run",
    "workflow_job",
    "check_run",
    "deployment",
    "deployment_status",
    "status",
];

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Field has an invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// # Returns
///
/// * `Ok(Some(event))` - successfully parsed a renderable event
/// * `Ok(None)` - unknown/inert event type, or a sub-filter rejected it
/// * `Err(e)` - malformed payload or missing required fields
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GithubEvent>, ParseError> {
    match event_type {
        "push" => parse_push(payload).map(|e| Some(GithubEvent::Push(e))),
        "pull_request" => parse_pull_request(payload).map(|opt| opt.map(GithubEvent::PullRequest)),
        "issues" => parse_issues(payload).map(|opt| opt.map(GithubEvent::Issues)),
        "release" => parse_release(payload).map(|opt| opt.map(GithubEvent::Release)),
        "create" => parse_branch(payload).map(|opt| opt.map(GithubEvent::BranchCreate)),
        "delete" => parse_branch(payload).map(|opt| opt.map(GithubEvent::BranchDelete)),
        // Inert and unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON. Option<T> is used liberally for fields
// GitHub omits in some payload variants; required fields are validated
// explicitly after deserialization.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: String,
    html_url: Option<String>,
}

impl RawRepository {
    fn full_name(&self) -> Result<RepoFullName, ParseError> {
        RepoFullName::parse(&self.full_name).map_err(|_| ParseError::InvalidField {
            field: "repository.full_name",
            value: self.full_name.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
    avatar_url: Option<String>,
}

impl RawUser {
    fn into_sender(self) -> Sender {
        Sender {
            name: self.login,
            avatar_url: self.avatar_url,
        }
    }
}

// ============================================================================
// push event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    compare: Option<String>,
    #[serde(default)]
    commits: Vec<RawCommit>,
    pusher: RawPusher,
    sender: Option<RawUser>,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    id: String,
    message: String,
}

/// `pusher` carries a git identity (name/email), not an API user.
#[derive(Debug, Deserialize)]
struct RawPusher {
    name: String,
}

fn parse_push(payload: &[u8]) -> Result<PushEvent, ParseError> {
    let raw: RawPushPayload = serde_json::from_slice(payload)?;

    // The avatar comes from the API-level sender, the display name from the
    // git-level pusher, matching how the provider populates the two.
    let avatar_url = raw.sender.and_then(|s| s.avatar_url);

    Ok(PushEvent {
        repo: raw.repository.full_name()?,
        git_ref: raw.git_ref,
        commits: raw
            .commits
            .into_iter()
            .map(|c| PushedCommit {
                id: c.id,
                message: c.message,
            })
            .collect(),
        compare_url: raw.compare,
        pusher: Sender {
            name: raw.pusher.name,
            avatar_url,
        },
    })
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    merged: Option<bool>,
    head: RawRef,
    base: RawRef,
    additions: Option<u64>,
    deletions: Option<u64>,
    html_url: String,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

fn parse_pull_request(payload: &[u8]) -> Result<Option<PullRequestEvent>, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "opened" => PullRequestAction::Opened,
        "closed" => PullRequestAction::Closed,
        "reopened" => PullRequestAction::Reopened,
        "edited" => PullRequestAction::Edited,
        "synchronize" => PullRequestAction::Synchronize,
        // Other actions (labeled, assigned, review_requested, ...) are not rendered
        _ => return Ok(None),
    };

    Ok(Some(PullRequestEvent {
        repo: raw.repository.full_name()?,
        action,
        number: raw.pull_request.number,
        title: raw.pull_request.title,
        body: raw.pull_request.body,
        state: raw.pull_request.state,
        merged: raw.pull_request.merged.unwrap_or(false),
        head_branch: raw.pull_request.head.ref_name,
        base_branch: raw.pull_request.base.ref_name,
        additions: raw.pull_request.additions.unwrap_or(0),
        deletions: raw.pull_request.deletions.unwrap_or(0),
        html_url: raw.pull_request.html_url,
        author: raw.pull_request.user.into_sender(),
    }))
}

// ============================================================================
// issues event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssuesPayload {
    action: String,
    issue: RawIssue,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    #[serde(default)]
    labels: Vec<RawLabel>,
    assignee: Option<RawUser>,
    html_url: String,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

fn parse_issues(payload: &[u8]) -> Result<Option<IssuesEvent>, ParseError> {
    let raw: RawIssuesPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "opened" => IssueAction::Opened,
        "closed" => IssueAction::Closed,
        "reopened" => IssueAction::Reopened,
        "edited" => IssueAction::Edited,
        // labeled/assigned/milestoned etc. are not rendered
        _ => return Ok(None),
    };

    Ok(Some(IssuesEvent {
        repo: raw.repository.full_name()?,
        action,
        number: raw.issue.number,
        title: raw.issue.title,
        body: raw.issue.body,
        state: raw.issue.state,
        labels: raw.issue.labels.into_iter().map(|l| l.name).collect(),
        assignee: raw.issue.assignee.map(|u| u.login),
        html_url: raw.issue.html_url,
        author: raw.issue.user.into_sender(),
    }))
}

// ============================================================================
// release event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawReleasePayload {
    action: String,
    release: RawRelease,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    tag_name: String,
    body: Option<String>,
    prerelease: bool,
    published_at: Option<String>,
    html_url: String,
    author: RawUser,
}

fn parse_release(payload: &[u8]) -> Result<Option<ReleaseEvent>, ParseError> {
    let raw: RawReleasePayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "published" => ReleaseAction::Published,
        "created" => ReleaseAction::Created,
        "released" => ReleaseAction::Released,
        // prereleased/edited/deleted are not rendered
        _ => return Ok(None),
    };

    Ok(Some(ReleaseEvent {
        repo: raw.repository.full_name()?,
        action,
        tag_name: raw.release.tag_name,
        body: raw.release.body,
        prerelease: raw.release.prerelease,
        published_at: raw.release.published_at,
        html_url: raw.release.html_url,
        author: raw.release.author.into_sender(),
    }))
}

// ============================================================================
// create / delete events (branch filter)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawBranchPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    ref_type: String,
    sender: RawUser,
    repository: RawRepository,
}

fn parse_branch(payload: &[u8]) -> Result<Option<BranchEvent>, ParseError> {
    let raw: RawBranchPayload = serde_json::from_slice(payload)?;

    // Tags also arrive on create/delete; only branches are rendered.
    if raw.ref_type != "branch" {
        return Ok(None);
    }

    let repo_html_url = raw.repository.html_url.clone().unwrap_or_default();

    Ok(Some(BranchEvent {
        repo: raw.repository.full_name()?,
        branch: raw.git_ref,
        repo_html_url,
        sender: raw.sender.into_sender(),
    }))
}
