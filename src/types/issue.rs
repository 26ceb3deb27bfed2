//! The locally mirrored issue record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GithubId, IssueNumber, RepoFullName};

/// Issue lifecycle state.
///
/// Transitions only ever move `Open -> Closed` or `Closed -> Open` on the
/// provider side; the mirror never invents a transition locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

/// A label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: GithubId,
    pub name: String,
    pub color: String,
}

/// Minimal user reference (author, assignee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub login: String,
    pub id: GithubId,
    pub avatar_url: Option<String>,
}

/// Milestone reference, when the issue has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: GithubId,
    pub number: u64,
    pub title: String,
    pub state: String,
}

/// An issue mirrored from the provider.
///
/// Identity is the compound `(repo, github_id)`; GitHub issue IDs are only
/// unique within a repository namespace, so upserts must never key on the
/// ID alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub github_id: GithubId,
    pub number: IssueNumber,
    pub repo: RepoFullName,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    pub labels: Vec<Label>,
    pub author: UserRef,
    pub assignee: Option<UserRef>,
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub locked: bool,
    pub milestone: Option<Milestone>,
    pub html_url: String,
}

impl Issue {
    /// The compound identity key used for upserts.
    pub fn identity(&self) -> (RepoFullName, GithubId) {
        (self.repo.clone(), self.github_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_state_serde_is_snake_case() {
        assert_eq!(serde_json::to_string(&IssueState::Open).unwrap(), "\"open\"");
        let back: IssueState = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(back, IssueState::Closed);
    }

    #[test]
    fn issue_state_display() {
        assert_eq!(IssueState::Open.to_string(), "open");
        assert_eq!(IssueState::Closed.to_string(), "closed");
    }
}
