//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., using a
//! GitHub-assigned numeric ID where an issue number is expected) and make the
//! code more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A GitHub-assigned numeric identifier.
///
/// These are globally unique for repositories, but for issues they are only
/// unique within a repository namespace, which is why issue identity is the
/// compound `(GithubId, RepoFullName)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GithubId(pub u64);

impl fmt::Display for GithubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GithubId {
    fn from(n: u64) -> Self {
        GithubId(n)
    }
}

/// An issue number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(pub u64);

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for IssueNumber {
    fn from(n: u64) -> Self {
        IssueNumber(n)
    }
}

/// A provider-assigned webhook registration ID, scoped to a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookId(pub u64);

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for HookId {
    fn from(n: u64) -> Self {
        HookId(n)
    }
}

/// A chat channel identifier (notification destination).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(s: impl Into<String>) -> Self {
        ChannelId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        ChannelId(s)
    }
}

/// Error returned when a repository full name is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid repository full name (expected owner/name): {0}")]
pub struct InvalidRepoFullName(pub String);

/// A repository full name in `owner/name` form.
///
/// The full name is the human-facing unique key for a repository; the
/// immutable identity is its [`GithubId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoFullName(String);

impl RepoFullName {
    /// Builds a full name from owner and repository name.
    pub fn new(owner: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        RepoFullName(format!("{}/{}", owner.as_ref(), name.as_ref()))
    }

    /// Parses an `owner/name` string, rejecting anything without exactly
    /// one `/` separating two non-empty components.
    pub fn parse(s: &str) -> Result<Self, InvalidRepoFullName> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoFullName(s.to_string()))
            }
            _ => Err(InvalidRepoFullName(s.to_string())),
        }
    }

    /// Returns the owner component.
    pub fn owner(&self) -> &str {
        // Invariant: constructed with exactly one '/'.
        self.0.split_once('/').map(|(o, _)| o).unwrap_or(&self.0)
    }

    /// Returns the repository-name component.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, n)| n).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
