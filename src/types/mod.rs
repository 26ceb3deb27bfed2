//! Core domain types for the notification bridge.
//!
//! This module contains the fundamental types used throughout the
//! application, designed to encode invariants via the type system.

pub mod event;
pub mod ids;
pub mod issue;
pub mod repository;

// Re-export commonly used types at the module level
pub use event::RawWebhookEvent;
pub use ids::{ChannelId, GithubId, HookId, InvalidRepoFullName, IssueNumber, RepoFullName};
pub use issue::{Issue, IssueState, Label, Milestone, UserRef};
pub use repository::{RepoOwner, Repository, WebhookSettings};
