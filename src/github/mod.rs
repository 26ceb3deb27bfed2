//! GitHub API access: client wrapper, error taxonomy, and webhook
//! reconciliation.

pub mod client;
pub mod error;
pub mod hooks;

pub use client::{GithubClient, Hook, HookConfig, HookOptions};
pub use error::GithubError;
pub use hooks::{
    EnsureOutcome, HookReconciler, HookStatus, ReconcileError, DEFAULT_HOOK_EVENTS,
};
