//! Webhook reconciliation.
//!
//! `ensure` converges a repository's remote hook onto the desired shape
//! instead of blindly creating: an existing hook is identified by its
//! callback URL, updated in place when its settings drift, and left alone
//! when they already match. Running it twice never produces two hooks.

use std::sync::Arc;

use tracing::{debug, info};

use crate::store::{RepositoryStore, StoreError};
use crate::types::{ChannelId, HookId, WebhookSettings};

use super::client::{GithubClient, Hook, HookConfig, HookOptions};
use super::error::GithubError;

/// Event types registered on every managed hook.
///
/// Deliberately a superset of what the notifier renders: the audit trail
/// records everything, and adding a renderer later needs no hook update.
pub const DEFAULT_HOOK_EVENTS: &[&str] = &[
    "push",
    "pull_request",
    "issues",
    "release",
    "create",
    "delete",
    "workflow_run",
    "workflow_job",
    "check_run",
    "deployment",
    "deployment_status",
    "status",
];

/// Error from a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The repository to be watched does not exist under the owner.
    #[error("repository {0} does not exist")]
    RepositoryNotFound(String),

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What `ensure` ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    Updated,
    /// The remote hook already matched the desired shape.
    Unchanged,
}

/// Remote hook status as reported by `check`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HookStatus {
    pub registered: bool,
    pub hook_id: Option<HookId>,
    pub active: bool,
    pub events: Vec<String>,
}

/// Converges remote hooks and the local watch state.
pub struct HookReconciler {
    client: GithubClient,
    repos: Arc<dyn RepositoryStore>,
    callback_url: String,
    secret: String,
}

impl HookReconciler {
    pub fn new(
        client: GithubClient,
        repos: Arc<dyn RepositoryStore>,
        callback_url: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        HookReconciler {
            client,
            repos,
            callback_url: callback_url.into(),
            secret: secret.into(),
        }
    }

    /// Ensures the repository has exactly one hook pointing at our callback
    /// URL with the desired events, then records the watch locally.
    pub async fn ensure(
        &self,
        repo: &str,
        events: Option<Vec<String>>,
        channel: Option<ChannelId>,
    ) -> Result<EnsureOutcome, ReconcileError> {
        let desired_events = events.unwrap_or_else(default_events);

        // Confirm the repository itself exists before touching its hooks, so
        // a typo'd name gets a precise error instead of a hook-listing 404.
        if let Err(err) = self.client.get_repository(repo).await {
            if err.is_not_found() {
                return Err(ReconcileError::RepositoryNotFound(repo.to_string()));
            }
            return Err(err.into());
        }

        let existing = self.find_our_hook(repo).await?;
        let outcome = match existing {
            Some(hook) if hook_converged(&hook, &desired_events) => {
                debug!(repo, hook_id = %hook.id, "hook already converged");
                EnsureOutcome::Unchanged
            }
            Some(hook) => {
                let options = self.desired_options(desired_events.clone());
                self.client.update_hook(repo, hook.id, &options).await?;
                info!(repo, hook_id = %hook.id, "hook updated in place");
                EnsureOutcome::Updated
            }
            None => {
                let options = self.desired_options(desired_events.clone());
                let hook = self.client.create_hook(repo, &options).await?;
                info!(repo, hook_id = %hook.id, "hook created");
                EnsureOutcome::Created
            }
        };

        self.record_watch(repo, true, Some(desired_events), channel)
            .await?;
        Ok(outcome)
    }

    /// Removes our hook from the repository, if present, and clears the
    /// local watch state either way.
    pub async fn remove(&self, repo: &str) -> Result<bool, ReconcileError> {
        let removed = match self.find_our_hook(repo).await? {
            Some(hook) => {
                self.client.delete_hook(repo, hook.id).await?;
                info!(repo, hook_id = %hook.id, "hook removed");
                true
            }
            None => {
                debug!(repo, "no hook to remove");
                false
            }
        };

        self.record_watch(repo, false, None, None).await?;
        Ok(removed)
    }

    /// Reports the remote hook status without changing anything.
    pub async fn check(&self, repo: &str) -> Result<HookStatus, ReconcileError> {
        Ok(match self.find_our_hook(repo).await? {
            Some(hook) => HookStatus {
                registered: true,
                hook_id: Some(hook.id),
                active: hook.active,
                events: hook.events,
            },
            None => HookStatus {
                registered: false,
                hook_id: None,
                active: false,
                events: Vec::new(),
            },
        })
    }

    /// Our hook among the repository's hooks, identified by callback URL.
    async fn find_our_hook(&self, repo: &str) -> Result<Option<Hook>, GithubError> {
        let hooks = self.client.list_hooks(repo).await?;
        Ok(hooks
            .into_iter()
            .find(|hook| hook.config.url == self.callback_url))
    }

    fn desired_options(&self, events: Vec<String>) -> HookOptions {
        HookOptions {
            name: "web",
            active: true,
            events,
            config: HookConfig {
                url: self.callback_url.clone(),
                content_type: "json".to_string(),
                secret: Some(self.secret.clone()),
                insecure_ssl: Some("0".to_string()),
            },
        }
    }

    /// Updates the locally mirrored repository's watch fields.
    async fn record_watch(
        &self,
        repo: &str,
        active: bool,
        events: Option<Vec<String>>,
        channel: Option<ChannelId>,
    ) -> Result<(), ReconcileError> {
        let full_name = crate::types::RepoFullName::new(self.client.owner(), repo);
        let mut record = match self.repos.get(&full_name).await? {
            Some(record) => record,
            // Watch requests can arrive before the first repository sync;
            // fetch the record so the watch state has somewhere to live.
            None => self.client.get_repository(repo).await?,
        };

        record.webhook_active = active;
        record.webhook_settings = if active {
            Some(WebhookSettings {
                events: events.unwrap_or_else(default_events),
                channel_id: channel,
            })
        } else {
            None
        };
        self.repos.upsert(record).await?;
        Ok(())
    }
}

fn default_events() -> Vec<String> {
    DEFAULT_HOOK_EVENTS.iter().map(|s| s.to_string()).collect()
}

/// A hook is converged when it is active, delivers JSON payloads, and
/// carries exactly the desired event set. The callback URL was already
/// matched during lookup.
fn hook_converged(hook: &Hook, desired_events: &[String]) -> bool {
    hook.active
        && hook.config.content_type == "json"
        && events_match(&hook.events, desired_events)
}

/// Order-insensitive event list comparison.
fn events_match(current: &[String], desired: &[String]) -> bool {
    if current.len() != desired.len() {
        return false;
    }
    let mut current: Vec<&str> = current.iter().map(String::as_str).collect();
    let mut desired: Vec<&str> = desired.iter().map(String::as_str).collect();
    current.sort_unstable();
    desired.sort_unstable();
    current == desired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_match_is_order_insensitive() {
        let current = vec!["push".to_string(), "issues".to_string()];
        let desired = vec!["issues".to_string(), "push".to_string()];
        assert!(events_match(&current, &desired));
    }

    #[test]
    fn events_match_rejects_subsets() {
        let current = vec!["push".to_string()];
        let desired = vec!["push".to_string(), "issues".to_string()];
        assert!(!events_match(&current, &desired));
        assert!(!events_match(&desired, &current));
    }

    fn hook(active: bool, content_type: &str, events: &[&str]) -> Hook {
        Hook {
            id: HookId(42),
            active,
            events: events.iter().map(|s| s.to_string()).collect(),
            config: HookConfig {
                url: "https://bridge.example.test/webhooks/github".to_string(),
                content_type: content_type.to_string(),
                secret: None,
                insecure_ssl: None,
            },
        }
    }

    #[test]
    fn matching_hook_is_converged() {
        let desired = vec!["push".to_string(), "issues".to_string()];
        assert!(hook_converged(&hook(true, "json", &["issues", "push"]), &desired));
    }

    #[test]
    fn drifted_content_type_is_not_converged() {
        let desired = vec!["push".to_string()];
        assert!(!hook_converged(&hook(true, "form", &["push"]), &desired));
    }

    #[test]
    fn inactive_hook_is_not_converged() {
        let desired = vec!["push".to_string()];
        assert!(!hook_converged(&hook(false, "json", &["push"]), &desired));
    }

    #[test]
    fn default_events_cover_all_rendered_types() {
        for rendered in ["push", "pull_request", "issues", "release", "create", "delete"] {
            assert!(
                DEFAULT_HOOK_EVENTS.contains(&rendered),
                "{rendered} must be subscribed"
            );
        }
    }
}
