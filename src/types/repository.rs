//! The locally mirrored repository record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ChannelId, GithubId, RepoFullName};

/// Owner reference embedded in a repository record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
    pub id: GithubId,
    /// "User" or "Organization".
    #[serde(rename = "type")]
    pub kind: String,
    pub avatar_url: Option<String>,
}

/// Webhook destination binding stored alongside a watched repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Event types the remote hook subscribes to.
    pub events: Vec<String>,
    /// Channel that notifications for this repository are delivered to.
    pub channel_id: Option<ChannelId>,
}

/// A repository mirrored from the provider.
///
/// The mirror keys repositories by `full_name`, the same handle callers
/// address them by. A provider-side rename therefore shows up as a new
/// record; the stale one remains until explicitly deleted.
///
/// `webhook_active` and `webhook_settings` are locally owned: the sync
/// engine's full-replace upsert must carry them forward explicitly rather
/// than overwrite them with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub github_id: GithubId,
    pub name: String,
    pub full_name: RepoFullName,
    pub description: String,
    pub url: String,
    pub private: bool,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub default_branch: String,
    pub topics: Vec<String>,
    pub owner: RepoOwner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whether our webhook is registered and active on the remote repository.
    #[serde(default)]
    pub webhook_active: bool,
    #[serde(default)]
    pub webhook_settings: Option<WebhookSettings>,
}

impl Repository {
    /// Copies the locally owned webhook fields from an existing record.
    ///
    /// Used by the sync engine so a full-replace upsert does not reset the
    /// watch state established by the reconciler.
    pub fn carry_local_fields_from(mut self, existing: &Repository) -> Self {
        self.webhook_active = existing.webhook_active;
        self.webhook_settings = existing.webhook_settings.clone();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repo(full_name: &str) -> Repository {
        let parsed = RepoFullName::parse(full_name).unwrap();
        Repository {
            github_id: GithubId(1),
            name: parsed.name().to_string(),
            full_name: parsed,
            description: String::new(),
            url: format!("https://github.com/{full_name}"),
            private: false,
            language: Some("Rust".to_string()),
            stars: 0,
            forks: 0,
            default_branch: "main".to_string(),
            topics: vec![],
            owner: RepoOwner {
                login: "acme".to_string(),
                id: GithubId(7),
                kind: "User".to_string(),
                avatar_url: None,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
            webhook_active: false,
            webhook_settings: None,
        }
    }

    #[test]
    fn carry_local_fields_preserves_watch_state() {
        let mut existing = sample_repo("acme/widgets");
        existing.webhook_active = true;
        existing.webhook_settings = Some(WebhookSettings {
            events: vec!["push".to_string()],
            channel_id: Some(ChannelId::new("123")),
        });

        let fresh = sample_repo("acme/widgets").carry_local_fields_from(&existing);

        assert!(fresh.webhook_active);
        assert_eq!(fresh.webhook_settings, existing.webhook_settings);
    }
}
