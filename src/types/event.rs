//! Append-only audit record for received webhook deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RepoFullName;

/// A verified webhook delivery, recorded before any dispatch decision.
///
/// Write-once: the store appends these and never mutates them. Every
/// verified delivery is recorded, including event types no renderer exists
/// for, so the audit trail is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWebhookEvent {
    pub event_type: String,
    /// Absent for deliveries without repository context.
    pub repo: Option<RepoFullName>,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl RawWebhookEvent {
    pub fn new(
        event_type: impl Into<String>,
        repo: Option<RepoFullName>,
        payload: serde_json::Value,
    ) -> Self {
        RawWebhookEvent {
            event_type: event_type.into(),
            repo,
            payload,
            received_at: Utc::now(),
        }
    }
}
