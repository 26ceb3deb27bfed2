//! Routes verified webhook deliveries: record first, then notify.
//!
//! The audit trail is written before any dispatch decision, so a delivery
//! that later fails to render or send is still on record. Delivery is
//! at-most-once: a sink failure is logged and reported in the outcome, never
//! retried.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::notify::{compose, NotificationSink};
use crate::store::{EventStore, StoreError};
use crate::types::{ChannelId, RawWebhookEvent, RepoFullName};

use super::parser::parse_webhook;

/// What happened to one verified delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A notification was rendered and delivered.
    Dispatched,
    /// Recorded, but nothing to deliver: inert event type, filtered action,
    /// or unparseable payload.
    Ignored,
    /// A notification was rendered but the sink refused it. Recorded; not
    /// retried.
    DispatchFailed,
}

/// Persist-then-dispatch pipeline for verified deliveries.
pub struct EventRouter {
    events: Arc<dyn EventStore>,
    sink: Arc<dyn NotificationSink>,
    default_channel: Option<ChannelId>,
}

impl EventRouter {
    pub fn new(
        events: Arc<dyn EventStore>,
        sink: Arc<dyn NotificationSink>,
        default_channel: Option<ChannelId>,
    ) -> Self {
        EventRouter {
            events,
            sink,
            default_channel,
        }
    }

    /// Handle one verified delivery. The only error surfaced to the caller
    /// is a failed audit-trail write; everything downstream of the record is
    /// contained and reflected in the outcome.
    pub async fn route(&self, event_type: &str, body: &[u8]) -> Result<RouteOutcome, StoreError> {
        let payload: Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(event_type, %error, "discarding delivery with non-JSON body");
                return Ok(RouteOutcome::Ignored);
            }
        };

        let repo = payload
            .pointer("/repository/full_name")
            .and_then(Value::as_str)
            .and_then(|name| RepoFullName::parse(name).ok());

        self.events
            .record(RawWebhookEvent::new(event_type, repo, payload))
            .await?;

        let event = match parse_webhook(event_type, body) {
            Ok(Some(event)) => event,
            Ok(None) => {
                info!(event_type, "delivery recorded, nothing to notify");
                return Ok(RouteOutcome::Ignored);
            }
            Err(error) => {
                warn!(event_type, %error, "delivery recorded but payload did not parse");
                return Ok(RouteOutcome::Ignored);
            }
        };

        let notification = compose(&event);
        match self
            .sink
            .send(self.default_channel.as_ref(), &notification)
            .await
        {
            Ok(()) => {
                info!(
                    event_type,
                    repo = %event.repo(),
                    title = %notification.title,
                    "notification dispatched"
                );
                Ok(RouteOutcome::Dispatched)
            }
            Err(error) => {
                warn!(
                    event_type,
                    repo = %event.repo(),
                    %error,
                    "notification dispatch failed"
                );
                Ok(RouteOutcome::DispatchFailed)
            }
        }
    }
}
