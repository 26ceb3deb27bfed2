//! The notification sink seam.
//!
//! The chat client is an external collaborator: the bridge only needs a
//! `send(destination, notification)` contract. Production uses
//! [`DiscordSink`], which posts an embed to a Discord webhook URL; tests
//! inject a recording fake.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::types::ChannelId;

use super::Notification;

/// Error delivering a notification.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The destination rejected the notification.
    #[error("notification destination rejected delivery (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Transport-level failure reaching the destination.
    #[error("failed to reach notification destination: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Anything that can deliver a composed notification to a channel.
///
/// Failures are surfaced loudly to the caller; the caller logs and
/// continues (at-most-once delivery, no retry queue).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, channel: Option<&ChannelId>, notification: &Notification)
        -> Result<(), SinkError>;
}

/// Discord webhook embed wire format.
#[derive(Debug, Serialize)]
struct DiscordEmbed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    fields: Vec<DiscordEmbedField<'a>>,
    author: DiscordEmbedAuthor<'a>,
    footer: DiscordEmbedFooter<'a>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct DiscordEmbedAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbedFooter<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct DiscordWebhookBody<'a> {
    embeds: [DiscordEmbed<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_id: Option<&'a str>,
}

/// Sink posting notifications to a Discord webhook URL.
pub struct DiscordSink {
    http: reqwest::Client,
    webhook_url: String,
}

impl DiscordSink {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        DiscordSink {
            http: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordSink {
    async fn send(
        &self,
        channel: Option<&ChannelId>,
        notification: &Notification,
    ) -> Result<(), SinkError> {
        let body = DiscordWebhookBody {
            embeds: [DiscordEmbed {
                title: &notification.title,
                description: &notification.description,
                color: notification.color,
                url: notification.url.as_deref(),
                fields: notification
                    .fields
                    .iter()
                    .map(|f| DiscordEmbedField {
                        name: &f.name,
                        value: &f.value,
                        inline: f.inline,
                    })
                    .collect(),
                author: DiscordEmbedAuthor {
                    name: &notification.author.name,
                    icon_url: notification.author.icon_url.as_deref(),
                },
                footer: DiscordEmbedFooter {
                    text: &notification.footer,
                },
            }],
            thread_id: channel.map(ChannelId::as_str),
        };

        let response = self.http.post(&self.webhook_url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        debug!(title = %notification.title, "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    //! Recording sink for tests.

    use std::sync::Mutex;

    use super::*;

    /// Test sink that records every send, optionally failing each one.
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<(Option<ChannelId>, Notification)>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            RecordingSink {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().expect("sink mutex poisoned").len()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(
            &self,
            channel: Option<&ChannelId>,
            notification: &Notification,
        ) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Rejected {
                    status: 502,
                    message: "simulated failure".to_string(),
                });
            }
            self.sent
                .lock()
                .expect("sink mutex poisoned")
                .push((channel.cloned(), notification.clone()));
            Ok(())
        }
    }
}
