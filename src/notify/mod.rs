//! Notification rendering and delivery.
//!
//! This module turns typed webhook events into renderable notifications and
//! hands them to a [`NotificationSink`]. Composition is pure and total:
//! every recognized event shape, including ones with missing optional
//! fields, produces a valid notification. Delivery is best-effort and
//! at-most-once; the provider's own webhook retry covers transport loss.

pub mod composer;
pub mod sink;

pub use composer::compose;
pub use sink::{DiscordSink, NotificationSink, SinkError};

use serde::{Deserialize, Serialize};

/// Embed color palette, matching the bridge's chat rendering conventions.
pub mod colors {
    /// Green: pushes, merged PRs, branch creation.
    pub const SUCCESS: u32 = 0x00ff00;
    /// Red: closed-unmerged PRs, branch deletion.
    pub const ERROR: u32 = 0xff0000;
    /// Yellow: open pull requests.
    pub const WARNING: u32 = 0xffff00;
    /// Blue: issues.
    pub const INFO: u32 = 0x0000ff;
    /// Blurple: releases and everything state-neutral.
    pub const DEFAULT: u32 = 0x7289da;
}

/// A name/value pair rendered inside a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Author line of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

/// An ephemeral, render-only notification. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub url: Option<String>,
    pub fields: Vec<NotificationField>,
    pub author: NotificationAuthor,
    pub footer: String,
}
