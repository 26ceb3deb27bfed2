//! Service configuration, read from the environment at startup.
//!
//! Every required variable produces its own error message so an operator
//! can tell exactly which one is missing. The webhook secret in particular
//! is a hard startup requirement: without it the service cannot securely
//! accept events, so the failure happens here rather than at first
//! delivery.

use std::env;
use thiserror::Error;

use crate::types::ChannelId;

/// Error raised when configuration cannot be assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// A variable is present but cannot be parsed.
    #[error("environment variable {var} has invalid value {value:?}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Runtime configuration for the service.
#[derive(Clone)]
pub struct Config {
    /// GitHub API token.
    pub github_token: String,
    /// Account whose repositories are watched and mirrored.
    pub github_owner: String,
    /// Shared secret for webhook signature verification. Registered
    /// verbatim on remote hooks.
    pub webhook_secret: String,
    /// Externally reachable base URL of this service. The hook callback
    /// URL is derived from it, never hard-coded.
    pub public_base_url: String,
    /// Discord webhook URL that notifications are posted to.
    pub discord_webhook_url: String,
    /// Default channel recorded on watched repositories.
    pub default_channel: Option<ChannelId>,
    /// Listen port.
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let github_token = require("GITHUB_TOKEN")?;
        let github_owner = require("GITHUB_OWNER")?;
        let webhook_secret = require("GITHUB_WEBHOOK_SECRET")?;
        let public_base_url = normalize_base_url(require("PUBLIC_BASE_URL")?)?;
        let discord_webhook_url = require("DISCORD_WEBHOOK_URL")?;

        let default_channel = env::var("DISCORD_CHANNEL_ID")
            .ok()
            .filter(|s| !s.is_empty())
            .map(ChannelId::new);

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidVar {
                var: "PORT",
                value: raw,
                reason: "must be a valid port number",
            })?,
            Err(_) => 3000,
        };

        Ok(Config {
            github_token,
            github_owner,
            webhook_secret,
            public_base_url,
            discord_webhook_url,
            default_channel,
            port,
        })
    }

    /// The webhook callback URL registered on remote repositories.
    pub fn callback_url(&self) -> String {
        format!("{}/webhooks/github", self.public_base_url)
    }

    /// The secret as raw bytes, for HMAC verification.
    pub fn secret_bytes(&self) -> &[u8] {
        self.webhook_secret.as_bytes()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token and secret deliberately elided.
        f.debug_struct("Config")
            .field("github_owner", &self.github_owner)
            .field("public_base_url", &self.public_base_url)
            .field("default_channel", &self.default_channel)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn normalize_base_url(raw: String) -> Result<String, ConfigError> {
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(ConfigError::InvalidVar {
            var: "PUBLIC_BASE_URL",
            value: raw,
            reason: "must start with http:// or https://",
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_url_is_derived_from_base() {
        let config = Config {
            github_token: "t".to_string(),
            github_owner: "acme".to_string(),
            webhook_secret: "s".to_string(),
            public_base_url: "https://bridge.example.com".to_string(),
            discord_webhook_url: "https://discord.example/hook".to_string(),
            default_channel: None,
            port: 3000,
        };
        assert_eq!(
            config.callback_url(),
            "https://bridge.example.com/webhooks/github"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let url = normalize_base_url("https://bridge.example.com/".to_string()).unwrap();
        assert_eq!(url, "https://bridge.example.com");
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let result = normalize_base_url("bridge.example.com".to_string());
        assert!(matches!(result, Err(ConfigError::InvalidVar { .. })));
    }

    #[test]
    fn debug_elides_secrets() {
        let config = Config {
            github_token: "super-secret-token".to_string(),
            github_owner: "acme".to_string(),
            webhook_secret: "hush".to_string(),
            public_base_url: "https://bridge.example.com".to_string(),
            discord_webhook_url: "https://discord.example/hook".to_string(),
            default_channel: None,
            port: 3000,
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-token"));
        assert!(!rendered.contains("hush"));
    }
}
