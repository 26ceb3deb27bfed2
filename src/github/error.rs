//! GitHub API error taxonomy.
//!
//! Remote failures are folded into a small set of categories the HTTP layer
//! can map directly to response statuses. Categorization prefers the typed
//! status code octocrab exposes for API-level errors; transport errors fall
//! back to message inspection, which is fragile but safe — an unmatched
//! message simply lands in [`GithubError::Unknown`].

use thiserror::Error;

/// Categorized GitHub API failure.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The token lacks permission for the operation (HTTP 403, not
    /// rate-limit related).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The token is missing, expired, or revoked (HTTP 401).
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    /// The write collided with remote state (HTTP 409/422).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Primary or secondary rate limit exhausted (HTTP 429, or 403 with a
    /// rate-limit message).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Anything else, transport failures included.
    #[error("GitHub API error: {0}")]
    Unknown(String),
}

impl GithubError {
    /// Categorizes an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let message = err.to_string();

        if let octocrab::Error::GitHub { source, .. } = &err {
            return Self::from_status(source.status_code.as_u16(), message);
        }

        // Transport and serialization errors carry no status; fall back to
        // message inspection for anything that smells like an API response.
        match extract_status_code(&message) {
            Some(code) => Self::from_status(code, message),
            None => GithubError::Unknown(message),
        }
    }

    fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => GithubError::Unauthenticated(message),
            403 if is_rate_limit_message(&message) => GithubError::RateLimited(message),
            403 => GithubError::PermissionDenied(message),
            404 => GithubError::NotFound(message),
            409 | 422 => GithubError::Conflict(message),
            429 => GithubError::RateLimited(message),
            _ => GithubError::Unknown(message),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GithubError::NotFound(_))
    }
}

/// Extracts an HTTP status code from an error message.
///
/// Used only when octocrab gives us an untyped error. The patterns are
/// well-established conventions ("404" next to "not found"); an unmatched
/// message returns `None` and the error stays `Unknown`.
fn extract_status_code(message: &str) -> Option<u16> {
    if let Some(idx) = message.find("status: ") {
        let rest = &message[idx + 8..];
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    let lower = message.to_lowercase();
    if message.contains("404") && lower.contains("not found") {
        return Some(404);
    }
    if message.contains("401") {
        return Some(401);
    }
    if message.contains("403") {
        return Some(403);
    }
    if message.contains("409") && lower.contains("conflict") {
        return Some(409);
    }
    if message.contains("422") {
        return Some(422);
    }
    if message.contains("429") {
        return Some(429);
    }

    None
}

/// GitHub reports secondary rate limits as 403 with one of these phrases.
fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit") || lower.contains("abuse detection")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            GithubError::from_status(404, "gone".into()),
            GithubError::NotFound(_)
        ));
        assert!(matches!(
            GithubError::from_status(401, "bad credentials".into()),
            GithubError::Unauthenticated(_)
        ));
        assert!(matches!(
            GithubError::from_status(403, "resource not accessible".into()),
            GithubError::PermissionDenied(_)
        ));
        assert!(matches!(
            GithubError::from_status(409, "merge conflict".into()),
            GithubError::Conflict(_)
        ));
        assert!(matches!(
            GithubError::from_status(422, "validation failed".into()),
            GithubError::Conflict(_)
        ));
        assert!(matches!(
            GithubError::from_status(429, "slow down".into()),
            GithubError::RateLimited(_)
        ));
        assert!(matches!(
            GithubError::from_status(500, "server error".into()),
            GithubError::Unknown(_)
        ));
    }

    #[test]
    fn forbidden_with_rate_limit_message_is_rate_limited() {
        let err =
            GithubError::from_status(403, "API rate limit exceeded for installation".into());
        assert!(matches!(err, GithubError::RateLimited(_)));

        let err = GithubError::from_status(
            403,
            "You have triggered an abuse detection mechanism".into(),
        );
        assert!(matches!(err, GithubError::RateLimited(_)));
    }

    #[test]
    fn message_fallback_extracts_status() {
        assert_eq!(
            extract_status_code("GitHub API returned status: 404 Not Found"),
            Some(404)
        );
        assert_eq!(extract_status_code("404 not found"), Some(404));
        assert_eq!(extract_status_code("HTTP 422 Unprocessable Entity"), Some(422));
        assert_eq!(extract_status_code("connection reset by peer"), None);
    }
}
