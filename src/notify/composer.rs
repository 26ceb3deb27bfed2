//! Deterministic event-to-notification composition.
//!
//! `compose` is a pure function from a typed event to a [`Notification`].
//! The color for each (event, action) pair is fixed: a reader can tell a
//! merged PR from a closed-unmerged one at a glance. Body text is capped so
//! downstream payload-size limits are never hit.

use crate::webhooks::events::{
    BranchEvent, GithubEvent, IssueAction, IssuesEvent, PullRequestEvent, PushEvent, ReleaseEvent,
    Sender,
};

use super::{colors, Notification, NotificationAuthor, NotificationField};

/// Maximum rendered description length, in characters.
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Cap on per-commit fields in a push notification.
const MAX_COMMIT_FIELDS: usize = 10;

/// Placeholder when an event carries no body text.
const NO_DESCRIPTION: &str = "No description provided";

/// Composes a notification for any recognized event.
///
/// Total over the event enum: there is no payload shape in the recognized
/// set that fails to render.
pub fn compose(event: &GithubEvent) -> Notification {
    match event {
        GithubEvent::Push(e) => compose_push(e),
        GithubEvent::PullRequest(e) => compose_pull_request(e),
        GithubEvent::Issues(e) => compose_issue(e),
        GithubEvent::Release(e) => compose_release(e),
        GithubEvent::BranchCreate(e) => compose_branch_create(e),
        GithubEvent::BranchDelete(e) => compose_branch_delete(e),
    }
}

fn compose_push(event: &PushEvent) -> Notification {
    let fields = event
        .commits
        .iter()
        .take(MAX_COMMIT_FIELDS)
        .map(|commit| NotificationField {
            name: commit.short_id().to_string(),
            value: truncate(&commit.message),
            inline: false,
        })
        .collect();

    Notification {
        title: format!("New Commits to {}", event.repo),
        description: format!(
            "{} new commits pushed to {}",
            event.commits.len(),
            event.git_ref
        ),
        color: colors::SUCCESS,
        url: event.compare_url.clone(),
        fields,
        author: author_of(&event.pusher),
        footer: footer("commit", "pushed"),
    }
}

fn compose_pull_request(event: &PullRequestEvent) -> Notification {
    let merged = event.is_merged();
    let (action_label, color) = if merged {
        ("Merged".to_string(), colors::SUCCESS)
    } else if event.action == crate::webhooks::events::PullRequestAction::Closed {
        ("closed".to_string(), colors::ERROR)
    } else {
        (event.action.as_str().to_string(), colors::WARNING)
    };

    let status = if merged {
        "Merged".to_string()
    } else {
        event.state.clone()
    };

    Notification {
        title: format!("Pull Request {}: {}", action_label, event.title),
        description: describe(event.body.as_deref()),
        color,
        url: Some(event.html_url.clone()),
        fields: vec![
            NotificationField {
                name: "Status".to_string(),
                value: status,
                inline: true,
            },
            NotificationField {
                name: "Branch".to_string(),
                value: format!("{} → {}", event.head_branch, event.base_branch),
                inline: true,
            },
            NotificationField {
                name: "Changes".to_string(),
                value: format!("+{} -{}", event.additions, event.deletions),
                inline: true,
            },
        ],
        author: author_of(&event.author),
        footer: footer(
            "pull_request",
            if merged { "merged" } else { event.action.as_str() },
        ),
    }
}

fn compose_issue(event: &IssuesEvent) -> Notification {
    let labels = if event.labels.is_empty() {
        "No labels".to_string()
    } else {
        event.labels.join(", ")
    };

    let color = match event.action {
        IssueAction::Closed => colors::DEFAULT,
        _ => colors::INFO,
    };

    Notification {
        title: format!("Issue {}: {}", event.action.as_str(), event.title),
        description: describe(event.body.as_deref()),
        color,
        url: Some(event.html_url.clone()),
        fields: vec![
            NotificationField {
                name: "Status".to_string(),
                value: event.state.clone(),
                inline: true,
            },
            NotificationField {
                name: "Labels".to_string(),
                value: labels,
                inline: true,
            },
            NotificationField {
                name: "Assignee".to_string(),
                value: event
                    .assignee
                    .clone()
                    .unwrap_or_else(|| "Unassigned".to_string()),
                inline: true,
            },
        ],
        author: author_of(&event.author),
        footer: footer("issue", event.action.as_str()),
    }
}

fn compose_release(event: &ReleaseEvent) -> Notification {
    Notification {
        title: format!("New Release: {}", event.tag_name),
        description: describe(event.body.as_deref()),
        color: colors::DEFAULT,
        url: Some(event.html_url.clone()),
        fields: vec![
            NotificationField {
                name: "Version".to_string(),
                value: event.tag_name.clone(),
                inline: true,
            },
            NotificationField {
                name: "Status".to_string(),
                value: if event.prerelease {
                    "Pre-release".to_string()
                } else {
                    "Stable".to_string()
                },
                inline: true,
            },
            NotificationField {
                name: "Published".to_string(),
                value: event
                    .published_at
                    .clone()
                    .unwrap_or_else(|| "Unpublished".to_string()),
                inline: true,
            },
        ],
        author: author_of(&event.author),
        footer: footer("release", event.action.as_str()),
    }
}

fn compose_branch_create(event: &BranchEvent) -> Notification {
    Notification {
        title: "New Branch Created".to_string(),
        description: format!("Branch {} was created in {}", event.branch, event.repo),
        color: colors::SUCCESS,
        url: Some(format!("{}/tree/{}", event.repo_html_url, event.branch)),
        fields: vec![],
        author: author_of(&event.sender),
        footer: footer("create", "branch"),
    }
}

fn compose_branch_delete(event: &BranchEvent) -> Notification {
    Notification {
        title: "Branch Deleted".to_string(),
        description: format!("Branch {} was deleted from {}", event.branch, event.repo),
        color: colors::ERROR,
        url: Some(event.repo_html_url.clone()),
        fields: vec![],
        author: author_of(&event.sender),
        footer: footer("delete", "branch"),
    }
}

fn author_of(sender: &Sender) -> NotificationAuthor {
    NotificationAuthor {
        name: sender.name.clone(),
        icon_url: sender.avatar_url.clone(),
    }
}

fn footer(kind: &str, action: &str) -> String {
    format!("GitHub {} - {}", kind, action)
}

fn describe(body: Option<&str>) -> String {
    match body {
        Some(text) if !text.is_empty() => truncate(text),
        _ => NO_DESCRIPTION.to_string(),
    }
}

/// Truncates to [`MAX_DESCRIPTION_CHARS`] characters, char-boundary safe,
/// with an ellipsis when anything was cut.
fn truncate(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(MAX_DESCRIPTION_CHARS) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoFullName;
    use crate::webhooks::events::{PullRequestAction, PushedCommit, ReleaseAction};

    fn sender(name: &str) -> Sender {
        Sender {
            name: name.to_string(),
            avatar_url: Some(format!("https://github.com/{name}.png")),
        }
    }

    fn pr_event(action: PullRequestAction, merged: bool) -> PullRequestEvent {
        PullRequestEvent {
            repo: RepoFullName::parse("acme/widgets").unwrap(),
            action,
            number: 5,
            title: "Add flange".to_string(),
            body: Some("A flange for widgets.".to_string()),
            state: if action == PullRequestAction::Closed {
                "closed".to_string()
            } else {
                "open".to_string()
            },
            merged,
            head_branch: "feature/flange".to_string(),
            base_branch: "main".to_string(),
            additions: 10,
            deletions: 2,
            html_url: "https://github.com/acme/widgets/pull/5".to_string(),
            author: sender("dev"),
        }
    }

    #[test]
    fn merged_open_and_closed_prs_get_three_distinct_colors() {
        let merged = compose(&GithubEvent::PullRequest(pr_event(
            PullRequestAction::Closed,
            true,
        )));
        let open = compose(&GithubEvent::PullRequest(pr_event(
            PullRequestAction::Opened,
            false,
        )));
        let closed = compose(&GithubEvent::PullRequest(pr_event(
            PullRequestAction::Closed,
            false,
        )));

        assert_eq!(merged.color, colors::SUCCESS);
        assert_eq!(open.color, colors::WARNING);
        assert_eq!(closed.color, colors::ERROR);
        assert_ne!(merged.color, open.color);
        assert_ne!(open.color, closed.color);
        assert_ne!(merged.color, closed.color);
    }

    #[test]
    fn merged_pr_reports_merged_status_and_branch_pair() {
        let n = compose(&GithubEvent::PullRequest(pr_event(
            PullRequestAction::Closed,
            true,
        )));
        assert!(n.title.starts_with("Pull Request Merged:"));
        assert_eq!(n.fields[0].value, "Merged");
        assert_eq!(n.fields[1].value, "feature/flange → main");
        assert_eq!(n.fields[2].value, "+10 -2");
        assert_eq!(n.footer, "GitHub pull_request - merged");
    }

    fn issue_event(action: IssueAction) -> IssuesEvent {
        IssuesEvent {
            repo: RepoFullName::parse("acme/widgets").unwrap(),
            action,
            number: 7,
            title: "Widget drifts".to_string(),
            body: None,
            state: match action {
                IssueAction::Closed => "closed".to_string(),
                _ => "open".to_string(),
            },
            labels: vec![],
            assignee: None,
            html_url: "https://github.com/acme/widgets/issues/7".to_string(),
            author: sender("reporter"),
        }
    }

    #[test]
    fn issue_open_and_closed_get_distinct_colors() {
        let open = compose(&GithubEvent::Issues(issue_event(IssueAction::Opened)));
        let closed = compose(&GithubEvent::Issues(issue_event(IssueAction::Closed)));
        assert_eq!(open.color, colors::INFO);
        assert_eq!(closed.color, colors::DEFAULT);
    }

    #[test]
    fn issue_placeholders_for_missing_optionals() {
        let n = compose(&GithubEvent::Issues(issue_event(IssueAction::Opened)));
        assert_eq!(n.description, "No description provided");
        assert_eq!(n.fields[1].value, "No labels");
        assert_eq!(n.fields[2].value, "Unassigned");
    }

    #[test]
    fn issue_labels_are_joined() {
        let mut event = issue_event(IssueAction::Opened);
        event.labels = vec!["bug".to_string(), "p1".to_string()];
        event.assignee = Some("fixer".to_string());
        let n = compose(&GithubEvent::Issues(event));
        assert_eq!(n.fields[1].value, "bug, p1");
        assert_eq!(n.fields[2].value, "fixer");
    }

    #[test]
    fn push_caps_commit_fields() {
        let commits: Vec<PushedCommit> = (0..25)
            .map(|i| PushedCommit {
                id: format!("{:040}", i),
                message: format!("commit {i}"),
            })
            .collect();
        let event = PushEvent {
            repo: RepoFullName::parse("acme/widgets").unwrap(),
            git_ref: "refs/heads/main".to_string(),
            commits,
            compare_url: None,
            pusher: sender("octocat"),
        };

        let n = compose(&GithubEvent::Push(event));
        assert_eq!(n.color, colors::SUCCESS);
        assert_eq!(n.fields.len(), 10);
        assert!(n.description.starts_with("25 new commits"));
    }

    #[test]
    fn branch_create_and_delete_get_distinct_colors_and_links() {
        let event = BranchEvent {
            repo: RepoFullName::parse("acme/widgets").unwrap(),
            branch: "feature/x".to_string(),
            repo_html_url: "https://github.com/acme/widgets".to_string(),
            sender: sender("dev"),
        };

        let created = compose(&GithubEvent::BranchCreate(event.clone()));
        let deleted = compose(&GithubEvent::BranchDelete(event));

        assert_eq!(created.color, colors::SUCCESS);
        assert_eq!(deleted.color, colors::ERROR);
        assert_eq!(
            created.url.as_deref(),
            Some("https://github.com/acme/widgets/tree/feature/x")
        );
        assert_eq!(
            deleted.url.as_deref(),
            Some("https://github.com/acme/widgets")
        );
    }

    #[test]
    fn release_renders_prerelease_status() {
        let event = ReleaseEvent {
            repo: RepoFullName::parse("acme/widgets").unwrap(),
            action: ReleaseAction::Published,
            tag_name: "v2.0.0-rc.1".to_string(),
            body: None,
            prerelease: true,
            published_at: Some("2024-03-01T12:00:00Z".to_string()),
            html_url: "https://github.com/acme/widgets/releases/tag/v2.0.0-rc.1".to_string(),
            author: sender("maintainer"),
        };
        let n = compose(&GithubEvent::Release(event));
        assert_eq!(n.color, colors::DEFAULT);
        assert_eq!(n.fields[1].value, "Pre-release");
    }

    #[test]
    fn long_bodies_are_truncated_to_200_chars() {
        let mut event = pr_event(PullRequestAction::Opened, false);
        event.body = Some("x".repeat(500));
        let n = compose(&GithubEvent::PullRequest(event));
        assert_eq!(n.description.chars().count(), 201); // 200 + ellipsis
        assert!(n.description.ends_with('…'));
    }

    #[test]
    fn truncation_is_char_boundary_safe() {
        // Multi-byte chars around the cut point must not split.
        let body = "é".repeat(300);
        let mut event = pr_event(PullRequestAction::Opened, false);
        event.body = Some(body);
        let n = compose(&GithubEvent::PullRequest(event));
        assert_eq!(n.description.chars().count(), 201);
    }

    #[test]
    fn short_bodies_pass_through_untruncated() {
        assert_eq!(truncate("short"), "short");
        let exactly_200 = "a".repeat(200);
        assert_eq!(truncate(&exactly_200), exactly_200);
    }
}
