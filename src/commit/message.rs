//! Local, deterministic commit message rendering.
//!
//! No network and no repository access: a message is a pure function of the
//! group, the optional ticket reference, and configuration.

use crate::commit::ticket::TicketRef;
use crate::grouping::CommitGroup;

/// Message-affecting configuration, extracted from the merged [`crate::config::Config`].
#[derive(Debug, Clone, Default)]
pub struct MessageConfig {
    /// Overrides the ticket's own prefix in the subject line.
    pub commit_prefix: Option<String>,
    /// Base URL for ticket links, e.g. `https://company.atlassian.net/browse`.
    pub ticket_base_url: Option<String>,
    /// Annotation for commits on branches without a ticket reference.
    pub project_key: Option<String>,
}

/// Render the commit message for one group.
///
/// With a ticket the subject is `PREFIX-NUMBER: title`, the prefix taken
/// from the configured override when set, else from the ticket itself. The
/// summary follows as a blank-line-separated body, and a configured ticket
/// base URL is appended as a trailing line. Without a ticket the subject is
/// the bare title, annotated with the project key when one is configured.
pub fn build_commit_message(
    group: &CommitGroup,
    ticket: Option<&TicketRef>,
    config: &MessageConfig,
) -> String {
    let mut parts = Vec::new();

    let subject = match ticket {
        Some(ticket) => {
            let prefix = config
                .commit_prefix
                .as_deref()
                .unwrap_or(ticket.prefix.as_str());
            format!("{prefix}-{}: {}", ticket.number, group.title)
        }
        None => match &config.project_key {
            Some(key) => format!("[{key}] {}", group.title),
            None => group.title.clone(),
        },
    };
    parts.push(subject);

    let body = group.summary.trim();
    if !body.is_empty() {
        parts.push(String::new());
        parts.push(body.to_string());
    }

    if let (Some(ticket), Some(base)) = (ticket, config.ticket_base_url.as_deref()) {
        parts.push(String::new());
        parts.push(format!("{}/{}", base.trim_end_matches('/'), ticket.key()));
    }

    parts.join("\n")
}

/// Render one message covering several groups collapsed into a single
/// commit: titles joined with a comma, each summary turned into a bullet.
pub fn build_merged_message(
    groups: &[CommitGroup],
    ticket: Option<&TicketRef>,
    config: &MessageConfig,
) -> String {
    let title = groups
        .iter()
        .map(|g| g.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let summary = groups
        .iter()
        .filter(|g| !g.summary.trim().is_empty())
        .map(|g| format!("- {}", g.summary.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    let merged = CommitGroup {
        title,
        summary,
        files: Vec::new(),
    };
    build_commit_message(&merged, ticket, config)
}
