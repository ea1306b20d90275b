//! Reconciliation of model output against the actual change set.
//!
//! The backend's grouping is never trusted: paths it invents are dropped,
//! paths it omits are gathered into a synthetic catch-all group, so the
//! emitted groups always partition the valid paths they cover.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::ReconcileError;
use crate::grouping::CommitGroup;

/// Title of the synthetic group holding files the model failed to place.
pub const CATCH_ALL_TITLE: &str = "remaining files";

/// Characters of raw output surfaced in a `MalformedOutput` error.
const SNIPPET_LEN: usize = 200;

/// Strip an optional fenced-code-block wrapper from model output.
///
/// Backends often wrap structured output in a markdown fence; only a
/// leading delimiter line (with or without a language tag) and a trailing
/// delimiter line are removed. Anything else passes through untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(newline) = rest.find('\n') else {
        return trimmed;
    };
    let body = rest[newline + 1..].trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse and validate raw backend output into a sequence of commit groups.
///
/// Paths outside the change set, and paths already claimed by an earlier
/// group, are dropped silently; groups left with no valid files are
/// discarded with a warning; valid paths no group claimed are appended as
/// a final catch-all group. The result therefore covers every valid path
/// that survives, each exactly once.
pub fn reconcile_groups(
    raw: &str,
    valid_paths: &BTreeSet<String>,
) -> Result<Vec<CommitGroup>, ReconcileError> {
    let body = strip_code_fence(raw);

    let parsed: Vec<CommitGroup> = serde_json::from_str(body)
        .map_err(|e| malformed(raw, e.to_string()))?;

    if parsed.is_empty() {
        return Err(malformed(raw, "empty group list".to_string()));
    }

    let mut claimed: BTreeSet<String> = BTreeSet::new();
    let mut groups = Vec::new();

    for mut group in parsed {
        let mut kept = Vec::new();
        for path in group.files.drain(..) {
            if !valid_paths.contains(&path) {
                debug!("dropping path not in change set: {path}");
                continue;
            }
            if claimed.contains(&path) {
                debug!("dropping path already claimed by an earlier group: {path}");
                continue;
            }
            claimed.insert(path.clone());
            kept.push(path);
        }

        if kept.is_empty() {
            warn!("discarding group with no valid files: {}", group.title);
            println!("⚠ Discarding group '{}': no valid files", group.title);
            continue;
        }

        group.files = kept;
        groups.push(group);
    }

    let unclaimed: Vec<String> = valid_paths
        .iter()
        .filter(|p| !claimed.contains(*p))
        .cloned()
        .collect();

    if !unclaimed.is_empty() {
        warn!(
            "{} file(s) were not placed in any group; adding a catch-all commit",
            unclaimed.len()
        );
        println!(
            "⚠ {} file(s) were not grouped by the model; adding them to a '{CATCH_ALL_TITLE}' commit",
            unclaimed.len()
        );
        groups.push(CommitGroup {
            title: CATCH_ALL_TITLE.to_string(),
            summary: "Changes the model did not assign to any group.".to_string(),
            files: unclaimed,
        });
    }

    Ok(groups)
}

fn malformed(raw: &str, reason: String) -> ReconcileError {
    ReconcileError::MalformedOutput {
        reason,
        snippet: raw.chars().take(SNIPPET_LEN).collect(),
    }
}
