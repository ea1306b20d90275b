//! Grouping of changed files into semantic commits via a generation backend.

pub mod prompt;
pub mod reconcile;

use serde::Deserialize;

pub use prompt::build_grouping_prompt;
pub use reconcile::{CATCH_ALL_TITLE, reconcile_groups, strip_code_fence};

/// A group of files that belong to a single commit.
///
/// Produced by the generation backend and mutated only by the reconciler,
/// which drops paths that are not part of the change set.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitGroup {
    /// Short commit title for the group.
    pub title: String,
    /// One or two sentences describing the change, used as the message body.
    #[serde(default)]
    pub summary: String,
    /// File paths belonging to this group.
    #[serde(default)]
    pub files: Vec<String>,
}
