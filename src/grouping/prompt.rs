//! Prompt construction for the grouping call.

use crate::changes::ChangeSet;

/// Build the generation prompt for grouping a change set into commits.
///
/// Two data sections feed the model: the full file list with status, and a
/// per-file diff block labeled by path. The function is pure and, because
/// [`ChangeSet`] is sorted at collection time, byte-for-byte reproducible
/// for identical input.
pub fn build_grouping_prompt(changes: &ChangeSet) -> String {
    let file_count = changes.files.len();

    let files_section: String = changes
        .files
        .iter()
        .map(|f| format!("- {} ({})", f.path, f.status))
        .collect::<Vec<_>>()
        .join("\n");

    let diffs_section: String = changes
        .diffs
        .iter()
        .map(|d| format!("### {}\n{}", d.path, d.changed_lines.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are grouping uncommitted changes into one or more semantically related commits.

## Changed Files ({file_count} files)
{files_section}

## Diffs
{diffs_section}

## Rules
1. Files that serve the same feature, fix, or refactor belong in the same group
2. Test files go with the code they test
3. Unrelated changes must be separate groups
4. Every file must appear in exactly one group
5. Use only paths from the Changed Files list, spelled exactly as given
6. Each title is a short imperative commit subject (3-10 words), lowercase after any prefix
7. Each summary is one or two sentences explaining why the change was made

Respond with ONLY a JSON array (no markdown, no explanation):
[{{"title": "short commit title", "summary": "why this change was made", "files": ["path/to/file"]}}]"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::{ChangedFile, FileDiff, FileStatus};

    fn make_changes() -> ChangeSet {
        ChangeSet {
            files: vec![
                ChangedFile {
                    path: "src/auth.rs".to_string(),
                    status: FileStatus::Modified,
                },
                ChangedFile {
                    path: "src/login.rs".to_string(),
                    status: FileStatus::Untracked,
                },
            ],
            diffs: vec![FileDiff {
                path: "src/auth.rs".to_string(),
                changed_lines: vec!["+fn verify() {}".to_string(), "-fn check() {}".to_string()],
            }],
        }
    }

    #[test]
    fn prompt_lists_every_file_with_status() {
        let prompt = build_grouping_prompt(&make_changes());
        assert!(prompt.contains("- src/auth.rs (Modified)"));
        assert!(prompt.contains("- src/login.rs (Untracked)"));
        assert!(prompt.contains("2 files"));
    }

    #[test]
    fn prompt_labels_diff_blocks_by_path() {
        let prompt = build_grouping_prompt(&make_changes());
        assert!(prompt.contains("### src/auth.rs"));
        assert!(prompt.contains("+fn verify() {}"));
        assert!(prompt.contains("-fn check() {}"));
    }

    #[test]
    fn prompt_is_referentially_transparent() {
        let changes = make_changes();
        let first = build_grouping_prompt(&changes);
        let second = build_grouping_prompt(&changes);
        assert_eq!(first, second);
    }
}
