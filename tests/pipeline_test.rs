//! End-to-end pipeline tests: canned backend output reconciled and
//! materialized as real commits in a scratch repository.
//!
//! These tests shell out to the system `git` binary, matching production
//! behavior of the executor.

use std::collections::BTreeSet;

use cleave::changes::collect_changes;
use cleave::commit::{
    GitCommand, GroupOutcome, MessageConfig, PlannedCommit, Vcs, build_commit_message,
    execute_plan, parse_ticket,
};
use cleave::grouping::{CATCH_ALL_TITLE, reconcile_groups};
use git2::Repository;

fn init_repo(dir: &std::path::Path) -> Repository {
    let repo = Repository::init(dir).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();

        let sig = git2::Signature::now("Test User", "test@test.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
    }
    repo
}

fn head_messages(repo: &Repository) -> Vec<String> {
    let mut walk = repo.revwalk().unwrap();
    walk.push_head().unwrap();
    walk.map(|oid| {
        let commit = repo.find_commit(oid.unwrap()).unwrap();
        commit.message().unwrap_or("").to_string()
    })
    .collect()
}

#[test]
fn partial_grouping_becomes_two_commits_via_catch_all() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());

    std::fs::write(dir.path().join("a.js"), "console.log('a');\n").unwrap();
    std::fs::write(dir.path().join("b.js"), "console.log('b');\n").unwrap();

    let changes = collect_changes(&repo).unwrap();
    let raw = r#"[{"title": "A", "summary": "Only file a.", "files": ["a.js"]}]"#;
    let groups = reconcile_groups(raw, &changes.valid_paths()).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[1].title, CATCH_ALL_TITLE);
    assert_eq!(groups[1].files, vec!["b.js"]);

    let ticket = parse_ticket("feature/SCRUM-123-login");
    let config = MessageConfig::default();
    let plan: Vec<PlannedCommit> = groups
        .iter()
        .map(|g| PlannedCommit {
            group: g.clone(),
            message: build_commit_message(g, ticket.as_ref(), &config),
        })
        .collect();

    assert!(plan[0].message.starts_with("SCRUM-123: A"));

    let vcs = GitCommand::new(dir.path().to_path_buf());
    let outcomes = execute_plan(&vcs, &plan, false).unwrap();
    assert_eq!(
        outcomes,
        vec![GroupOutcome::Committed, GroupOutcome::Committed]
    );

    // init + two pipeline commits, newest first
    let messages = head_messages(&repo);
    assert_eq!(messages.len(), 3);
    assert!(messages[1].starts_with("SCRUM-123: A"));
    assert!(messages[0].starts_with(&format!("SCRUM-123: {CATCH_ALL_TITLE}")));
}

#[test]
fn ghost_paths_never_reach_a_commit() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());

    std::fs::write(dir.path().join("real.js"), "real\n").unwrap();

    let changes = collect_changes(&repo).unwrap();
    let raw = r#"[{"title": "A", "summary": "s", "files": ["real.js", "ghost.js"]}]"#;
    let groups = reconcile_groups(raw, &changes.valid_paths()).unwrap();

    let all_files: BTreeSet<&str> = groups
        .iter()
        .flat_map(|g| g.files.iter().map(String::as_str))
        .collect();
    assert!(!all_files.contains("ghost.js"));

    let plan: Vec<PlannedCommit> = groups
        .iter()
        .map(|g| PlannedCommit {
            group: g.clone(),
            message: build_commit_message(g, None, &MessageConfig::default()),
        })
        .collect();

    let vcs = GitCommand::new(dir.path().to_path_buf());
    execute_plan(&vcs, &plan, false).unwrap();

    let statuses = repo.statuses(None).unwrap();
    assert_eq!(statuses.len(), 0, "working tree should be clean");
}

#[test]
fn already_clean_group_is_skipped_without_an_empty_commit() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());

    std::fs::write(dir.path().join("a.js"), "a\n").unwrap();

    let vcs = GitCommand::new(dir.path().to_path_buf());

    // First plan commits a.js; the second plan references the same file,
    // now clean, and must skip rather than create an empty commit.
    let group = cleave::CommitGroup {
        title: "add a".to_string(),
        summary: String::new(),
        files: vec!["a.js".to_string()],
    };
    let plan = vec![PlannedCommit {
        group: group.clone(),
        message: "add a".to_string(),
    }];
    execute_plan(&vcs, &plan, false).unwrap();

    let plan_again = vec![PlannedCommit {
        group,
        message: "add a again".to_string(),
    }];
    let outcomes = execute_plan(&vcs, &plan_again, false).unwrap();
    assert_eq!(outcomes, vec![GroupOutcome::SkippedNothingStaged]);

    let messages = head_messages(&repo);
    assert_eq!(messages.len(), 2, "no empty commit was created");
}

#[test]
fn committed_message_is_single_line() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());

    std::fs::write(dir.path().join("a.js"), "a\n").unwrap();

    let group = cleave::CommitGroup {
        title: "add a".to_string(),
        summary: "Multi\nline\nsummary.".to_string(),
        files: vec!["a.js".to_string()],
    };
    let message = build_commit_message(&group, None, &MessageConfig::default());
    assert!(message.contains('\n'));

    let plan = vec![PlannedCommit {
        group,
        message,
    }];
    let vcs = GitCommand::new(dir.path().to_path_buf());
    execute_plan(&vcs, &plan, false).unwrap();

    let messages = head_messages(&repo);
    // git appends a trailing newline to the stored message
    assert!(!messages[0].trim_end().contains('\n'));
}

#[test]
fn has_staged_changes_tracks_the_index() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());

    let vcs = GitCommand::new(dir.path().to_path_buf());
    assert!(!vcs.has_staged_changes().unwrap());

    std::fs::write(dir.path().join("a.js"), "a\n").unwrap();
    vcs.stage(&["a.js".to_string()]).unwrap();
    assert!(vcs.has_staged_changes().unwrap());

    vcs.commit("add a").unwrap();
    assert!(!vcs.has_staged_changes().unwrap());
}
