//! cleave - CLI entry point.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use cleave::backend::{GenerationLimits, create_backend};
use cleave::changes::collect_changes;
use cleave::commit::{
    GitCommand, GroupOutcome, MessageConfig, PlannedCommit, build_commit_message,
    build_merged_message, check_git_installed, execute_plan, parse_ticket,
};
use cleave::config::Config;
use cleave::git::{current_branch, discover_repository};
use cleave::grouping::{build_grouping_prompt, reconcile_groups};

/// Group uncommitted changes into semantic commits with AI-generated messages.
#[derive(Parser, Debug)]
#[command(name = "cleave")]
#[command(about = "Group uncommitted changes into semantic commits")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group working-tree changes and create one commit per group.
    Commit(CommitArgs),
}

#[derive(Args, Debug)]
struct CommitArgs {
    /// Preview the planned commits without staging or committing anything.
    #[arg(long)]
    dry_run: bool,

    /// Collapse all groups into a single commit.
    #[arg(long)]
    single: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Commit(args) => run_commit(args).await,
    }
}

async fn run_commit(args: CommitArgs) -> Result<()> {
    // Step 1: Open the repository
    let cwd = std::env::current_dir()?;
    let repo = discover_repository(&cwd)
        .context("Not a git repository. Run cleave from within a git repository.")?;
    let workdir = repo
        .workdir()
        .context("Repository has no working directory")?
        .to_path_buf();

    // Step 2: Load layered configuration
    let config = Config::load(&workdir).context("Failed to load configuration")?;

    // Step 3: Collect the working-tree changes
    let changes = collect_changes(&repo).context("Failed to collect working-tree changes")?;
    if changes.is_empty() {
        println!("Working tree is clean. Nothing to commit.");
        return Ok(());
    }
    println!("Found {} changed files", changes.files.len());

    // Step 4: Ticket context from the branch name
    let branch = current_branch(&repo).context("Failed to resolve the current branch")?;
    let ticket = parse_ticket(&branch);
    if let Some(ticket) = &ticket {
        println!("Ticket reference: {}", ticket.key());
    }

    // Step 5: One generation call to group the changes
    let backend = create_backend(&config)?;
    let prompt = build_grouping_prompt(&changes);
    let limits = GenerationLimits {
        max_output_tokens: config.max_output_tokens,
    };

    println!(
        "Asking {} to group {} changed files...",
        backend.name(),
        changes.files.len()
    );
    let raw = backend
        .generate(&prompt, limits)
        .await
        .context("Generation backend call failed")?;

    // Step 6: Reconcile the model's grouping against the change set
    let groups = reconcile_groups(&raw, &changes.valid_paths())
        .context("Failed to reconcile model output")?;

    // Step 7: Render messages
    let message_config = MessageConfig {
        commit_prefix: config.commit_prefix.clone(),
        ticket_base_url: config.ticket_base_url.clone(),
        project_key: config.project_key.clone(),
    };

    let plan: Vec<PlannedCommit> = if args.single && groups.len() > 1 {
        let message = build_merged_message(&groups, ticket.as_ref(), &message_config);
        let files = groups.iter().flat_map(|g| g.files.clone()).collect();
        let title = groups
            .iter()
            .map(|g| g.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        vec![PlannedCommit {
            group: cleave::CommitGroup {
                title,
                summary: String::new(),
                files,
            },
            message,
        }]
    } else {
        groups
            .iter()
            .map(|group| PlannedCommit {
                group: group.clone(),
                message: build_commit_message(group, ticket.as_ref(), &message_config),
            })
            .collect()
    };

    // Step 8: Execute or preview
    if !args.dry_run {
        check_git_installed()?;
    }
    let vcs = GitCommand::new(workdir);
    let outcomes = execute_plan(&vcs, &plan, args.dry_run)?;

    if args.dry_run {
        println!(
            "Dry run: previewed {} commit(s), nothing was staged or committed.",
            plan.len()
        );
    } else {
        let committed = outcomes
            .iter()
            .filter(|o| **o == GroupOutcome::Committed)
            .count();
        let skipped = outcomes.len() - committed;
        if skipped > 0 {
            println!("✓ Created {committed} commit(s), {skipped} group(s) skipped");
        } else {
            println!("✓ Created {committed} commit(s)");
        }
    }

    Ok(())
}
