//! Commit materialization: ticket context, message rendering, and execution.

pub mod exec;
pub mod message;
pub mod ticket;

pub use exec::{GitCommand, GroupOutcome, PlannedCommit, Vcs, check_git_installed, execute_plan};
pub use message::{MessageConfig, build_commit_message, build_merged_message};
pub use ticket::{TicketRef, parse_ticket};
