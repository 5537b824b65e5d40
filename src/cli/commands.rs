use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "td",
    about = concat!("[/] treedo v", env!("CARGO_PKG_VERSION"), " - your to-do list is a tree"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// To-do file to operate on (default: todo-tree.json)
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tree with progress (default command)
    Show,
    /// Add a task, as a root or under an existing task
    Add(AddArgs),
    /// Mark a task complete
    Done(DoneArgs),
    /// Mark a leaf task incomplete
    Undone(PathArg),
    /// Expand a task's subtree
    Expand(PathArg),
    /// Collapse a task's subtree
    Collapse(PathArg),
    /// Delete a task and its subtree
    Rm(RmArgs),
    /// Attach a link to a task
    Link(LinkArgs),
    /// Print computed canvas coordinates for every visible task
    Layout,
    /// Replace the board with a backup file
    Restore(RestoreArgs),
    /// Wipe the board and reseed the starter task
    Clear(ClearArgs),
}

/// Tasks are addressed by their visual position: `2` is the second root,
/// `2.1` its first subtask, and so on.
#[derive(Args)]
pub struct PathArg {
    /// Task position, e.g. 1 or 2.1.3
    pub path: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Position of the parent task (omit for a new root)
    #[arg(long)]
    pub under: Option<String>,
    /// Due date, YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,
    /// Description text
    #[arg(long)]
    pub desc: Option<String>,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task position
    pub path: String,
    /// Also complete every subtask (required for branches with
    /// incomplete subtasks)
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task position
    pub path: String,
    /// Delete even if the task has content or subtasks
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Task position
    pub path: String,
    /// URL to attach (https:// is assumed when no scheme is given)
    pub url: String,
    /// Display label (defaults to the URL)
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Backup file to load
    pub backup: PathBuf,
    /// Load even if the backup is older than the current board
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Confirm wiping the whole board
    #[arg(long)]
    pub force: bool,
}
