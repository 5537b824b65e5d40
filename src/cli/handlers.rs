use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::io::snapshot::{SnapshotError, load_forest, read_snapshot, restore, save_forest};
use crate::layout::{EstimatedHeight, layout_forest};
use crate::model::{Forest, NodeId};
use crate::ops::{
    NodeError, add_link, create_node, first_incomplete, is_pristine, remove_node, set_complete,
    set_complete_recursive, set_description, set_due_date, set_expanded,
};

use super::commands::{Cli, Commands};

/// Error type for CLI handling
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no task at position {0}")]
    InvalidPath(String),
    #[error("invalid date {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("task {0} has incomplete subtasks; rerun with --all to complete them too")]
    NeedsAll(String),
    #[error("task {0} has content or subtasks; rerun with --force to delete it")]
    NeedsForce(String),
    #[error("refusing to clear the board without --force")]
    NeedsClearForce,
    #[error("backup is older than the current board; rerun with --force to overwrite")]
    OlderBackup,
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

pub fn dispatch(cli: Cli) -> Result<(), CliError> {
    let file = cli.file.unwrap_or_else(default_file);
    let mut forest = load_or_seed(&file)?;
    // Establish ordering and visibility before resolving any position path
    layout_forest(&mut forest, &EstimatedHeight);

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => {
            print_tree(&forest);
            return Ok(());
        }
        Commands::Add(args) => {
            let parent = match &args.under {
                Some(path) => Some(resolve_path(&forest, path)?),
                None => None,
            };
            let id = create_node(&mut forest, &args.title, None, parent)?;
            if let Some(desc) = &args.desc {
                set_description(&mut forest, id, desc)?;
            }
            if let Some(raw) = &args.due {
                let due = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| CliError::InvalidDate(raw.clone()))?;
                set_due_date(&mut forest, id, Some(due))?;
            }
        }
        Commands::Done(args) => {
            let id = resolve_path(&forest, &args.path)?;
            match set_complete(&mut forest, id, true) {
                Err(NodeError::HasIncompleteChildren) => {
                    if !args.all {
                        return Err(CliError::NeedsAll(args.path));
                    }
                    set_complete_recursive(&mut forest, id)?;
                }
                other => {
                    other?;
                }
            }
        }
        Commands::Undone(args) => {
            let id = resolve_path(&forest, &args.path)?;
            set_complete(&mut forest, id, false)?;
        }
        Commands::Expand(args) => {
            let id = resolve_path(&forest, &args.path)?;
            set_expanded(&mut forest, id, true)?;
        }
        Commands::Collapse(args) => {
            let id = resolve_path(&forest, &args.path)?;
            set_expanded(&mut forest, id, false)?;
        }
        Commands::Rm(args) => {
            let id = resolve_path(&forest, &args.path)?;
            if !args.force && !is_pristine(&forest, id) {
                return Err(CliError::NeedsForce(args.path));
            }
            remove_node(&mut forest, id)?;
        }
        Commands::Link(args) => {
            let id = resolve_path(&forest, &args.path)?;
            add_link(&mut forest, id, &args.url, args.label.as_deref().unwrap_or(""))?;
        }
        Commands::Layout => {
            print_layout(&forest);
            return Ok(());
        }
        Commands::Restore(args) => {
            let backup = read_snapshot(&args.backup)?;
            if !args.force && path_has_newer_snapshot(&file, &backup)? {
                return Err(CliError::OlderBackup);
            }
            forest = restore(&backup);
        }
        Commands::Clear(args) => {
            if !args.force {
                return Err(CliError::NeedsClearForce);
            }
            forest = Forest::new();
            forest.seed_default();
        }
    }

    layout_forest(&mut forest, &EstimatedHeight);
    save_forest(&file, &forest)?;
    print_tree(&forest);
    Ok(())
}

fn default_file() -> PathBuf {
    PathBuf::from("todo-tree.json")
}

/// Load the file, or seed the starter task when there is nothing yet.
/// A present-but-unreadable file is an error; we never clobber it.
fn load_or_seed(path: &Path) -> Result<Forest, CliError> {
    if path.exists() {
        Ok(load_forest(path)?)
    } else {
        let mut forest = Forest::new();
        forest.seed_default();
        Ok(forest)
    }
}

/// Does the board file hold a snapshot newer than `backup`?
fn path_has_newer_snapshot(
    path: &Path,
    backup: &crate::io::snapshot::SavedForest,
) -> Result<bool, CliError> {
    if !path.exists() {
        return Ok(false);
    }
    let current = read_snapshot(path)?;
    Ok(backup.is_older_than(&current))
}

/// Resolve a dotted position path like `2.1.3` (1-based at every level)
/// against the current sibling ordering.
pub fn resolve_path(forest: &Forest, path: &str) -> Result<NodeId, CliError> {
    let invalid = || CliError::InvalidPath(path.to_string());

    let mut indices = path.split('.');
    let first: usize = indices
        .next()
        .and_then(|s| s.parse().ok())
        .filter(|&n| n >= 1)
        .ok_or_else(invalid)?;
    let mut current = *forest.roots.get(first - 1).ok_or_else(invalid)?;

    for part in indices {
        let index: usize = part.parse().ok().filter(|&n| n >= 1).ok_or_else(invalid)?;
        let node = forest.node(current).ok_or_else(invalid)?;
        current = *node.children.get(index - 1).ok_or_else(invalid)?;
    }
    Ok(current)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_tree(forest: &Forest) {
    if forest.is_empty() {
        println!("(empty board; `td add <title>` to start)");
        return;
    }
    let next = first_incomplete(forest);
    for (i, &root) in forest.roots.iter().enumerate() {
        print_subtree(forest, root, &format!("{}", i + 1), 0, next);
    }
}

fn print_subtree(forest: &Forest, id: NodeId, path: &str, depth: usize, next: Option<NodeId>) {
    let Some(node) = forest.node(id) else {
        return;
    };

    let checkbox = if node.is_completed { "[x]" } else { "[ ]" };
    let marker = if next == Some(id) { ">" } else { " " };
    let collapse = if node.is_leaf() {
        ""
    } else if node.is_expanded {
        " -"
    } else {
        " +"
    };
    let due = node
        .due_date
        .map(|d| format!("  (due {})", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    let links = if node.links.is_empty() {
        String::new()
    } else {
        format!("  [{} link{}]", node.links.len(), if node.links.len() == 1 { "" } else { "s" })
    };

    println!(
        "{}{:indent$}{} {:>4} {:>3}%  {}{}{}{}",
        marker,
        "",
        checkbox,
        path,
        node.progress,
        node.title,
        collapse,
        due,
        links,
        indent = depth * 2,
    );

    if !node.is_expanded {
        return;
    }
    for (i, &child) in node.children.iter().enumerate() {
        print_subtree(forest, child, &format!("{}.{}", path, i + 1), depth + 1, next);
    }
}

fn print_layout(forest: &Forest) {
    println!("{:<10} {:>10} {:>10} {:>10}  title", "pos", "x", "y", "extent");
    for (i, &root) in forest.roots.iter().enumerate() {
        print_layout_subtree(forest, root, &format!("{}", i + 1));
    }
}

fn print_layout_subtree(forest: &Forest, id: NodeId, path: &str) {
    let Some(node) = forest.node(id) else {
        return;
    };
    if !node.visible {
        return;
    }
    println!(
        "{:<10} {:>10.1} {:>10.1} {:>10.1}  {}",
        path, node.x, node.y, node.subtree_extent, node.title
    );
    for (i, &child) in node.children.iter().enumerate() {
        print_layout_subtree(forest, child, &format!("{}.{}", path, i + 1));
    }
}
