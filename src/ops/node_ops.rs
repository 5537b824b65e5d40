use chrono::NaiveDate;

use crate::model::{Forest, Link, Node, NodeId};

use super::progress::{
    ProgressUpdate, complete_subtree, has_incomplete_children, recompute_progress,
};

/// Error type for node operations
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("node not found: {0}")]
    NotFound(NodeId),
    #[error("cannot complete a branch with incomplete subtasks without confirmation")]
    HasIncompleteChildren,
    #[error("completion is toggled on leaves; this branch derives it from its subtasks")]
    NotALeaf,
    #[error("no link at index {0}")]
    NoSuchLink(usize),
}

// ---------------------------------------------------------------------------
// Create / remove
// ---------------------------------------------------------------------------

/// Create a node under `parent` (or as a new root). The hint coordinates
/// seed `x`/`y` until the next layout pass overwrites them. A parent is
/// auto-expanded so the new child is visible, and its progress is
/// recomputed (a fresh incomplete child dilutes it).
pub fn create_node(
    forest: &mut Forest,
    title: &str,
    hint: Option<(f64, f64)>,
    parent: Option<NodeId>,
) -> Result<NodeId, NodeError> {
    let color = match parent {
        Some(pid) => forest
            .node(pid)
            .ok_or(NodeError::NotFound(pid))?
            .color
            .clone(),
        None => forest.next_branch_color().to_string(),
    };

    let (x, y) = hint.unwrap_or((0.0, 0.0));
    let mut node = Node::new(title, &color, x, y);
    node.parent = parent;
    let id = forest.insert(node);

    match parent {
        Some(pid) => {
            if let Some(p) = forest.node_mut(pid) {
                p.children.push(id);
                p.is_expanded = true;
            }
            recompute_progress(forest, pid);
        }
        None => forest.roots.push(id),
    }

    forest.active = Some(id);
    Ok(id)
}

/// Remove `id` and its entire subtree. The active selection is re-pointed
/// to the removed node's parent, falling back to the first remaining root,
/// and the former parent's progress is recomputed.
pub fn remove_node(forest: &mut Forest, id: NodeId) -> Result<(), NodeError> {
    if !forest.contains(id) {
        return Err(NodeError::NotFound(id));
    }

    let doomed = forest.subtree_ids(id);
    let parent = forest.detach(id);
    for nid in doomed {
        forest.remove_record(nid);
    }

    if forest.active.is_some_and(|a| !forest.contains(a)) {
        forest.active = parent.or_else(|| forest.roots.first().copied());
    }

    if let Some(pid) = parent {
        recompute_progress(forest, pid);
    }
    Ok(())
}

/// A node that was never edited: default or blank title, no description,
/// no links, no children. Such nodes may be deleted without confirmation.
pub fn is_pristine(forest: &Forest, id: NodeId) -> bool {
    forest.node(id).is_some_and(|node| {
        let default_title =
            node.title == "New Task" || node.title == "New Subtask" || node.title.trim().is_empty();
        default_title && node.description.trim().is_empty()
            && node.links.is_empty()
            && node.children.is_empty()
    })
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Set a node's completion flag and cascade.
///
/// Leaves toggle directly. Completing a branch whose children are not all
/// at 100% fails with [`NodeError::HasIncompleteChildren`]; after the user
/// confirms, call [`set_complete_recursive`]. Un-completing a branch fails
/// with [`NodeError::NotALeaf`] — branch completion is derived, so the
/// caller must un-complete a leaf instead.
pub fn set_complete(
    forest: &mut Forest,
    id: NodeId,
    completed: bool,
) -> Result<Vec<ProgressUpdate>, NodeError> {
    let node = forest.node(id).ok_or(NodeError::NotFound(id))?;

    if node.is_leaf() {
        if let Some(node) = forest.node_mut(id) {
            node.is_completed = completed;
        }
        return Ok(recompute_progress(forest, id));
    }

    if !completed {
        return Err(NodeError::NotALeaf);
    }
    if has_incomplete_children(forest, id) {
        return Err(NodeError::HasIncompleteChildren);
    }
    // All children already at 100 — the cascade just re-derives the flag
    Ok(recompute_progress(forest, id))
}

/// The confirmed branch completion: recursively complete every descendant,
/// then cascade upward.
pub fn set_complete_recursive(
    forest: &mut Forest,
    id: NodeId,
) -> Result<Vec<ProgressUpdate>, NodeError> {
    if !forest.contains(id) {
        return Err(NodeError::NotFound(id));
    }
    Ok(complete_subtree(forest, id))
}

/// Expand or collapse a node's subtree. Layout-only; progress is
/// unaffected.
pub fn set_expanded(forest: &mut Forest, id: NodeId, expanded: bool) -> Result<(), NodeError> {
    let node = forest.node_mut(id).ok_or(NodeError::NotFound(id))?;
    node.is_expanded = expanded;
    Ok(())
}

// ---------------------------------------------------------------------------
// Content edits
// ---------------------------------------------------------------------------

pub fn set_title(forest: &mut Forest, id: NodeId, title: &str) -> Result<(), NodeError> {
    let node = forest.node_mut(id).ok_or(NodeError::NotFound(id))?;
    node.title = title.trim().to_string();
    Ok(())
}

pub fn set_description(forest: &mut Forest, id: NodeId, description: &str) -> Result<(), NodeError> {
    let node = forest.node_mut(id).ok_or(NodeError::NotFound(id))?;
    node.description = description.trim().to_string();
    Ok(())
}

pub fn set_due_date(
    forest: &mut Forest,
    id: NodeId,
    due: Option<NaiveDate>,
) -> Result<(), NodeError> {
    let node = forest.node_mut(id).ok_or(NodeError::NotFound(id))?;
    node.due_date = due;
    Ok(())
}

pub fn add_link(forest: &mut Forest, id: NodeId, url: &str, label: &str) -> Result<(), NodeError> {
    let node = forest.node_mut(id).ok_or(NodeError::NotFound(id))?;
    node.links.push(Link::new(url, label));
    Ok(())
}

pub fn remove_link(forest: &mut Forest, id: NodeId, index: usize) -> Result<(), NodeError> {
    let node = forest.node_mut(id).ok_or(NodeError::NotFound(id))?;
    if index >= node.links.len() {
        return Err(NodeError::NoSuchLink(index));
    }
    node.links.remove(index);
    Ok(())
}

// ---------------------------------------------------------------------------
// Navigation helpers
// ---------------------------------------------------------------------------

/// First incomplete node in document order, the target for smart
/// centering. Falls back to the first root when everything is done.
pub fn first_incomplete(forest: &Forest) -> Option<NodeId> {
    forest
        .all_ids()
        .into_iter()
        .find(|&id| forest.node(id).is_some_and(|n| !n.is_completed))
        .or_else(|| forest.roots.first().copied())
}
