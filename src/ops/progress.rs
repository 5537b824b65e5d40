use crate::model::{Forest, NodeId};

/// One node's recomputed completion state, emitted so the renderer can
/// update its progress bar and checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub id: NodeId,
    pub progress: u8,
    pub is_completed: bool,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Recompute `id`'s progress from its children and cascade the result up
/// to every ancestor. Returns one update per touched node, starting at
/// `id` and ending at its root.
///
/// A leaf is 0 or 100 from its own `is_completed`; a branch is the floored
/// average of its children and its `is_completed` is derived from that
/// (100 forces it true, anything less forces it false).
pub fn recompute_progress(forest: &mut Forest, id: NodeId) -> Vec<ProgressUpdate> {
    let mut updates = Vec::new();
    let mut current = Some(id);

    while let Some(nid) = current {
        let Some(node) = forest.node(nid) else {
            break;
        };

        let (progress, derived) = if node.children.is_empty() {
            (if node.is_completed { 100 } else { 0 }, None)
        } else {
            let sum: u32 = node
                .children
                .iter()
                .filter_map(|&c| forest.node(c))
                .map(|n| n.progress as u32)
                .sum();
            let progress = (sum / node.children.len() as u32) as u8;
            (progress, Some(progress == 100))
        };

        let Some(node) = forest.node_mut(nid) else {
            break;
        };
        node.progress = progress;
        if let Some(completed) = derived {
            node.is_completed = completed;
        }
        updates.push(ProgressUpdate {
            id: nid,
            progress,
            is_completed: node.is_completed,
        });
        current = node.parent;
    }

    updates
}

/// Recompute every node's progress bottom-up, post-order. Used after a
/// load, where derived fields start blank.
pub fn recompute_all(forest: &mut Forest) {
    let roots = forest.roots.clone();
    for root in roots {
        recompute_subtree(forest, root);
    }
}

fn recompute_subtree(forest: &mut Forest, id: NodeId) {
    let Some(node) = forest.node(id) else {
        return;
    };
    let children = node.children.clone();
    for child in children {
        recompute_subtree(forest, child);
    }

    let Some(node) = forest.node(id) else {
        return;
    };
    let (progress, derived) = if node.children.is_empty() {
        (if node.is_completed { 100 } else { 0 }, None)
    } else {
        let sum: u32 = node
            .children
            .iter()
            .filter_map(|&c| forest.node(c))
            .map(|n| n.progress as u32)
            .sum();
        let progress = (sum / node.children.len() as u32) as u8;
        (progress, Some(progress == 100))
    };
    if let Some(node) = forest.node_mut(id) {
        node.progress = progress;
        if let Some(completed) = derived {
            node.is_completed = completed;
        }
    }
}

// ---------------------------------------------------------------------------
// Bulk completion
// ---------------------------------------------------------------------------

/// Does any direct child sit below 100%? Gate for the confirm-before-
/// completing-a-branch flow.
pub fn has_incomplete_children(forest: &Forest, id: NodeId) -> bool {
    forest.node(id).is_some_and(|node| {
        node.children
            .iter()
            .filter_map(|&c| forest.node(c))
            .any(|n| n.progress < 100)
    })
}

/// Mark `id` and every descendant complete, then cascade from `id` upward.
/// This is the confirmed bulk set, not aggregation — callers must get the
/// user's go-ahead first when incomplete descendants exist.
pub fn complete_subtree(forest: &mut Forest, id: NodeId) -> Vec<ProgressUpdate> {
    for nid in forest.subtree_ids(id) {
        if let Some(node) = forest.node_mut(nid) {
            node.is_completed = true;
            node.progress = 100;
        }
    }
    recompute_progress(forest, id)
}
