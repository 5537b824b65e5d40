use crate::model::{Forest, NodeId};

use super::{GAP, HeightSource, own_height_or_default};

/// Compute the vertical space `id`'s visible subtree requires, post-order.
///
/// Re-establishes the sibling-order invariant (incomplete before complete,
/// stable) on the child list before measuring. A leaf or collapsed node
/// needs only its own height; an expanded branch needs the larger of its
/// own height and its children's stacked extents.
///
/// The result is stored on `subtree_extent` and returned.
pub fn compute_extent(forest: &mut Forest, heights: &dyn HeightSource, id: NodeId) -> f64 {
    forest.sort_children(id);

    let Some(node) = forest.node(id) else {
        return 0.0;
    };
    let own = own_height_or_default(heights, node);
    let children = node.children.clone();
    let collapsed = !node.is_expanded;

    let extent = if children.is_empty() || collapsed {
        own
    } else {
        let mut stacked = 0.0;
        for &child in &children {
            stacked += compute_extent(forest, heights, child) + GAP;
        }
        stacked -= GAP;
        own.max(stacked)
    };

    if let Some(node) = forest.node_mut(id) {
        node.subtree_extent = extent;
    }
    extent
}
