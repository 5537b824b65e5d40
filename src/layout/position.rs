use crate::model::{Forest, NodeId};

use super::{GAP, HORIZONTAL_SPACING};

/// Place `id` at the given center coordinates and lay out its visible
/// descendants, pre-order.
///
/// The node is marked visible. If it is collapsed or a leaf the walk stops
/// there; hidden descendants keep their stale coordinates and stay
/// invisible. Otherwise each child gets a vertical band of its own extent
/// inside the parent's band, separated by [`GAP`], with the child centered
/// in its band and shifted right by [`HORIZONTAL_SPACING`].
///
/// Assumes `compute_extent` has already run over the subtree.
pub fn assign_positions(forest: &mut Forest, id: NodeId, x: f64, center_y: f64) {
    let Some(node) = forest.node_mut(id) else {
        return;
    };
    node.x = x;
    node.y = center_y;
    node.visible = true;

    if node.children.is_empty() || !node.is_expanded {
        return;
    }

    let extent = node.subtree_extent;
    let children = node.children.clone();

    let mut band_top = center_y - extent / 2.0;
    for child in children {
        let child_extent = forest.node(child).map_or(0.0, |n| n.subtree_extent);
        let child_center = band_top + child_extent / 2.0;
        assign_positions(forest, child, x + HORIZONTAL_SPACING, child_center);
        band_top += child_extent + GAP;
    }
}
