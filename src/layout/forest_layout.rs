use crate::model::Forest;

use super::{HeightSource, ROOT_GAP, assign_positions, compute_extent};

/// Re-layout the whole forest. The single entry point collaborators call
/// after any mutation.
///
/// Sorts the root list (incomplete roots first, stable), measures every
/// root's subtree extent, hides every node, then assigns positions per
/// root — revealing exactly the nodes reachable through expanded
/// ancestors. Roots stack vertically with [`ROOT_GAP`] between their
/// bands and the whole forest centered on y = 0, x = 0 for roots.
///
/// Idempotent: with no mutation in between, a second call produces
/// identical coordinates. An empty forest is a no-op.
pub fn layout_forest(forest: &mut Forest, heights: &dyn HeightSource) {
    if forest.roots.is_empty() {
        return;
    }

    forest.sort_roots();

    let roots = forest.roots.clone();
    for &root in &roots {
        compute_extent(forest, heights, root);
    }

    for id in forest.all_ids() {
        if let Some(node) = forest.node_mut(id) {
            node.visible = false;
        }
    }

    let total: f64 = roots
        .iter()
        .map(|&r| forest.node(r).map_or(0.0, |n| n.subtree_extent))
        .sum::<f64>()
        + ROOT_GAP * (roots.len() - 1) as f64;

    let mut band_top = -total / 2.0;
    for &root in &roots {
        let extent = forest.node(root).map_or(0.0, |n| n.subtree_extent);
        assign_positions(forest, root, 0.0, band_top + extent / 2.0);
        band_top += extent + ROOT_GAP;
    }
}
