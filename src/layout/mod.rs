pub mod extent;
pub mod forest_layout;
pub mod position;

pub use extent::compute_extent;
pub use forest_layout::layout_forest;
pub use position::assign_positions;

use crate::model::Node;

/// Horizontal distance between a parent's center and its children's centers
pub const HORIZONTAL_SPACING: f64 = 380.0;
/// Vertical gap between sibling subtree bands
pub const GAP: f64 = 30.0;
/// Vertical gap between root subtrees
pub const ROOT_GAP: f64 = 100.0;
/// Height used when a node has not been measured yet
pub const DEFAULT_NODE_HEIGHT: f64 = 150.0;

/// Supplies each node's own visual height. The rendering side implements
/// this against real measured boxes; `None` means the node has no
/// measurement yet and the layout falls back to [`DEFAULT_NODE_HEIGHT`].
pub trait HeightSource {
    fn own_height(&self, node: &Node) -> Option<f64>;
}

/// Every node reports the same fixed height. The default collaborator for
/// headless use and tests.
#[derive(Debug, Clone, Copy)]
pub struct UniformHeight(pub f64);

impl Default for UniformHeight {
    fn default() -> Self {
        UniformHeight(DEFAULT_NODE_HEIGHT)
    }
}

impl HeightSource for UniformHeight {
    fn own_height(&self, _node: &Node) -> Option<f64> {
        Some(self.0)
    }
}

/// Rough height estimate from a node's content, for headless layout that
/// still varies with text and links.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedHeight;

impl HeightSource for EstimatedHeight {
    fn own_height(&self, node: &Node) -> Option<f64> {
        let mut height = DEFAULT_NODE_HEIGHT;
        if !node.description.is_empty() {
            // One text row per ~40 chars of description
            height += 20.0 * (1 + node.description.len() / 40) as f64;
        }
        height += 18.0 * node.links.len() as f64;
        if node.due_date.is_some() {
            height += 24.0;
        }
        Some(height)
    }
}

pub(crate) fn own_height_or_default(heights: &dyn HeightSource, node: &Node) -> f64 {
    heights.own_height(node).unwrap_or(DEFAULT_NODE_HEIGHT)
}
