use indexmap::IndexMap;

use super::node::{BRANCH_COLORS, Node, NodeId};

/// The whole to-do forest: arena of nodes, ordered root list, and the
/// current selection. All operations take this explicitly — there is no
/// ambient global state.
#[derive(Debug, Default)]
pub struct Forest {
    nodes: IndexMap<NodeId, Node>,
    /// Ordered root ids (no single shared root)
    pub roots: Vec<NodeId>,
    /// Currently selected node, if any
    pub active: Option<NodeId>,
    next_id: u64,
    next_color: usize,
}

impl Forest {
    pub fn new() -> Self {
        Forest::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes in the forest
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Next color in the branch palette (deterministic cycle)
    pub fn next_branch_color(&mut self) -> &'static str {
        let color = BRANCH_COLORS[self.next_color % BRANCH_COLORS.len()];
        self.next_color += 1;
        color
    }

    /// Insert a free-standing node into the arena and return its handle.
    /// The caller is responsible for attaching it to a parent's child list
    /// or to `roots`.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a single node record from the arena. Does not touch parent
    /// or child lists.
    pub(crate) fn remove_record(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.shift_remove(&id)
    }

    /// Ids of `id` and every descendant, depth-first pre-order.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                // Reverse so children pop in document order
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every node id in the forest, roots first, depth-first.
    pub fn all_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            out.extend(self.subtree_ids(root));
        }
        out
    }

    /// Detach `id` from its parent's child list (or the root list).
    /// Returns the former parent, if there was one.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        match parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        parent
    }

    /// Re-order a node's child list so incomplete children precede
    /// completed ones. Stable: ties keep insertion order.
    pub fn sort_children(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let mut kids = node.children.clone();
        kids.sort_by_key(|&c| self.nodes.get(&c).is_some_and(|n| n.is_completed));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = kids;
        }
    }

    /// Re-order the root list the same way
    pub fn sort_roots(&mut self) {
        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_key(|&r| self.nodes.get(&r).is_some_and(|n| n.is_completed));
        self.roots = roots;
    }

    /// Seed the canonical starter task, used when there is nothing to load.
    /// Returns its id.
    pub fn seed_default(&mut self) -> NodeId {
        let color = self.next_branch_color();
        let mut node = Node::new("Make List...", color, 0.0, 0.0);
        node.description = "The first task on your to-do list should always be make list \
                            so you have something to check off."
            .to_string();
        let id = self.insert(node);
        self.roots.push(id);
        self.active = Some(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(forest: &mut Forest, title: &str) -> NodeId {
        let node = Node::new(title, "#ffadad", 0.0, 0.0);
        let id = forest.insert(node);
        forest.roots.push(id);
        id
    }

    #[test]
    fn subtree_ids_are_preorder() {
        let mut forest = Forest::new();
        let root = leaf(&mut forest, "root");
        let a = forest.insert(Node::new("a", "#ffadad", 0.0, 0.0));
        let b = forest.insert(Node::new("b", "#ffadad", 0.0, 0.0));
        let a1 = forest.insert(Node::new("a1", "#ffadad", 0.0, 0.0));
        forest.node_mut(root).unwrap().children = vec![a, b];
        forest.node_mut(a).unwrap().children = vec![a1];
        forest.node_mut(a).unwrap().parent = Some(root);
        forest.node_mut(b).unwrap().parent = Some(root);
        forest.node_mut(a1).unwrap().parent = Some(a);

        assert_eq!(forest.subtree_ids(root), vec![root, a, a1, b]);
    }

    #[test]
    fn sort_children_is_stable_incomplete_first() {
        let mut forest = Forest::new();
        let root = leaf(&mut forest, "root");
        let mut ids = Vec::new();
        for (title, done) in [("a", true), ("b", false), ("c", true), ("d", false)] {
            let mut node = Node::new(title, "#ffadad", 0.0, 0.0);
            node.is_completed = done;
            node.parent = Some(root);
            ids.push(forest.insert(node));
        }
        forest.node_mut(root).unwrap().children = ids.clone();
        forest.sort_children(root);

        let order: Vec<String> = forest
            .node(root)
            .unwrap()
            .children
            .iter()
            .map(|&c| forest.node(c).unwrap().title.clone())
            .collect();
        assert_eq!(order, ["b", "d", "a", "c"]);
    }

    #[test]
    fn detach_removes_from_root_list() {
        let mut forest = Forest::new();
        let a = leaf(&mut forest, "a");
        let b = leaf(&mut forest, "b");
        assert_eq!(forest.detach(a), None);
        assert_eq!(forest.roots, vec![b]);
    }

    #[test]
    fn branch_colors_cycle() {
        let mut forest = Forest::new();
        let first = forest.next_branch_color();
        for _ in 0..7 {
            forest.next_branch_color();
        }
        assert_eq!(forest.next_branch_color(), first);
    }

    #[test]
    fn seed_default_sets_active_root() {
        let mut forest = Forest::new();
        let id = forest.seed_default();
        assert_eq!(forest.roots, vec![id]);
        assert_eq!(forest.active, Some(id));
        assert_eq!(forest.node(id).unwrap().title, "Make List...");
    }
}
