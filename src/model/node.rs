use std::fmt;

use chrono::NaiveDate;

/// Pastel palette for branch accents. Roots cycle through it; children
/// inherit their parent's color.
pub const BRANCH_COLORS: [&str; 8] = [
    "#ffadad", "#ffd6a5", "#fdffb6", "#caffbf", "#9bf6ff", "#a0c4ff", "#bdb2ff", "#ffc6ff",
];

/// Arena handle for a node. Stable for the node's lifetime, never reused
/// within a session, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// An attached link on a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Display text; defaults to the URL without its scheme
    pub label: String,
}

impl Link {
    /// Build a link, prefixing `https://` when the URL has no scheme and
    /// deriving the label from the URL when none is given.
    pub fn new(url: &str, label: &str) -> Self {
        let url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };
        let label = if label.trim().is_empty() {
            url.trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string()
        } else {
            label.trim().to_string()
        };
        Link { url, label }
    }
}

/// A single task in the forest.
///
/// Structure is held as arena ids: `parent` is a non-owning back-reference
/// for upward cascades, `children` is the owning ordered list. Layout and
/// progress fields are derived and recomputed after every mutation; they
/// are never persisted.
#[derive(Debug, Clone)]
pub struct Node {
    /// Task title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Optional due date
    pub due_date: Option<NaiveDate>,
    /// Attached links, in insertion order
    pub links: Vec<Link>,
    /// Branch accent color (hex string)
    pub color: String,

    /// Back-reference to the owning parent (None for roots)
    pub parent: Option<NodeId>,
    /// Ordered child ids; the sibling-order invariant (incomplete before
    /// complete) is re-established by every layout pass
    pub children: Vec<NodeId>,
    /// Whether the subtree under this node is shown
    pub is_expanded: bool,

    /// Completion flag. Authoritative on leaves; on branches it is always
    /// overwritten by the progress cascade.
    pub is_completed: bool,
    /// Derived completion percentage, 0..=100
    pub progress: u8,

    // --- Layout output (derived each pass) ---
    /// Vertical space this node's visible subtree requires
    pub subtree_extent: f64,
    /// Center x in canvas space
    pub x: f64,
    /// Center y in canvas space
    pub y: f64,
    /// Whether the node is reachable through expanded ancestors
    pub visible: bool,
}

impl Node {
    /// Create a node with the given title and color, positioned at a hint
    /// that the next layout pass will overwrite.
    pub fn new(title: &str, color: &str, x: f64, y: f64) -> Self {
        Node {
            title: title.to_string(),
            description: String::new(),
            due_date: None,
            links: Vec::new(),
            color: color.to_string(),
            parent: None,
            children: Vec::new(),
            is_expanded: true,
            is_completed: false,
            progress: 0,
            subtree_extent: 0.0,
            x,
            y,
            visible: false,
        }
    }

    /// A node with no children is a leaf
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
