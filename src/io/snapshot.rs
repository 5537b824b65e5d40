use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::{Forest, Link, Node, NodeId};
use crate::ops::recompute_all;

/// Error type for snapshot I/O
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("could not read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// The persisted document. Field names are camelCase so backups exported
/// by the web board restore directly.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SavedForest {
    /// Milliseconds since the epoch at save time
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub roots: Vec<SavedNode>,
}

impl SavedForest {
    /// Restoring an older snapshot over newer data loses work; callers
    /// should ask before proceeding.
    pub fn is_older_than(&self, other: &SavedForest) -> bool {
        self.timestamp < other.timestamp
    }
}

/// One persisted node. Only authored fields are stored — `progress` and
/// the layout coordinates are derived and replayed on load. Every field
/// defaults, so partially written documents still restore.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SavedNode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub links: Vec<SavedLink>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "default_true")]
    pub is_expanded: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub children: Vec<SavedNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SavedLink {
    #[serde(default)]
    pub url: String,
    /// Stored as `text` in the backup format; `label` is accepted too
    #[serde(default, alias = "label")]
    pub text: String,
}

fn default_true() -> bool {
    true
}

/// Due dates are stored as `YYYY-MM-DD` strings, empty when unset.
/// Anything unparseable reads back as None rather than failing the load.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()))
    }
}

// ---------------------------------------------------------------------------
// Forest <-> document
// ---------------------------------------------------------------------------

/// Capture the forest as a persistable document, stamped now.
pub fn snapshot(forest: &Forest) -> SavedForest {
    SavedForest {
        timestamp: Utc::now().timestamp_millis(),
        roots: forest
            .roots
            .iter()
            .filter_map(|&r| save_node(forest, r))
            .collect(),
    }
}

fn save_node(forest: &Forest, id: NodeId) -> Option<SavedNode> {
    let node = forest.node(id)?;
    Some(SavedNode {
        title: node.title.clone(),
        description: node.description.clone(),
        due_date: node.due_date,
        links: node
            .links
            .iter()
            .map(|l| SavedLink {
                url: l.url.clone(),
                text: l.label.clone(),
            })
            .collect(),
        is_completed: node.is_completed,
        is_expanded: node.is_expanded,
        color: node.color.clone(),
        children: node
            .children
            .iter()
            .filter_map(|&c| save_node(forest, c))
            .collect(),
    })
}

/// Rebuild a forest from a document and replay the progress aggregation
/// over it (derived fields are never trusted from disk). Positions are
/// left for the next layout pass.
pub fn restore(doc: &SavedForest) -> Forest {
    let mut forest = Forest::new();
    for saved in &doc.roots {
        let id = restore_node(&mut forest, saved, None);
        forest.roots.push(id);
    }
    recompute_all(&mut forest);
    forest
}

fn restore_node(forest: &mut Forest, saved: &SavedNode, parent: Option<NodeId>) -> NodeId {
    let color = if !saved.color.is_empty() {
        saved.color.clone()
    } else if let Some(pid) = parent {
        forest
            .node(pid)
            .map(|p| p.color.clone())
            .unwrap_or_default()
    } else {
        forest.next_branch_color().to_string()
    };

    let mut node = Node::new(&saved.title, &color, 0.0, 0.0);
    node.description = saved.description.clone();
    node.due_date = saved.due_date;
    node.links = saved
        .links
        .iter()
        .map(|l| Link::new(&l.url, &l.text))
        .collect();
    node.is_completed = saved.is_completed;
    node.is_expanded = saved.is_expanded;
    node.parent = parent;

    let id = forest.insert(node);
    for child in &saved.children {
        let cid = restore_node(forest, child, Some(id));
        if let Some(n) = forest.node_mut(id) {
            n.children.push(cid);
        }
    }
    id
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Save the forest to `path`.
pub fn save_forest(path: &Path, forest: &Forest) -> Result<(), SnapshotError> {
    let doc = snapshot(forest);
    let content = serde_json::to_string_pretty(&doc)?;
    atomic_write(path, content.as_bytes())?;
    Ok(())
}

/// Read the raw document at `path`.
pub fn read_snapshot(path: &Path) -> Result<SavedForest, SnapshotError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load and restore the forest at `path`.
pub fn load_forest(path: &Path) -> Result<Forest, SnapshotError> {
    Ok(restore(&read_snapshot(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{create_node, set_complete};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_forest() -> Forest {
        let mut forest = Forest::new();
        let root = create_node(&mut forest, "root", None, None).unwrap();
        let a = create_node(&mut forest, "a", None, Some(root)).unwrap();
        create_node(&mut forest, "b", None, Some(root)).unwrap();
        set_complete(&mut forest, a, true).unwrap();
        forest
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.json");
        let forest = sample_forest();

        save_forest(&path, &forest).unwrap();
        let loaded = load_forest(&path).unwrap();

        assert_eq!(loaded.len(), 3);
        let root = loaded.roots[0];
        let root_node = loaded.node(root).unwrap();
        assert_eq!(root_node.title, "root");
        // Progress was replayed, not read from disk
        assert_eq!(root_node.progress, 50);
        assert_eq!(root_node.children.len(), 2);
    }

    #[test]
    fn derived_fields_are_not_persisted() {
        let forest = sample_forest();
        let doc = snapshot(&forest);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("progress"));
        assert!(!json.contains("subtree"));
        assert!(!json.contains("\"x\""));
    }

    #[test]
    fn minimal_document_gets_defaults() {
        let doc: SavedForest =
            serde_json::from_str(r#"{"roots":[{"title":"only a title"}]}"#).unwrap();
        let forest = restore(&doc);
        let root = forest.node(forest.roots[0]).unwrap();
        assert_eq!(root.title, "only a title");
        assert_eq!(root.description, "");
        assert!(root.is_expanded);
        assert!(!root.is_completed);
        assert!(root.due_date.is_none());
        // A color was assigned from the palette
        assert!(!root.color.is_empty());
    }

    #[test]
    fn invalid_due_date_reads_as_none() {
        let doc: SavedForest = serde_json::from_str(
            r#"{"roots":[{"title":"t","dueDate":"not-a-date"},{"title":"u","dueDate":"2026-09-01"}]}"#,
        )
        .unwrap();
        assert!(doc.roots[0].due_date.is_none());
        assert_eq!(
            doc.roots[1].due_date,
            NaiveDate::from_ymd_opt(2026, 9, 1)
        );
    }

    #[test]
    fn web_board_backup_restores() {
        // Shape produced by the web board's download-backup flow
        let raw = r##"{
            "timestamp": 1724700000000,
            "roots": [{
                "title": "Ship",
                "description": "",
                "dueDate": "",
                "links": [{"url": "https://example.com", "text": "ref"}],
                "isCompleted": false,
                "isExpanded": false,
                "color": "#caffbf",
                "children": [
                    {"title": "done part", "isCompleted": true, "children": []}
                ]
            }]
        }"##;
        let doc: SavedForest = serde_json::from_str(raw).unwrap();
        let forest = restore(&doc);

        let root = forest.node(forest.roots[0]).unwrap();
        assert_eq!(root.color, "#caffbf");
        assert!(!root.is_expanded);
        assert_eq!(root.links[0].label, "ref");
        // One completed child of one: replayed progress derives completion
        assert_eq!(root.progress, 100);
        assert!(root.is_completed);
    }

    #[test]
    fn child_without_color_inherits_parents() {
        let doc: SavedForest = serde_json::from_str(
            r##"{"roots":[{"title":"p","color":"#ffd6a5","children":[{"title":"c"}]}]}"##,
        )
        .unwrap();
        let forest = restore(&doc);
        let root = forest.node(forest.roots[0]).unwrap();
        let child = forest.node(root.children[0]).unwrap();
        assert_eq!(child.color, "#ffd6a5");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_forest(&dir.path().join("absent.json")),
            Err(SnapshotError::Io(_))
        ));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.json");
        fs::write(&path, "not json {{{").unwrap();
        assert!(matches!(
            load_forest(&path),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn older_snapshot_detection() {
        let old = SavedForest {
            timestamp: 100,
            ..Default::default()
        };
        let new = SavedForest {
            timestamp: 200,
            ..Default::default()
        };
        assert!(old.is_older_than(&new));
        assert!(!new.is_older_than(&old));
    }
}
