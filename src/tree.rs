//! Pre-positioned tree input
//!
//! The engine does not lay out trees: node positions arrive from an upstream
//! layout stage. This module loads such trees from JSON, checks their
//! structure, and derives the parent to children index the connector builder
//! needs.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": 1, "position": { "x": 0, "y": 0 }, "label": "Ada" },
//!     { "id": 2, "position": { "x": -80, "y": 150 }, "parent": 1,
//!       "image_url": "https://example.org/2.jpg", "flags": { "showing_image": true } }
//!   ],
//!   "heroes": []
//! }
//! ```

use crate::error::{KinCanvasError, Result, ResultExt};
use crate::types::{AggregationIndex, HeroNode, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Parent id to child ids, children in input order
pub type ChildrenIndex = HashMap<NodeId, Vec<NodeId>>;

/// On-disk tree: positioned nodes plus optional aggregation heroes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeFile {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub heroes: Vec<HeroNode>,
}

impl TreeFile {
    pub fn new(nodes: Vec<Node>, heroes: Vec<HeroNode>) -> Self {
        Self { nodes, heroes }
    }

    /// Parse and validate a JSON tree
    pub fn from_json(json: &str) -> Result<Self> {
        let tree: TreeFile = serde_json::from_str(json)?;
        tree.validate()?;
        Ok(tree)
    }

    /// Load and validate a JSON tree file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tree {}", path.display()))?;
        let tree = Self::from_json(&content)
            .with_context(|| format!("Failed to load tree {}", path.display()))?;
        tracing::info!(
            "Loaded tree from {:?}: {} nodes, {} heroes",
            path,
            tree.nodes.len(),
            tree.heroes.len()
        );
        Ok(tree)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content).context("Failed to write tree")
    }

    /// Reject duplicate ids and dangling parent or hero references
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id) {
                return Err(KinCanvasError::InvalidTree(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
        }
        for node in &self.nodes {
            if let Some(parent) = node.parent {
                if parent == node.id {
                    return Err(KinCanvasError::InvalidTree(format!(
                        "node {} is its own parent",
                        node.id
                    )));
                }
                if !ids.contains(&parent) {
                    return Err(KinCanvasError::InvalidTree(format!(
                        "node {} references missing parent {}",
                        node.id, parent
                    )));
                }
            }
        }
        if let Some(hero) = self.heroes.iter().find(|h| !ids.contains(&h.node_id)) {
            return Err(KinCanvasError::InvalidTree(format!(
                "hero references missing node {}",
                hero.node_id
            )));
        }
        Ok(())
    }

    pub fn aggregation(&self) -> AggregationIndex {
        AggregationIndex::new(self.heroes.clone())
    }

    pub fn into_parts(self) -> (Vec<Node>, AggregationIndex) {
        (self.nodes, AggregationIndex::new(self.heroes))
    }
}

/// Build the parent to children index for a node list
pub fn children_index(nodes: &[Node]) -> ChildrenIndex {
    let mut index: ChildrenIndex = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent {
            index.entry(parent).or_default().push(node.id);
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "nodes": [
            { "id": 1, "position": { "x": 0, "y": 0 }, "label": "Ada" },
            { "id": 2, "position": { "x": -80, "y": 150 }, "parent": 1 },
            { "id": 3, "position": { "x": 80, "y": 150 }, "parent": 1,
              "image_url": "https://example.org/3.jpg", "flags": { "showing_image": true } }
        ],
        "heroes": [
            { "node_id": 1, "centroid": { "x": 0, "y": 100 }, "subtree_size": 3, "is_root": true }
        ]
    }"#;

    #[test]
    fn test_parse_tree() {
        let tree = TreeFile::from_json(TREE).unwrap();
        assert_eq!(tree.nodes.len(), 3);
        assert!(tree.nodes[0].is_root());
        assert_eq!(tree.nodes[0].label, "Ada");
        assert!(tree.nodes[2].shows_image(true));
        assert!(!tree.nodes[1].shows_image(true));
        assert_eq!(tree.aggregation().chips().count(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let tree = TreeFile::new(vec![Node::new(1, 0.0, 0.0), Node::new(1, 5.0, 0.0)], vec![]);
        assert!(matches!(tree.validate(), Err(KinCanvasError::InvalidTree(_))));
    }

    #[test]
    fn test_missing_parent_rejected() {
        let tree = TreeFile::new(vec![Node::new(2, 0.0, 0.0).with_parent(1)], vec![]);
        let err = tree.validate().unwrap_err();
        assert!(err.to_string().contains("missing parent 1"));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(
            TreeFile::from_json("{ \"nodes\": [ {"),
            Err(KinCanvasError::Serialization(_))
        ));
    }

    #[test]
    fn test_children_index_preserves_order() {
        let tree = TreeFile::from_json(TREE).unwrap();
        let index = children_index(&tree.nodes);
        assert_eq!(index.get(&NodeId(1)), Some(&vec![NodeId(2), NodeId(3)]));
        assert!(index.get(&NodeId(2)).is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let tree = TreeFile::from_json(TREE).unwrap();
        tree.save(&path).unwrap();
        assert_eq!(TreeFile::load(&path).unwrap(), tree);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = TreeFile::load(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read tree"));
    }
}
