//! Test data builders for creating test objects

use kincanvas::types::HeroNode;
use kincanvas::{EngineBridge, EngineConfig, Node, NodeId, Point, TreeEngine, Viewport};

/// Builder for creating test Nodes
pub struct NodeBuilder {
    id: u64,
    x: f32,
    y: f32,
    parent: Option<u64>,
    image: Option<String>,
    label: Option<String>,
}

impl NodeBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            parent: None,
            image: None,
            label: None,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn parent(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn photo(mut self) -> Self {
        self.image = Some(format!("https://images.test/{}.jpg", self.id));
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn build(self) -> Node {
        let mut node = Node::new(self.id, self.x, self.y);
        if let Some(parent) = self.parent {
            node = node.with_parent(parent);
        }
        if let Some(url) = self.image {
            node = node.with_image(url);
        }
        if let Some(label) = self.label {
            node = node.with_label(label);
        }
        node
    }
}

/// Root at (400, 100) with three children one generation below
///
/// Child 3 carries a photo.
pub fn small_family() -> Vec<Node> {
    vec![
        NodeBuilder::new(1).at(400.0, 100.0).label("Root").build(),
        NodeBuilder::new(2).at(240.0, 250.0).parent(1).build(),
        NodeBuilder::new(3).at(400.0, 250.0).parent(1).photo().build(),
        NodeBuilder::new(4).at(560.0, 250.0).parent(1).build(),
    ]
}

pub fn hero(id: u64, x: f32, y: f32, size: u32, is_root: bool) -> HeroNode {
    HeroNode {
        node_id: NodeId(id),
        centroid: Some(Point::new(x, y)),
        subtree_size: Some(size),
        is_root,
    }
}

/// Engine with default config, an 800x600 viewport and `nodes` loaded
pub fn engine_with(nodes: Vec<Node>) -> (TreeEngine, EngineBridge) {
    let (bridge, sink) = EngineBridge::new();
    let mut engine = TreeEngine::new(EngineConfig::default(), sink);
    engine.set_viewport(Viewport::new(800.0, 600.0));
    engine.set_nodes(nodes);
    (engine, bridge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_builder() {
        let node = NodeBuilder::new(7).at(1.0, 2.0).parent(3).photo().build();
        assert_eq!(node.parent, Some(NodeId(3)));
        assert!(node.shows_image(true));
        assert_eq!(node.position, Point::new(1.0, 2.0));
    }
}
