//! Synthetic pre-positioned trees for the demo viewer and benchmarks
//!
//! Positions are placed on a plain generation grid: one row per generation,
//! nodes evenly spaced and centered on x = 0. This is enough to exercise the
//! engine at scale; it is not a genealogical layout.

use crate::tree::children_index;
use crate::types::{HeroNode, Node, NodeId, Point};

/// Vertical distance between generations
pub const GENERATION_SPACING: f32 = 150.0;

/// Horizontal distance between siblings on a row
pub const SIBLING_SPACING: f32 = 160.0;

/// A full `fanout`-ary tree of `generations` rows, root first
///
/// Ids are assigned breadth-first from 0. Every third node carries a photo
/// URL.
pub fn sample_tree(generations: u32, fanout: u32) -> Vec<Node> {
    let fanout = fanout.max(1);
    let mut nodes = Vec::new();
    let mut row_start = 0u64;
    let mut row_len = 1u64;
    let mut prev_start = 0u64;

    for generation in 0..generations {
        let y = generation as f32 * GENERATION_SPACING;
        let half = (row_len as f32 - 1.0) / 2.0;
        for j in 0..row_len {
            let id = row_start + j;
            let x = (j as f32 - half) * SIBLING_SPACING;
            let mut node = Node::new(id, x, y).with_label(format!("Person {id}"));
            if generation > 0 {
                node = node.with_parent(prev_start + j / fanout as u64);
            }
            if id % 3 == 0 {
                node = node.with_image(format!("https://images.example/kin/{id}.jpg"));
            }
            nodes.push(node);
        }
        prev_start = row_start;
        row_start += row_len;
        row_len *= fanout as u64;
    }

    tracing::debug!(
        "Generated sample tree: {} generations, fanout {}, {} nodes",
        generations,
        fanout,
        nodes.len()
    );
    nodes
}

/// Heroes for the root and every node of `generation`, summarizing subtrees
///
/// The centroid is the mean position of the hero's whole subtree.
pub fn sample_heroes(nodes: &[Node], generation: u32) -> Vec<HeroNode> {
    let children = children_index(nodes);
    let by_id: std::collections::HashMap<NodeId, &Node> =
        nodes.iter().map(|n| (n.id, n)).collect();

    let subtree = |root: NodeId| -> (Point, u32) {
        let mut stack = vec![root];
        let (mut sx, mut sy, mut count) = (0.0f64, 0.0f64, 0u32);
        while let Some(id) = stack.pop() {
            if let Some(node) = by_id.get(&id) {
                sx += node.position.x as f64;
                sy += node.position.y as f64;
                count += 1;
            }
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }
        let n = count.max(1) as f64;
        (Point::new((sx / n) as f32, (sy / n) as f32), count)
    };

    let row_y = generation as f32 * GENERATION_SPACING;
    nodes
        .iter()
        .filter(|n| n.is_root() || (generation > 0 && n.position.y == row_y))
        .map(|n| {
            let (centroid, size) = subtree(n.id);
            HeroNode {
                node_id: n.id,
                centroid: Some(centroid),
                subtree_size: Some(size),
                is_root: n.is_root(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tree_shape() {
        let nodes = sample_tree(3, 2);
        assert_eq!(nodes.len(), 7);
        assert!(nodes[0].is_root());
        assert_eq!(nodes[3].parent, Some(NodeId(1)));
        assert_eq!(nodes[6].parent, Some(NodeId(2)));
        assert_eq!(nodes[6].position.y, 300.0);
        assert_eq!(nodes[1].position.x, -80.0);
        assert_eq!(nodes[2].position.x, 80.0);
    }

    #[test]
    fn test_every_third_node_has_photo() {
        let nodes = sample_tree(3, 3);
        let with_photo = nodes.iter().filter(|n| n.image_url.is_some()).count();
        assert_eq!(with_photo, 5);
    }

    #[test]
    fn test_sample_tree_is_valid() {
        let tree = crate::tree::TreeFile::new(sample_tree(4, 3), vec![]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_heroes_summarize_subtrees() {
        let nodes = sample_tree(3, 2);
        let heroes = sample_heroes(&nodes, 1);
        assert_eq!(heroes.len(), 3);

        let root = heroes.iter().find(|h| h.is_root).unwrap();
        assert_eq!(root.subtree_size, Some(7));
        assert_eq!(root.centroid.unwrap().x, 0.0);

        let left = heroes.iter().find(|h| h.node_id == NodeId(1)).unwrap();
        assert_eq!(left.subtree_size, Some(3));
        assert!(left.centroid.unwrap().x < 0.0);
    }
}
