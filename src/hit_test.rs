//! Tap to selection resolution
//!
//! In the aggregated tier the screen shows hero chips instead of cards, so
//! taps are tested against chip boxes in screen space and a miss stays a
//! miss. In every other tier the tap is mapped to world space and tested
//! against card boxes. The first box containing the tap wins.

use crate::config::{HitTestConfig, NodeMetrics, RuntimeSettings};
use crate::lod::DetailTier;
use crate::types::{AggregationIndex, HeroChip, Node, NodeId, Point, Rect, Size, Transform};

/// What a tap landed on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    Chip(HeroChip),
    Node(NodeId),
    Miss,
}

impl Selection {
    pub fn is_miss(&self) -> bool {
        matches!(self, Selection::Miss)
    }

    /// Node the selection refers to, for chips the hero node
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Selection::Chip(chip) => Some(chip.node_id),
            Selection::Node(id) => Some(*id),
            Selection::Miss => None,
        }
    }
}

/// World-space card size for a node as currently drawn
pub fn card_size(node: &Node, show_photos: bool, metrics: &NodeMetrics) -> Size {
    if node.is_root() {
        metrics.root
    } else if node.shows_image(show_photos) {
        metrics.photo
    } else {
        metrics.text
    }
}

/// Screen-space chip box
pub fn chip_rect(chip: &HeroChip, transform: &Transform, config: &HitTestConfig) -> Rect {
    let edge = if chip.is_root {
        config.chip_size * config.root_chip_multiplier
    } else {
        config.chip_size
    };
    Rect::from_center(transform.world_to_screen(chip.centroid), Size::new(edge, edge))
}

/// Resolve a screen tap against what is currently drawn
#[allow(clippy::too_many_arguments)]
pub fn resolve_tap(
    screen: Point,
    tier: DetailTier,
    transform: &Transform,
    visible: &[&Node],
    aggregation: Option<&AggregationIndex>,
    settings: &RuntimeSettings,
    config: &HitTestConfig,
    metrics: &NodeMetrics,
) -> Selection {
    if tier == DetailTier::Aggregated && settings.aggregation_enabled {
        let Some(index) = aggregation else {
            return Selection::Miss;
        };
        return index
            .chips()
            .find(|chip| chip_rect(chip, transform, config).contains(screen))
            .map_or(Selection::Miss, Selection::Chip);
    }

    let world = transform.screen_to_world(screen);
    let photos = tier.draws_photos(settings.show_photos);
    visible
        .iter()
        .find(|node| Rect::from_center(node.position, card_size(node, photos, metrics)).contains(world))
        .map_or(Selection::Miss, |node| Selection::Node(node.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeroNode;

    fn resolve(
        screen: Point,
        tier: DetailTier,
        transform: &Transform,
        visible: &[&Node],
        aggregation: Option<&AggregationIndex>,
    ) -> Selection {
        resolve_tap(
            screen,
            tier,
            transform,
            visible,
            aggregation,
            &RuntimeSettings::default(),
            &HitTestConfig::default(),
            &NodeMetrics::default(),
        )
    }

    fn heroes() -> AggregationIndex {
        AggregationIndex::new(vec![
            HeroNode {
                node_id: NodeId(1),
                centroid: Some(Point::new(100.0, 100.0)),
                subtree_size: Some(40),
                is_root: true,
            },
            HeroNode {
                node_id: NodeId(2),
                centroid: None,
                subtree_size: Some(3),
                is_root: false,
            },
            HeroNode {
                node_id: NodeId(3),
                centroid: Some(Point::new(300.0, 100.0)),
                subtree_size: Some(8),
                is_root: false,
            },
        ])
    }

    #[test]
    fn test_node_center_hits_and_one_unit_outside_misses() {
        let node = Node::new(7, 0.0, 0.0).with_parent(1).with_image("u");
        let visible = [&node];
        let t = Transform::IDENTITY;
        assert_eq!(resolve(Point::ZERO, DetailTier::Full, &t, &visible, None), Selection::Node(NodeId(7)));

        // Photo card is 120 wide; its edge is inclusive
        assert_eq!(resolve(Point::new(60.0, 0.0), DetailTier::Full, &t, &visible, None), Selection::Node(NodeId(7)));
        assert_eq!(resolve(Point::new(61.0, 0.0), DetailTier::Full, &t, &visible, None), Selection::Miss);
    }

    #[test]
    fn test_root_uses_larger_box() {
        let root = Node::new(1, 0.0, 0.0);
        let visible = [&root];
        let t = Transform::IDENTITY;
        assert_eq!(resolve(Point::new(0.0, 44.0), DetailTier::Full, &t, &visible, None), Selection::Node(NodeId(1)));
        assert_eq!(resolve(Point::new(0.0, 46.0), DetailTier::Full, &t, &visible, None), Selection::Miss);
    }

    #[test]
    fn test_text_card_height_when_photos_hidden() {
        let node = Node::new(4, 0.0, 0.0).with_parent(1).with_image("u");
        let visible = [&node];
        let settings = RuntimeSettings {
            show_photos: false,
            ..Default::default()
        };
        let hit = resolve_tap(
            Point::new(0.0, 30.0),
            DetailTier::Full,
            &Transform::IDENTITY,
            &visible,
            None,
            &settings,
            &HitTestConfig::default(),
            &NodeMetrics::default(),
        );
        assert_eq!(hit, Selection::Miss);
    }

    #[test]
    fn test_compact_tier_uses_text_card_height() {
        // Photo card is 75 tall, text card 40; compact cards drop the photo
        let node = Node::new(5, 0.0, 0.0).with_parent(1).with_image("u");
        let visible = [&node];
        let t = Transform::IDENTITY;
        assert_eq!(resolve(Point::new(0.0, 30.0), DetailTier::Full, &t, &visible, None), Selection::Node(NodeId(5)));
        assert_eq!(resolve(Point::new(0.0, 30.0), DetailTier::Compact, &t, &visible, None), Selection::Miss);
    }

    #[test]
    fn test_tap_is_mapped_through_transform() {
        let node = Node::new(9, 100.0, 50.0).with_parent(1);
        let visible = [&node];
        let t = Transform::new(10.0, 20.0, 2.0);
        // World (100, 50) is at screen (210, 120)
        assert_eq!(resolve(Point::new(210.0, 120.0), DetailTier::Compact, &t, &visible, None), Selection::Node(NodeId(9)));
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let a = Node::new(1, 0.0, 0.0).with_parent(9);
        let b = Node::new(2, 10.0, 0.0).with_parent(9);
        let t = Transform::IDENTITY;
        assert_eq!(resolve(Point::new(5.0, 0.0), DetailTier::Full, &t, &[&a, &b], None), Selection::Node(NodeId(1)));
        assert_eq!(resolve(Point::new(5.0, 0.0), DetailTier::Full, &t, &[&b, &a], None), Selection::Node(NodeId(2)));
    }

    #[test]
    fn test_aggregated_tier_hits_chips_in_screen_space() {
        let index = heroes();
        let t = Transform::new(0.0, 0.0, 0.5);
        // Chip 3 centroid (300, 100) maps to screen (150, 50)
        match resolve(Point::new(170.0, 50.0), DetailTier::Aggregated, &t, &[], Some(&index)) {
            Selection::Chip(chip) => assert_eq!(chip.node_id, NodeId(3)),
            other => panic!("expected chip, got {other:?}"),
        }
        // Root chip is 66px: 32px from its center still hits
        assert!(matches!(
            resolve(Point::new(50.0, 82.0), DetailTier::Aggregated, &t, &[], Some(&index)),
            Selection::Chip(c) if c.node_id == NodeId(1)
        ));
    }

    #[test]
    fn test_aggregated_miss_does_not_fall_through_to_nodes() {
        let index = heroes();
        let node = Node::new(5, 0.0, 0.0).with_parent(1);
        let t = Transform::IDENTITY;
        assert_eq!(
            resolve(Point::ZERO, DetailTier::Aggregated, &t, &[&node], Some(&index)),
            Selection::Miss
        );
        assert_eq!(resolve(Point::ZERO, DetailTier::Aggregated, &t, &[&node], None), Selection::Miss);
    }

    #[test]
    fn test_aggregation_disabled_uses_nodes() {
        let index = heroes();
        let node = Node::new(5, 0.0, 0.0).with_parent(1);
        let settings = RuntimeSettings {
            aggregation_enabled: false,
            ..Default::default()
        };
        let hit = resolve_tap(
            Point::ZERO,
            DetailTier::Aggregated,
            &Transform::IDENTITY,
            &[&node],
            Some(&index),
            &settings,
            &HitTestConfig::default(),
            &NodeMetrics::default(),
        );
        assert_eq!(hit, Selection::Node(NodeId(5)));
    }
}
