//! Parent to children connector geometry
//!
//! Each family is drawn as a bus: a drop from the parent's bottom edge to a
//! horizontal line halfway to the nearest child, the line itself, and a drop
//! into every child's top edge.

use crate::config::NodeMetrics;
use crate::spatial::SpatialIndex;
use crate::tree::ChildrenIndex;
use crate::types::{Node, NodeId, Point, Segment, SegmentKind};
use std::collections::BTreeSet;

/// Vertical distance from a node's center to its top or bottom edge
pub fn half_height(node: &Node, show_photos: bool, metrics: &NodeMetrics) -> f32 {
    if node.is_root() {
        return metrics.root.height / 2.0;
    }
    if node.shows_image(show_photos) {
        return metrics.photo.height / 2.0;
    }
    let half = metrics.text.height / 2.0;
    // Cards with a hidden photo keep the photo card's footprint
    if node.image_url.is_some() {
        half + metrics.hidden_image_compensation
    } else {
        half
    }
}

/// Segments joining `parent` to `children`; empty when there are no children
pub fn build_connections(
    parent: &Node,
    children: &[&Node],
    show_photos: bool,
    metrics: &NodeMetrics,
) -> Vec<Segment> {
    if children.is_empty() {
        return Vec::new();
    }

    let px = parent.position.x;
    let parent_bottom = parent.position.y + half_height(parent, show_photos, metrics);
    let child_top = |c: &Node| c.position.y - half_height(c, show_photos, metrics);
    let nearest_top = children
        .iter()
        .map(|&c| child_top(c))
        .fold(f32::INFINITY, f32::min);
    let bus_y = (parent_bottom + nearest_top) / 2.0;

    let mut segments = Vec::with_capacity(children.len() + 2);
    segments.push(Segment {
        kind: SegmentKind::ParentToBus,
        start: Point::new(px, parent_bottom),
        end: Point::new(px, bus_y),
    });

    let needs_bus = children.len() > 1
        || (children[0].position.x - px).abs() > metrics.bus_alignment_tolerance;
    if needs_bus {
        let (min_x, max_x) = children
            .iter()
            .fold((px, px), |(lo, hi), c| (lo.min(c.position.x), hi.max(c.position.x)));
        segments.push(Segment {
            kind: SegmentKind::Bus,
            start: Point::new(min_x, bus_y),
            end: Point::new(max_x, bus_y),
        });
    }

    for &child in children {
        segments.push(Segment {
            kind: SegmentKind::BusToChild,
            start: Point::new(child.position.x, bus_y),
            end: Point::new(child.position.x, child_top(child)),
        });
    }
    segments
}

/// Connectors for every family touching the visible set, in parent id order
///
/// A family is drawn when its parent is visible or any of its children is,
/// so lines entering the viewport from off-screen relatives are not lost.
pub fn build_all(
    visible: &[&Node],
    nodes: &SpatialIndex,
    children: &ChildrenIndex,
    show_photos: bool,
    metrics: &NodeMetrics,
) -> Vec<Segment> {
    let mut parents: BTreeSet<NodeId> = BTreeSet::new();
    for node in visible {
        if children.get(&node.id).is_some_and(|c| !c.is_empty()) {
            parents.insert(node.id);
        }
        if let Some(parent) = node.parent {
            parents.insert(parent);
        }
    }

    let mut segments = Vec::new();
    for parent_id in parents {
        let Some(parent) = nodes.get(parent_id) else {
            continue;
        };
        let Some(child_ids) = children.get(&parent_id) else {
            continue;
        };
        let kids: Vec<&Node> = child_ids.iter().filter_map(|&id| nodes.get(id)).collect();
        segments.extend(build_connections(parent, &kids, show_photos, metrics));
    }
    tracing::trace!("Built {} connector segments", segments.len());
    segments
}
