//! Core data types for kincanvas
//!
//! This module contains the geometry primitives and tree data structures used
//! throughout the engine. Everything here is plain data: the components that
//! interpret it live in their own modules.
//!
//! # Main Types
//!
//! - [`Point`] / [`Vec2`] / [`Size`] / [`Rect`] - 2D geometry in `f32`
//! - [`Transform`] - World to screen affine map (`screen = world * scale + translate`)
//! - [`Viewport`] - On-screen drawing area in logical pixels
//! - [`NodeId`] / [`Node`] - A positioned person in the tree
//! - [`HeroNode`] / [`HeroChip`] / [`AggregationIndex`] - Collapsed subtree representatives
//! - [`Segment`] - One connector line emitted for the renderer
//!
//! # Coordinate Spaces
//!
//! Node positions are in *world* space, supplied by an external layout stage.
//! Taps, viewports and chip boxes are in *screen* space. [`Transform`] is the
//! only bridge between the two.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

// ==================== Geometry ====================

/// A position in either world or screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    /// Midpoint between two points
    #[inline]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// A displacement or velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Scale the vector down so its length does not exceed `max`
    pub fn clamp_length(self, max: f32) -> Vec2 {
        let len = self.length();
        if len > max && len > 0.0 {
            self * (max / len)
        } else {
            self
        }
    }
}

impl Add<Vec2> for Point {
    type Output = Point;
    fn add(self, rhs: Vec2) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Vec2;
    fn sub(self, rhs: Point) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle stored as min/max edges
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    #[inline]
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rectangle of `size` centered on `center`
    pub fn from_center(center: Point, size: Size) -> Self {
        let hw = size.width * 0.5;
        let hh = size.height * 0.5;
        Self::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Boundary-inclusive containment test
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Smallest rectangle enclosing every point, or `None` for an empty iterator
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in iter {
            rect.min_x = rect.min_x.min(p.x);
            rect.min_y = rect.min_y.min(p.y);
            rect.max_x = rect.max_x.max(p.x);
            rect.max_y = rect.max_y.max(p.y);
        }
        Some(rect)
    }
}

// ==================== Transform ====================

/// Affine map from world space to screen space
///
/// `screen = world * scale + translate`. The gesture engine writes it during
/// interaction and the camera writes it during programmatic navigation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub const fn new(translate_x: f32, translate_y: f32, scale: f32) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    #[inline]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    #[inline]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.translate_x,
            world.y * self.scale + self.translate_y,
        )
    }

    #[inline]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }

    /// Map a screen-space rectangle to world space
    pub fn screen_rect_to_world(&self, rect: Rect) -> Rect {
        let a = self.screen_to_world(Point::new(rect.min_x, rect.min_y));
        let b = self.screen_to_world(Point::new(rect.max_x, rect.max_y));
        Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// Copy of this transform with the scale clamped to `[min, max]`
    pub fn clamped(self, min_scale: f32, max_scale: f32) -> Self {
        Self {
            scale: self.scale.clamp(min_scale, max_scale),
            ..self
        }
    }
}

/// On-screen drawing area in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    #[inline]
    pub fn screen_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

// ==================== Nodes ====================

/// Stable identifier of a person in the tree
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-node transient render state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderFlags {
    /// Whether the node's card currently displays its photo
    #[serde(default)]
    pub showing_image: bool,
}

/// A positioned person in the tree
///
/// Positions come from an external layout stage and are immutable during a
/// render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    /// `None` for the tree root
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub flags: RenderFlags,
    /// Display label, not interpreted by the engine
    #[serde(default)]
    pub label: String,
}

impl Node {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id: NodeId(id),
            position: Point::new(x, y),
            parent: None,
            image_url: None,
            flags: RenderFlags::default(),
            label: String::new(),
        }
    }

    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = Some(NodeId(parent));
        self
    }

    /// Attach a photo URL; the node starts out showing it
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self.flags.showing_image = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether the card is drawn with its photo under the given global toggle
    #[inline]
    pub fn shows_image(&self, show_photos: bool) -> bool {
        show_photos && self.flags.showing_image && self.image_url.is_some()
    }
}

// ==================== Aggregation ====================

/// Externally supplied representative of a collapsed subtree
///
/// Centroid and subtree size may be missing while the aggregation pass is
/// still being computed upstream; such heroes are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroNode {
    pub node_id: NodeId,
    #[serde(default)]
    pub centroid: Option<Point>,
    #[serde(default)]
    pub subtree_size: Option<u32>,
    #[serde(default)]
    pub is_root: bool,
}

/// A hero node with complete data, ready to draw or hit-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroChip {
    pub node_id: NodeId,
    pub centroid: Point,
    pub subtree_size: u32,
    pub is_root: bool,
}

impl HeroNode {
    /// Resolve into a chip, or `None` if centroid or size is missing
    pub fn chip(&self) -> Option<HeroChip> {
        Some(HeroChip {
            node_id: self.node_id,
            centroid: self.centroid?,
            subtree_size: self.subtree_size?,
            is_root: self.is_root,
        })
    }
}

/// All heroes for the aggregated tier, in hit-test priority order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationIndex {
    pub heroes: Vec<HeroNode>,
}

impl AggregationIndex {
    pub fn new(heroes: Vec<HeroNode>) -> Self {
        Self { heroes }
    }

    /// Chips with complete data, preserving order
    pub fn chips(&self) -> impl Iterator<Item = HeroChip> + '_ {
        self.heroes.iter().filter_map(HeroNode::chip)
    }
}

// ==================== Connectors ====================

/// Which part of a parent/children connection a segment draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Vertical drop from the parent's bottom edge to the bus line
    ParentToBus,
    /// Horizontal line spanning the children
    Bus,
    /// Vertical drop from the bus line to a child's top edge
    BusToChild,
}

/// A single connector line in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: Point,
    pub end: Point,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_round_trip() {
        let t = Transform::new(40.0, -12.0, 2.5);
        let world = Point::new(13.0, 7.0);
        let back = t.screen_to_world(t.world_to_screen(world));
        assert!((back.x - world.x).abs() < 1e-4);
        assert!((back.y - world.y).abs() < 1e-4);
    }

    #[test]
    fn test_rect_contains_is_inclusive() {
        let r = Rect::from_center(Point::new(0.0, 0.0), Size::new(10.0, 4.0));
        assert!(r.contains(Point::new(5.0, 2.0)));
        assert!(r.contains(Point::new(-5.0, -2.0)));
        assert!(!r.contains(Point::new(5.01, 0.0)));
    }

    #[test]
    fn test_rect_enclosing() {
        assert!(Rect::enclosing(Vec::<Point>::new()).is_none());
        let r = Rect::enclosing([Point::new(1.0, 5.0), Point::new(-3.0, 2.0)]).unwrap();
        assert_eq!(r, Rect::new(-3.0, 2.0, 1.0, 5.0));
    }

    #[test]
    fn test_hero_without_centroid_has_no_chip() {
        let hero = HeroNode {
            node_id: NodeId(3),
            centroid: None,
            subtree_size: Some(12),
            is_root: false,
        };
        assert!(hero.chip().is_none());

        let index = AggregationIndex::new(vec![
            hero,
            HeroNode {
                node_id: NodeId(4),
                centroid: Some(Point::new(1.0, 1.0)),
                subtree_size: Some(2),
                is_root: true,
            },
        ]);
        let chips: Vec<_> = index.chips().collect();
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].node_id, NodeId(4));
    }

    #[test]
    fn test_shows_image_requires_url_and_toggle() {
        let node = Node::new(1, 0.0, 0.0).with_image("https://img/1");
        assert!(node.shows_image(true));
        assert!(!node.shows_image(false));

        let mut bare = Node::new(2, 0.0, 0.0);
        bare.flags.showing_image = true;
        assert!(!bare.shows_image(true));
    }

    #[test]
    fn test_clamp_length() {
        let v = Vec2::new(30.0, 40.0).clamp_length(10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert_eq!(Vec2::new(1.0, 0.0).clamp_length(10.0), Vec2::new(1.0, 0.0));
    }
}
