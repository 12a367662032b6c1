//! Frame orchestration
//!
//! [`TreeEngine`] owns every component and runs them in a fixed order once
//! per frame:
//!
//! 1. Time-based gesture recognition (long-press)
//! 2. Camera animations (momentum, bounce, navigation)
//! 3. LOD tier for the new scale
//! 4. Visible set, connectors and chips, reused from the previous frame when
//!    nothing they depend on has changed
//! 5. Image buckets and loads for the visible set
//!
//! Pointer input arrives between frames through [`TreeEngine::handle_pointer`].
//! Everything the application must react to leaves through the [`EventSink`].

use crate::bridge::{EngineEvent, EventSink, HapticKind};
use crate::camera::{visible_bounds, CameraController, NavigationCallbacks, NavigationId, TransformState};
use crate::config::{EngineConfig, RuntimeSettings, ViewState};
use crate::connectors;
use crate::gesture::{GestureCallbacks, GestureEngine, PointerEvent};
use crate::hit_test::{resolve_tap, Selection};
use crate::images::{ImageDisplay, ImageLoader, ImagePipeline};
use crate::lod::{select_tier, DetailTier, TierState};
use crate::spatial::SpatialIndex;
use crate::tree::{children_index, ChildrenIndex};
use crate::types::{AggregationIndex, HeroChip, Node, NodeId, Point, Rect, Segment, Transform, Viewport};
use std::sync::Arc;
use std::time::Instant;

/// Everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub transform: Transform,
    pub tier: DetailTier,
    /// World region covered by the visible query, margins included
    pub bounds: Rect,
    pub visible: Arc<Vec<NodeId>>,
    pub connectors: Arc<Vec<Segment>>,
    /// Hero chips, only in the aggregated tier
    pub chips: Arc<Vec<HeroChip>>,
    pub highlight: Option<NodeId>,
    /// True while another frame is needed without new input
    pub animating: bool,
}

/// Inputs the cached frame geometry depends on
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameKey {
    transform: Transform,
    viewport: Viewport,
    tier: DetailTier,
    show_photos: bool,
    aggregation_enabled: bool,
    generation: u64,
}

#[derive(Debug, Clone)]
struct FrameCache {
    key: FrameKey,
    bounds: Rect,
    visible: Arc<Vec<NodeId>>,
    connectors: Arc<Vec<Segment>>,
    chips: Arc<Vec<HeroChip>>,
}

/// Gesture results collected during one input dispatch
#[derive(Default)]
struct GestureOutcomes {
    taps: Vec<Point>,
    long_presses: Vec<Point>,
    rested: Option<Transform>,
}

impl GestureCallbacks for GestureOutcomes {
    fn on_tap(&mut self, screen: Point) {
        self.taps.push(screen);
    }

    fn on_long_press(&mut self, screen: Point) {
        self.long_presses.push(screen);
    }

    fn on_pan_end(&mut self, transform: Transform, momentum: bool) {
        if !momentum {
            self.rested = Some(transform);
        }
    }

    fn on_pinch_end(&mut self, transform: Transform) {
        self.rested = Some(transform);
    }
}

/// The tree rendering and interaction engine
pub struct TreeEngine {
    config: EngineConfig,
    settings: RuntimeSettings,
    viewport: Viewport,
    index: SpatialIndex,
    children: ChildrenIndex,
    aggregation: Option<AggregationIndex>,
    state: TransformState,
    tier: TierState,
    gestures: GestureEngine,
    camera: CameraController,
    images: ImagePipeline,
    sink: EventSink,
    highlight: Option<NodeId>,
    generation: u64,
    cache: Option<FrameCache>,
    published_visible: Option<Arc<Vec<NodeId>>>,
}

impl TreeEngine {
    pub fn new(config: EngineConfig, sink: EventSink) -> Self {
        let state = TransformState::new(
            Transform::IDENTITY,
            config.camera.min_zoom,
            config.camera.max_zoom,
        );
        Self {
            settings: RuntimeSettings::default(),
            viewport: Viewport::new(0.0, 0.0),
            index: SpatialIndex::build(
                Vec::new(),
                config.spatial.cell_size,
                config.spatial.max_visible_nodes,
            ),
            children: ChildrenIndex::new(),
            aggregation: None,
            state,
            tier: TierState::new(),
            gestures: GestureEngine::new(&config.gesture, &config.camera),
            camera: CameraController::new(config.camera.clone()),
            images: ImagePipeline::new(&config.bucket, None),
            sink,
            highlight: None,
            generation: 0,
            cache: None,
            published_visible: None,
            config,
        }
    }

    // ==================== Inputs ====================

    /// Replace the node list; rebuilds the grid and drops image state
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.children = children_index(&nodes);
        self.index = SpatialIndex::build(
            nodes,
            self.config.spatial.cell_size,
            self.config.spatial.max_visible_nodes,
        );
        self.gestures.set_content_bounds(self.index.content_bounds());
        self.images.clear();
        if self.highlight.is_some_and(|id| self.index.get(id).is_none()) {
            self.highlight = None;
        }
        self.invalidate();
    }

    pub fn set_aggregation(&mut self, aggregation: Option<AggregationIndex>) {
        self.aggregation = aggregation;
        self.invalidate();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.gestures.set_viewport(viewport);
        }
    }

    pub fn set_image_loader(&mut self, loader: Option<Box<dyn ImageLoader>>) {
        self.images.set_loader(loader);
    }

    pub fn set_settings(&mut self, settings: RuntimeSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RuntimeSettings {
        &mut self.settings
    }

    pub fn set_highlight(&mut self, highlight: Option<NodeId>) {
        self.highlight = highlight;
    }

    /// Feed one pointer event from the host
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let mut outcomes = GestureOutcomes::default();
        self.gestures.handle(event, &mut self.state, &mut outcomes);
        self.apply_outcomes(outcomes);
    }

    /// Drop all tracked pointers, e.g. when the host loses focus
    pub fn cancel_input(&mut self, now: Instant) {
        self.gestures.reset(&mut self.state, now);
    }

    /// Wheel or trackpad zoom around a screen point
    pub fn zoom_at(&mut self, factor: f32, focal: Point, now: Instant) {
        self.gestures.zoom_at(factor, focal, now, &mut self.state);
    }

    /// Animate the camera to a node; `None` if the node is unknown
    pub fn navigate_to(&mut self, id: NodeId, now: Instant) -> Option<NavigationId> {
        let position = self.index.get(id)?.position;
        let nav_id = self.camera.next_id();

        let target_sink = self.sink.clone();
        let settled_sink = self.sink.clone();
        let callbacks = NavigationCallbacks {
            on_target: Some(Box::new(move |transform, bounds| {
                target_sink.publish(EngineEvent::NavigationTarget {
                    id: nav_id,
                    transform,
                    bounds,
                });
            })),
            on_settled: Some(Box::new(move |id| {
                settled_sink.publish(EngineEvent::NavigationSettled(id));
            })),
        };

        let started =
            self.camera
                .navigate_to_node(position, &mut self.state, self.viewport, callbacks, now);
        self.highlight = Some(id);
        Some(started)
    }

    // ==================== Frame ====================

    /// Advance one frame
    pub fn frame(&mut self, now: Instant) -> FrameOutput {
        let mut outcomes = GestureOutcomes::default();
        self.gestures.tick(now, &mut outcomes);
        self.apply_outcomes(outcomes);

        let step = self.state.step(now);
        if step.settled {
            self.sink
                .publish(EngineEvent::TransformSnapshot(self.state.transform()));
        }

        let transform = self.state.transform();
        let tier = select_tier(transform.scale, &mut self.tier, &self.config.lod, &self.settings);
        let photos = tier.draws_photos(self.settings.show_photos);
        let key = FrameKey {
            transform,
            viewport: self.viewport,
            tier,
            show_photos: photos,
            aggregation_enabled: self.settings.aggregation_enabled,
            generation: self.generation,
        };

        let cache = match self.cache.take() {
            Some(cache) if cache.key == key => cache,
            _ => self.build_frame(key),
        };

        let visible: Vec<&Node> = cache
            .visible
            .iter()
            .filter_map(|&id| self.index.get(id))
            .collect();
        self.images.update(
            &visible,
            transform.scale,
            self.config.metrics.photo.width,
            self.config.lod.device_pixel_ratio,
            photos,
            now,
        );

        let changed = self
            .published_visible
            .as_ref()
            .map_or(true, |prev| !Arc::ptr_eq(prev, &cache.visible) && **prev != *cache.visible);
        if changed {
            self.sink.publish(EngineEvent::VisibleSetChanged {
                ids: cache.visible.to_vec(),
                bounds: cache.bounds,
            });
        }
        self.published_visible = Some(cache.visible.clone());

        let output = FrameOutput {
            transform,
            tier,
            bounds: cache.bounds,
            visible: cache.visible.clone(),
            connectors: cache.connectors.clone(),
            chips: cache.chips.clone(),
            highlight: self.highlight,
            animating: self.state.is_animating() || self.images.buckets().pending_count() > 0,
        };
        self.cache = Some(cache);
        output
    }

    // ==================== Queries ====================

    pub fn transform(&self) -> Transform {
        self.state.transform()
    }

    /// Pointers are down; time-based gestures need frames
    pub fn is_interacting(&self) -> bool {
        self.gestures.active_pointers() > 0
    }

    pub fn transform_state(&self) -> &TransformState {
        &self.state
    }

    /// Tier chosen by the most recent frame
    pub fn tier(&self) -> DetailTier {
        self.tier.current
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(id)
    }

    pub fn highlight(&self) -> Option<NodeId> {
        self.highlight
    }

    pub fn image_display(&self, id: NodeId) -> ImageDisplay {
        self.images.display(id)
    }

    /// Resolve a screen point against what the last frame drew
    pub fn hit_test(&self, screen: Point) -> Selection {
        let transform = self.state.transform();
        let bounds = visible_bounds(
            &transform,
            self.viewport,
            self.config.camera.visible_margin_x,
            self.config.camera.visible_margin_y,
        );
        let visible = self.index.query(bounds);
        resolve_tap(
            screen,
            self.tier.current,
            &transform,
            &visible,
            self.aggregation.as_ref(),
            &self.settings,
            &self.config.hit_test,
            &self.config.metrics,
        )
    }

    /// Snapshot for persisting across launches
    pub fn view_state(&self) -> ViewState {
        ViewState {
            last_transform: Some(self.state.transform()),
            focused_node: self.highlight,
            ..Default::default()
        }
    }

    /// Restore a persisted snapshot; the transform is clamped to the zoom limits
    pub fn restore_view(&mut self, view: &ViewState) {
        if let Some(transform) = view.last_transform {
            self.state.cancel_animations();
            self.state.set(transform);
        }
        self.highlight = view.focused_node.filter(|id| self.index.get(*id).is_some());
    }

    // ==================== Internals ====================

    fn invalidate(&mut self) {
        self.generation += 1;
        self.cache = None;
    }

    fn build_frame(&self, key: FrameKey) -> FrameCache {
        let camera = &self.config.camera;
        let bounds = visible_bounds(
            &key.transform,
            key.viewport,
            camera.visible_margin_x,
            camera.visible_margin_y,
        );
        let visible = self.index.query(bounds);
        let aggregated = key.tier == DetailTier::Aggregated && key.aggregation_enabled;

        let connectors = if aggregated {
            Vec::new()
        } else {
            connectors::build_all(
                &visible,
                &self.index,
                &self.children,
                key.show_photos,
                &self.config.metrics,
            )
        };
        let chips = match (&self.aggregation, aggregated) {
            (Some(index), true) => index
                .chips()
                .filter(|chip| bounds.contains(chip.centroid))
                .collect(),
            _ => Vec::new(),
        };

        tracing::trace!(
            "Frame rebuilt: {} visible, {} segments, {} chips",
            visible.len(),
            connectors.len(),
            chips.len()
        );

        FrameCache {
            key,
            bounds,
            visible: Arc::new(visible.iter().map(|n| n.id).collect()),
            connectors: Arc::new(connectors),
            chips: Arc::new(chips),
        }
    }

    fn apply_outcomes(&mut self, outcomes: GestureOutcomes) {
        for screen in outcomes.long_presses {
            if let Some(node_id) = self.hit_test(screen).node_id() {
                self.sink
                    .publish(EngineEvent::QuickAction { node_id, screen });
                self.sink.publish(EngineEvent::Haptic(HapticKind::LongPress));
            }
        }

        for screen in outcomes.taps {
            let selection = self.hit_test(screen);
            if !selection.is_miss() {
                self.highlight = None;
            }
            tracing::debug!("Tap at ({:.0}, {:.0}) -> {:?}", screen.x, screen.y, selection);
            self.sink.publish(EngineEvent::Selection(selection));
            if !selection.is_miss() {
                self.sink.publish(EngineEvent::Haptic(HapticKind::Selection));
            }
        }

        if let Some(transform) = outcomes.rested {
            if !self.state.is_animating() {
                self.sink.publish(EngineEvent::TransformSnapshot(transform));
            }
        }
    }
}
