//! Camera control: visible region, centering and programmatic navigation
//!
//! The camera never owns the transform. It reads and writes the shared
//! [`TransformState`], claiming the [`ActiveWriter::Navigating`] guard while a
//! navigation animation runs.
//!
//! # Main Types
//!
//! - [`CameraController`] - Navigation with spring/timing animations
//! - [`NavigationCallbacks`] - Optional hooks for target publication and settle
//! - [`TransformState`] - Shared transform, writer guard and animator
//! - [`animation`] - Decay, spring and timing curves

pub mod animation;
pub mod state;

pub use animation::{Animation, DecayAnimation, Easing, SpringAnimation, TimingAnimation};
pub use state::{ActiveWriter, FocalAnchor, StepOutcome, TransformAnimator, TransformState};

use crate::config::CameraConfig;
use crate::types::{Point, Rect, Transform, Viewport};
use std::time::Instant;

/// World-space region visible through `viewport`, widened by a screen margin
///
/// The margin is given in screen pixels and converted to world units at the
/// current scale, so prefetching covers the same on-screen distance at every
/// zoom level.
pub fn visible_bounds(
    transform: &Transform,
    viewport: Viewport,
    margin_x: f32,
    margin_y: f32,
) -> Rect {
    let scale = transform.scale.max(f32::EPSILON);
    let mx = margin_x / scale;
    let my = margin_y / scale;
    let tl = transform.screen_to_world(Point::ZERO);
    let br = transform.screen_to_world(Point::new(viewport.width, viewport.height));
    Rect::new(tl.x - mx, tl.y - my, br.x + mx, br.y + my)
}

/// Transform placing `position` at the viewport center at `scale`
pub fn center_on(
    position: Point,
    viewport: Viewport,
    scale: f32,
    config: &CameraConfig,
) -> Transform {
    let scale = config.clamp_scale(scale);
    let center = viewport.center();
    Transform::new(
        center.x - position.x * scale,
        center.y - position.y * scale,
        scale,
    )
}

/// Translation range that keeps at least `overscroll` pixels of content on screen
///
/// Returns `((min_x, max_x), (min_y, max_y))`. When the content is narrower
/// than the viewport minus twice the overscroll the range collapses to its
/// midpoint.
pub fn pan_limits(
    content: Rect,
    scale: f32,
    viewport: Viewport,
    overscroll: f32,
) -> ((f32, f32), (f32, f32)) {
    let axis = |c0: f32, c1: f32, extent: f32| {
        let lo = overscroll - c1 * scale;
        let hi = extent - overscroll - c0 * scale;
        if lo <= hi {
            (lo, hi)
        } else {
            let mid = (lo + hi) * 0.5;
            (mid, mid)
        }
    };
    (
        axis(content.min_x, content.max_x, viewport.width),
        axis(content.min_y, content.max_y, viewport.height),
    )
}

/// Identifier of one navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NavigationId(pub u64);

/// Optional hooks fired by [`CameraController::navigate_to_node`]
///
/// `on_target` fires immediately with the destination transform and its
/// visible bounds. `on_settled` fires once when the animation finishes and is
/// dropped if the navigation is interrupted.
#[derive(Default)]
pub struct NavigationCallbacks {
    pub on_target: Option<Box<dyn FnMut(Transform, Rect) + Send>>,
    pub on_settled: Option<Box<dyn FnOnce(NavigationId) + Send>>,
}

/// Drives programmatic camera moves
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    next_id: u64,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self { config, next_id: 0 }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Id the next call to [`Self::navigate_to_node`] will return
    pub fn next_id(&self) -> NavigationId {
        NavigationId(self.next_id + 1)
    }

    /// Scale navigation should end at, given the current one
    pub fn focus_scale(&self, current: f32) -> f32 {
        let c = &self.config;
        if current >= c.auto_zoom_min && current <= c.auto_zoom_max {
            current
        } else {
            c.default_focus_scale
        }
    }

    /// Animate the camera to center `node` in `viewport`
    pub fn navigate_to_node(
        &mut self,
        node: Point,
        state: &mut TransformState,
        viewport: Viewport,
        mut callbacks: NavigationCallbacks,
        now: Instant,
    ) -> NavigationId {
        self.next_id += 1;
        let id = NavigationId(self.next_id);

        let from = state.transform();
        let target = center_on(node, viewport, self.focus_scale(from.scale), &self.config);

        state.cancel_animations();
        state.begin(ActiveWriter::Navigating);

        if let Some(on_target) = callbacks.on_target.as_mut() {
            let bounds = visible_bounds(
                &target,
                viewport,
                self.config.visible_margin_x,
                self.config.visible_margin_y,
            );
            on_target(target, bounds);
        }

        tracing::debug!(
            "Navigation {} to ({:.1}, {:.1}) at scale {:.2}",
            id.0,
            node.x,
            node.y,
            target.scale
        );

        let spring = self.config.spring;
        let on_settled = callbacks.on_settled.take();
        state.animate(TransformAnimator {
            translate_x: Some(
                SpringAnimation::new(from.translate_x, target.translate_x, spring, now).into(),
            ),
            translate_y: Some(
                SpringAnimation::new(from.translate_y, target.translate_y, spring, now).into(),
            ),
            scale: Some(
                TimingAnimation::new(
                    from.scale,
                    target.scale,
                    self.config.navigate_scale_duration(),
                    Easing::EaseInOutCubic,
                    now,
                )
                .into(),
            ),
            anchor: None,
            on_settle: on_settled.map(|f| -> state::SettleCallback { Box::new(move || f(id)) }),
        });

        id
    }
}
