//! Single-finger pan with momentum

use crate::camera::{pan_limits, ActiveWriter, DecayAnimation, TransformAnimator, TransformState};
use crate::config::GestureConfig;
use crate::types::{Point, Rect, Transform, Vec2, Viewport};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Estimates release velocity from recent pointer samples
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    window: Duration,
    samples: VecDeque<(Instant, Point)>,
}

impl VelocityTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            samples: VecDeque::with_capacity(16),
        }
    }

    pub fn add(&mut self, time: Instant, position: Point) {
        self.samples.push_back((time, position));
        while let Some(&(oldest, _)) = self.samples.front() {
            if time.saturating_duration_since(oldest) > self.window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Velocity in pixels per second over the sample window
    pub fn velocity(&self) -> Vec2 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return Vec2::ZERO;
        };
        let dt = t1.saturating_duration_since(t0).as_secs_f32();
        if dt < 1e-3 {
            return Vec2::ZERO;
        }
        (p1 - p0) * (1.0 / dt)
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// Drags the translation with one finger and flings on release
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    config: GestureConfig,
    origin: Point,
    snapshot: Vec2,
    tracker: VelocityTracker,
    active: bool,
}

impl PanRecognizer {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            config: config.clone(),
            origin: Point::ZERO,
            snapshot: Vec2::ZERO,
            tracker: VelocityTracker::new(config.velocity_window()),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Finger down: stop momentum and capture the starting translation
    pub fn begin(&mut self, position: Point, time: Instant, state: &mut TransformState) {
        state.cancel_animations();
        self.rebaseline(position, time, state);
    }

    /// Continue from the current transform without a jump
    pub fn rebaseline(&mut self, position: Point, time: Instant, state: &mut TransformState) {
        state.begin(ActiveWriter::Panning);
        self.origin = position;
        self.snapshot = state.transform().translation();
        self.tracker.reset();
        self.tracker.add(time, position);
        self.active = true;
    }

    pub fn update(&mut self, position: Point, time: Instant, state: &mut TransformState) {
        if !self.active || !state.is_panning() {
            return;
        }
        self.tracker.add(time, position);
        let delta = position - self.origin;
        let current = state.transform();
        state.set_unclamped(Transform::new(
            self.snapshot.x + delta.x,
            self.snapshot.y + delta.y,
            current.scale,
        ));
    }

    /// Yield to another writer without releasing momentum
    pub fn suspend(&mut self) {
        self.active = false;
        self.tracker.reset();
    }

    /// Finger up; returns whether momentum started
    pub fn end(
        &mut self,
        position: Point,
        time: Instant,
        state: &mut TransformState,
        content: Option<Rect>,
        viewport: Viewport,
    ) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        if !state.is_panning() {
            return false;
        }
        state.end(ActiveWriter::Panning);

        self.tracker.add(time, position);
        let velocity = self.tracker.velocity().clamp_length(self.config.max_fling_velocity);
        self.tracker.reset();
        if velocity.length() < self.config.min_fling_velocity {
            return false;
        }

        let t = state.transform();
        let d = self.config.deceleration;
        let mut x = DecayAnimation::new(t.translate_x, velocity.x, d, time);
        let mut y = DecayAnimation::new(t.translate_y, velocity.y, d, time);
        if let Some(content) = content {
            let ((x0, x1), (y0, y1)) =
                pan_limits(content, t.scale, viewport, self.config.pan_overscroll);
            x = x.with_bounds(x0, x1);
            y = y.with_bounds(y0, y1);
        }

        tracing::trace!("Pan fling at ({:.0}, {:.0}) px/s", velocity.x, velocity.y);
        state.animate(TransformAnimator {
            translate_x: Some(x.into()),
            translate_y: Some(y.into()),
            ..Default::default()
        });
        true
    }

    /// Pointer cancelled by the platform; no momentum
    pub fn cancel(&mut self, state: &mut TransformState) {
        self.active = false;
        self.tracker.reset();
        state.end(ActiveWriter::Panning);
    }
}
