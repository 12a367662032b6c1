//! Two-finger pinch zoom anchored at the focal point
//!
//! The world point under the initial midpoint of the two fingers stays under
//! the current midpoint for the whole gesture, so the content zooms around
//! the fingers and follows them if they drift. Scale may stretch into an
//! elastic band beyond the zoom limits and springs back on release.

use crate::camera::{ActiveWriter, FocalAnchor, SpringAnimation, TransformAnimator, TransformState};
use crate::config::CameraConfig;
use crate::types::{Point, Transform};
use std::time::Instant;

/// Spans below this are treated as coincident fingers
const MIN_SPAN: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct PinchRecognizer {
    camera: CameraConfig,
    snapshot: Transform,
    initial_span: f32,
    anchor_world: Point,
    focal: Point,
    active: bool,
}

impl PinchRecognizer {
    pub fn new(camera: &CameraConfig) -> Self {
        Self {
            camera: camera.clone(),
            snapshot: Transform::IDENTITY,
            initial_span: 1.0,
            anchor_world: Point::ZERO,
            focal: Point::ZERO,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// World point held under the fingers
    pub fn anchor(&self) -> Point {
        self.anchor_world
    }

    /// Start with exactly two pointers; returns false if they coincide
    pub fn begin(&mut self, a: Point, b: Point, state: &mut TransformState) -> bool {
        let span = a.distance(b);
        if span < MIN_SPAN {
            return false;
        }
        state.cancel_animations();
        state.begin(ActiveWriter::Pinching);

        self.snapshot = state.transform();
        self.initial_span = span;
        self.focal = a.midpoint(b);
        self.anchor_world = self.snapshot.screen_to_world(self.focal);
        self.active = true;
        true
    }

    pub fn update(&mut self, a: Point, b: Point, state: &mut TransformState) {
        if !self.active || !state.is_pinching() {
            return;
        }
        let span = a.distance(b).max(MIN_SPAN);
        let scale = self
            .camera
            .clamp_elastic(self.snapshot.scale * span / self.initial_span);
        self.focal = a.midpoint(b);
        let anchor = FocalAnchor {
            screen: self.focal,
            world: self.anchor_world,
        };
        state.set_unclamped(anchor.transform_at(scale));
    }

    /// Fingers lifted; returns whether a bounce back into range started
    pub fn end(&mut self, state: &mut TransformState, now: Instant) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        if !state.is_pinching() {
            return false;
        }
        state.end(ActiveWriter::Pinching);

        let current = state.transform().scale;
        let settled = self.camera.clamp_scale(current);
        if settled == current {
            return false;
        }

        tracing::trace!("Pinch bounce {:.3} -> {:.3}", current, settled);
        state.animate(TransformAnimator {
            scale: Some(
                SpringAnimation::new(current, settled, self.camera.spring, now)
                    .with_rest(1e-3, 1e-2)
                    .into(),
            ),
            anchor: Some(FocalAnchor {
                screen: self.focal,
                world: self.anchor_world,
            }),
            ..Default::default()
        });
        true
    }
}
