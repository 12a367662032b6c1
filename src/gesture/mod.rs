//! Touch gesture pipeline
//!
//! Raw pointer events are fed to [`GestureEngine::handle`], which routes them
//! to four recognizers:
//!
//! - [`PanRecognizer`] - one finger drag with momentum
//! - [`PinchRecognizer`] - two finger zoom around the focal point
//! - [`TapRecognizer`] - short still press
//! - [`LongPressRecognizer`] - still hold, fired from [`GestureEngine::tick`]
//!
//! Pan and pinch share the transform through the [`ActiveWriter`] guard: a
//! second finger makes the pan yield to the pinch, and lifting one finger of
//! a pinch hands the transform back to the pan. Tap and long-press are
//! exclusive; whichever is satisfied first wins and a second finger fails
//! both.

pub mod long_press;
pub mod pan;
pub mod pinch;
pub mod tap;

pub use long_press::LongPressRecognizer;
pub use pan::{PanRecognizer, VelocityTracker};
pub use pinch::PinchRecognizer;
pub use tap::TapRecognizer;

use crate::camera::{ActiveWriter, FocalAnchor, TransformState};
use crate::config::{CameraConfig, GestureConfig};
use crate::types::{Point, Rect, Transform, Viewport};
use std::collections::BTreeMap;
use std::time::Instant;

/// Pointer lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The platform took the pointer away; nothing fires
    Cancel,
}

/// One raw input event in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: u64,
    pub phase: PointerPhase,
    pub position: Point,
    pub time: Instant,
}

impl PointerEvent {
    pub fn new(id: u64, phase: PointerPhase, position: Point, time: Instant) -> Self {
        Self {
            id,
            phase,
            position,
            time,
        }
    }
}

/// Gesture outcomes; every method is optional
pub trait GestureCallbacks {
    fn on_tap(&mut self, _screen: Point) {}

    fn on_long_press(&mut self, _screen: Point) {}

    /// `momentum` is true when a fling animation continues the pan
    fn on_pan_end(&mut self, _transform: Transform, _momentum: bool) {}

    fn on_pinch_end(&mut self, _transform: Transform) {}
}

/// Callbacks that ignore everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl GestureCallbacks for NoCallbacks {}

/// Composes the recognizers into one input pipeline
#[derive(Debug, Clone)]
pub struct GestureEngine {
    camera: CameraConfig,
    pointers: BTreeMap<u64, Point>,
    pinch_pair: Option<(u64, u64)>,
    pan: PanRecognizer,
    pinch: PinchRecognizer,
    tap: TapRecognizer,
    long_press: LongPressRecognizer,
    content_bounds: Option<Rect>,
    viewport: Viewport,
}

impl GestureEngine {
    pub fn new(gesture: &GestureConfig, camera: &CameraConfig) -> Self {
        Self {
            camera: camera.clone(),
            pointers: BTreeMap::new(),
            pinch_pair: None,
            pan: PanRecognizer::new(gesture),
            pinch: PinchRecognizer::new(camera),
            tap: TapRecognizer::new(gesture),
            long_press: LongPressRecognizer::new(gesture),
            content_bounds: None,
            viewport: Viewport::new(0.0, 0.0),
        }
    }

    /// World bounds momentum is kept within
    pub fn set_content_bounds(&mut self, bounds: Option<Rect>) {
        self.content_bounds = bounds;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_active()
    }

    /// Feed one pointer event
    pub fn handle(
        &mut self,
        event: PointerEvent,
        state: &mut TransformState,
        callbacks: &mut dyn GestureCallbacks,
    ) {
        // A hold may have matured between frames
        self.tick(event.time, callbacks);

        match event.phase {
            PointerPhase::Down => self.pointer_down(event, state),
            PointerPhase::Move => self.pointer_move(event, state),
            PointerPhase::Up | PointerPhase::Cancel => self.pointer_up(event, state, callbacks),
        }
    }

    /// Advance time-based recognition; call once per frame
    pub fn tick(&mut self, now: Instant, callbacks: &mut dyn GestureCallbacks) {
        if let Some(position) = self.long_press.poll(now) {
            self.tap.fail();
            tracing::debug!("Long press at ({:.0}, {:.0})", position.x, position.y);
            callbacks.on_long_press(position);
        }
    }

    /// Zoom by `factor` around a screen point, e.g. from a scroll wheel
    ///
    /// A drag in progress keeps the transform and continues from the zoomed
    /// translation.
    pub fn zoom_at(&mut self, factor: f32, focal: Point, now: Instant, state: &mut TransformState) {
        if state.is_pinching() || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        state.cancel_animations();
        let current = state.transform();
        let anchor = FocalAnchor {
            screen: focal,
            world: current.screen_to_world(focal),
        };
        let scale = self.camera.clamp_scale(current.scale * factor);
        state.set(anchor.transform_at(scale));

        if self.pan.is_active() && state.is_panning() {
            if let Some((_, &position)) = self.pointers.iter().next() {
                self.pan.rebaseline(position, now, state);
            }
        }
    }

    /// Forget all pointers, e.g. when the view loses focus
    pub fn reset(&mut self, state: &mut TransformState, now: Instant) {
        self.pointers.clear();
        self.pinch_pair = None;
        self.pan.cancel(state);
        if self.pinch.is_active() {
            self.pinch.end(state, now);
        }
        self.tap.reset();
        self.long_press.end();
    }

    fn pointer_down(&mut self, event: PointerEvent, state: &mut TransformState) {
        self.pointers.insert(event.id, event.position);

        match self.pointers.len() {
            1 => {
                self.tap.begin(event.position, event.time);
                self.long_press.begin(event.position, event.time);
                self.pan.begin(event.position, event.time, state);
            }
            2 => {
                self.tap.fail();
                self.long_press.fail();
                self.pan.suspend();

                let mut ids = self.pointers.keys().copied();
                if let (Some(a), Some(b)) = (ids.next(), ids.next()) {
                    let (pa, pb) = (self.pointers[&a], self.pointers[&b]);
                    if self.pinch.begin(pa, pb, state) {
                        self.pinch_pair = Some((a, b));
                    }
                }
            }
            // Extra fingers are ignored by the running pinch
            _ => {}
        }
    }

    fn pointer_move(&mut self, event: PointerEvent, state: &mut TransformState) {
        let Some(slot) = self.pointers.get_mut(&event.id) else {
            return;
        };
        *slot = event.position;

        if let Some((a, b)) = self.pinch_pair {
            if event.id == a || event.id == b {
                if let (Some(&pa), Some(&pb)) = (self.pointers.get(&a), self.pointers.get(&b)) {
                    self.pinch.update(pa, pb, state);
                }
            }
            return;
        }

        if self.pointers.len() == 1 {
            self.tap.update(event.position);
            self.long_press.update(event.position);
            self.pan.update(event.position, event.time, state);
        }
    }

    fn pointer_up(
        &mut self,
        event: PointerEvent,
        state: &mut TransformState,
        callbacks: &mut dyn GestureCallbacks,
    ) {
        if self.pointers.remove(&event.id).is_none() {
            return;
        }
        let cancelled = event.phase == PointerPhase::Cancel;

        if let Some((a, b)) = self.pinch_pair {
            if event.id == a || event.id == b {
                self.pinch_pair = None;
                let bounced = self.pinch.end(state, event.time);
                callbacks.on_pinch_end(state.transform());

                // Hand the transform back to the remaining finger
                if !bounced && !cancelled && self.pointers.len() == 1 {
                    if let Some((_, &position)) = self.pointers.iter().next() {
                        self.pan.rebaseline(position, event.time, state);
                    }
                }
            }
            return;
        }

        if !self.pointers.is_empty() {
            return;
        }

        self.long_press.end();
        if cancelled {
            self.tap.reset();
            if self.pan.is_active() {
                self.pan.cancel(state);
                callbacks.on_pan_end(state.transform(), false);
            }
            return;
        }

        if let Some(position) = self.tap.end(event.position, event.time) {
            callbacks.on_tap(position);
        }

        if self.pan.is_active() {
            let momentum = self.pan.end(
                event.position,
                event.time,
                state,
                self.content_bounds,
                self.viewport,
            );
            callbacks.on_pan_end(state.transform(), momentum);
        } else if state.writer() == ActiveWriter::Panning {
            state.end(ActiveWriter::Panning);
        }
    }
}
