//! egui input to engine pointer events
//!
//! Touch events map one to one onto engine pointers. The mouse is pointer
//! [`MOUSE_POINTER_ID`] while its primary button is held. egui also emits
//! simulated mouse events for the first touch, so once a touch has been seen
//! mouse input is ignored for the rest of the session.

use crate::gesture::{PointerEvent, PointerPhase};
use crate::types::Point;
use std::time::Instant;

/// Engine pointer id used for the mouse
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

/// Wheel zoom sensitivity, per scrolled point
const WHEEL_ZOOM_RATE: f32 = 0.0015;

/// Input collected from one egui frame, in canvas coordinates
#[derive(Debug, Default)]
pub struct CanvasInput {
    pub pointers: Vec<PointerEvent>,
    /// Multiplicative zoom with its focal point
    pub zoom: Option<(f32, Point)>,
    pub focus_lost: bool,
}

/// Stateful adapter from egui events to [`PointerEvent`]s
#[derive(Debug, Default)]
pub struct InputAdapter {
    touch_seen: bool,
    mouse_down: bool,
    last_mouse: Option<Point>,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate this frame's events; `origin` is the canvas top-left in egui points
    pub fn collect(&mut self, input: &egui::InputState, canvas: egui::Rect, now: Instant) -> CanvasInput {
        let origin = canvas.min;
        let to_canvas = |pos: egui::Pos2| Point::new(pos.x - origin.x, pos.y - origin.y);
        let mut out = CanvasInput::default();

        for event in &input.events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    if !self.touch_seen {
                        tracing::debug!("Touch input detected, ignoring mouse from now on");
                        self.touch_seen = true;
                        self.release_mouse(&mut out, now);
                    }
                    let phase = match phase {
                        egui::TouchPhase::Start => PointerPhase::Down,
                        egui::TouchPhase::Move => PointerPhase::Move,
                        egui::TouchPhase::End => PointerPhase::Up,
                        egui::TouchPhase::Cancel => PointerPhase::Cancel,
                    };
                    out.pointers
                        .push(PointerEvent::new(id.0, phase, to_canvas(*pos), now));
                }
                _ if self.touch_seen => {}
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    let position = to_canvas(*pos);
                    if *pressed && canvas.contains(*pos) && !self.mouse_down {
                        self.mouse_down = true;
                        out.pointers.push(PointerEvent::new(
                            MOUSE_POINTER_ID,
                            PointerPhase::Down,
                            position,
                            now,
                        ));
                    } else if !*pressed && self.mouse_down {
                        self.mouse_down = false;
                        out.pointers.push(PointerEvent::new(
                            MOUSE_POINTER_ID,
                            PointerPhase::Up,
                            position,
                            now,
                        ));
                    }
                    self.last_mouse = Some(position);
                }
                egui::Event::PointerMoved(pos) => {
                    let position = to_canvas(*pos);
                    if self.mouse_down {
                        out.pointers.push(PointerEvent::new(
                            MOUSE_POINTER_ID,
                            PointerPhase::Move,
                            position,
                            now,
                        ));
                    }
                    self.last_mouse = Some(position);
                }
                egui::Event::PointerGone => {
                    self.release_mouse(&mut out, now);
                    self.last_mouse = None;
                }
                egui::Event::WindowFocused(false) => {
                    out.focus_lost = true;
                    self.mouse_down = false;
                }
                _ => {}
            }
        }

        if !self.touch_seen {
            let wheel = (input.smooth_scroll_delta.y * WHEEL_ZOOM_RATE).exp();
            let factor = input.zoom_delta() * wheel;
            if (factor - 1.0).abs() > f32::EPSILON {
                let focal = input
                    .pointer
                    .hover_pos()
                    .filter(|p| canvas.contains(*p))
                    .map(to_canvas);
                if let Some(focal) = focal {
                    out.zoom = Some((factor, focal));
                }
            }
        }

        out
    }

    fn release_mouse(&mut self, out: &mut CanvasInput, now: Instant) {
        if !self.mouse_down {
            return;
        }
        self.mouse_down = false;
        let position = self.last_mouse.unwrap_or(Point::ZERO);
        out.pointers.push(PointerEvent::new(
            MOUSE_POINTER_ID,
            PointerPhase::Cancel,
            position,
            now,
        ));
    }
}
