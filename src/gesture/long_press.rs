//! Press-and-hold recognition
//!
//! Unlike a tap, a long-press fires while the finger is still down, as soon
//! as the hold time is reached. It is polled from the frame clock.

use crate::config::GestureConfig;
use crate::types::Point;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct LongPressRecognizer {
    duration: Duration,
    max_distance: f32,
    start: Option<(Point, Instant)>,
    failed: bool,
    fired: bool,
}

impl LongPressRecognizer {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            duration: config.long_press_duration(),
            max_distance: config.long_press_max_distance,
            start: None,
            failed: false,
            fired: false,
        }
    }

    pub fn begin(&mut self, position: Point, time: Instant) {
        self.start = Some((position, time));
        self.failed = false;
        self.fired = false;
    }

    pub fn update(&mut self, position: Point) {
        if let Some((origin, _)) = self.start {
            if origin.distance(position) > self.max_distance {
                self.failed = true;
            }
        }
    }

    pub fn fail(&mut self) {
        self.failed = true;
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Fire once when the hold time has elapsed; returns the press position
    pub fn poll(&mut self, now: Instant) -> Option<Point> {
        let (origin, started) = self.start?;
        if self.failed || self.fired {
            return None;
        }
        if now.saturating_duration_since(started) >= self.duration {
            self.fired = true;
            return Some(origin);
        }
        None
    }

    /// Finger lifted; a press that has not fired by now never will
    pub fn end(&mut self) {
        self.start = None;
    }
}
