//! Single-finger tap recognition

use crate::config::GestureConfig;
use crate::types::Point;
use std::time::{Duration, Instant};

/// Recognizes a short press with little travel
///
/// A tap fails permanently for the current press when the finger travels too
/// far, a second finger lands, or a long-press fires first.
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    max_distance: f32,
    max_duration: Duration,
    start: Option<(Point, Instant)>,
    failed: bool,
}

impl TapRecognizer {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            max_distance: config.tap_max_distance,
            max_duration: config.tap_max_duration(),
            start: None,
            failed: false,
        }
    }

    pub fn begin(&mut self, position: Point, time: Instant) {
        self.start = Some((position, time));
        self.failed = false;
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

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Finish the press; returns the tap position if it qualifies
    pub fn end(&mut self, position: Point, time: Instant) -> Option<Point> {
        let (origin, started) = self.start.take()?;
        if self.failed {
            return None;
        }
        let held = time.saturating_duration_since(started);
        if origin.distance(position) <= self.max_distance && held <= self.max_duration {
            Some(position)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.start = None;
        self.failed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap() -> TapRecognizer {
        TapRecognizer::new(&GestureConfig::default())
    }

    #[test]
    fn test_quick_still_press_is_a_tap() {
        let mut r = tap();
        let t0 = Instant::now();
        r.begin(Point::new(10.0, 10.0), t0);
        r.update(Point::new(13.0, 12.0));
        let hit = r.end(Point::new(14.0, 12.0), t0 + Duration::from_millis(120));
        assert_eq!(hit, Some(Point::new(14.0, 12.0)));
    }

    #[test]
    fn test_travel_beyond_limit_fails_even_if_finger_returns() {
        let mut r = tap();
        let t0 = Instant::now();
        r.begin(Point::ZERO, t0);
        r.update(Point::new(11.0, 0.0));
        r.update(Point::new(1.0, 0.0));
        assert!(r.end(Point::new(1.0, 0.0), t0 + Duration::from_millis(50)).is_none());
    }

    #[test]
    fn test_slow_press_is_not_a_tap() {
        let mut r = tap();
        let t0 = Instant::now();
        r.begin(Point::ZERO, t0);
        assert!(r.end(Point::ZERO, t0 + Duration::from_millis(251)).is_none());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut r = tap();
        let t0 = Instant::now();
        r.begin(Point::ZERO, t0);
        assert!(r.end(Point::new(10.0, 0.0), t0 + Duration::from_millis(250)).is_some());
    }

    #[test]
    fn test_fail_and_end_without_begin() {
        let mut r = tap();
        assert!(r.end(Point::ZERO, Instant::now()).is_none());
        let t0 = Instant::now();
        r.begin(Point::ZERO, t0);
        r.fail();
        assert!(r.is_failed());
        assert!(r.end(Point::ZERO, t0).is_none());
    }
}
