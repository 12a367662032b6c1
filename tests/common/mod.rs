//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use kincanvas::{EngineBridge, EngineEvent, FrameOutput, TreeEngine};
use std::time::{Duration, Instant};

/// One 60 Hz frame
pub const FRAME: Duration = Duration::from_millis(16);

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f32, b: f32, epsilon: f32) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Step frames until nothing animates, collecting every published event
///
/// Returns the time of the last frame and the events in order.
pub fn run_until_idle(
    engine: &mut TreeEngine,
    bridge: &EngineBridge,
    start: Instant,
) -> (Instant, Vec<EngineEvent>) {
    let mut now = start;
    let mut events = Vec::new();
    for _ in 0..1000 {
        now += FRAME;
        let frame: FrameOutput = engine.frame(now);
        events.extend(bridge.drain());
        if !frame.animating {
            return (now, events);
        }
    }
    panic!("engine still animating after 1000 frames");
}
