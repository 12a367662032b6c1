//! Scalar animations driven by the frame clock
//!
//! Every animation is sampled with the current frame [`Instant`] and reports
//! whether it has finished. Nothing here owns a timer: dropping an animation
//! cancels it.
//!
//! - [`DecayAnimation`] - momentum after a fling, exponential velocity decay
//! - [`SpringAnimation`] - damped spring toward a target
//! - [`TimingAnimation`] - fixed duration with an easing curve

use crate::config::SpringConfig;
use std::time::{Duration, Instant};

/// Speed below which momentum stops (units per second)
const DECAY_STOP_SPEED: f32 = 5.0;

/// Largest integration step for springs
const SPRING_MAX_STEP: f32 = 0.004;

/// Cap on substeps per sample so a stalled frame cannot spin
const SPRING_MAX_SUBSTEPS: u32 = 64;

/// Easing curves for [`TimingAnimation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
}

impl Easing {
    /// Map progress in `[0, 1]` to eased progress in `[0, 1]`
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Momentum with exponentially decaying velocity
///
/// `deceleration` is the fraction of velocity retained per millisecond, so
/// position follows the closed form `x(t) = x0 + v0 * (d^t - 1) / ln(d)`.
#[derive(Debug, Clone)]
pub struct DecayAnimation {
    origin: f32,
    velocity: f32,
    deceleration: f32,
    bounds: Option<(f32, f32)>,
    start: Instant,
}

impl DecayAnimation {
    /// `velocity` is in units per second
    pub fn new(origin: f32, velocity: f32, deceleration: f32, start: Instant) -> Self {
        Self {
            origin,
            velocity,
            deceleration: deceleration.clamp(0.5, 0.9999),
            bounds: None,
            start,
        }
    }

    /// Stop at the nearest bound instead of travelling past it
    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        // Never yank a value that already sits outside the range
        let lo = min.min(self.origin);
        let hi = max.max(self.origin);
        self.bounds = Some((lo, hi));
        self
    }

    pub fn sample(&mut self, now: Instant) -> (f32, bool) {
        let ms = now.saturating_duration_since(self.start).as_secs_f32() * 1000.0;
        let ln_d = self.deceleration.ln();
        let retained = self.deceleration.powf(ms);
        let per_ms = self.velocity / 1000.0;
        let mut value = self.origin + per_ms * (retained - 1.0) / ln_d;
        let speed = (self.velocity * retained).abs();
        let mut done = speed < DECAY_STOP_SPEED;

        if let Some((lo, hi)) = self.bounds {
            if value <= lo || value >= hi {
                value = value.clamp(lo, hi);
                done = true;
            }
        }
        (value, done)
    }

    /// Where the animation comes to rest if nothing clamps it
    pub fn resting_value(&self) -> f32 {
        let unclamped = self.origin - self.velocity / 1000.0 / self.deceleration.ln();
        match self.bounds {
            Some((lo, hi)) => unclamped.clamp(lo, hi),
            None => unclamped,
        }
    }
}

/// Damped spring integrated with semi-implicit Euler
#[derive(Debug, Clone)]
pub struct SpringAnimation {
    value: f32,
    velocity: f32,
    target: f32,
    config: SpringConfig,
    last: Instant,
}

impl SpringAnimation {
    pub fn new(from: f32, to: f32, config: SpringConfig, start: Instant) -> Self {
        Self {
            value: from,
            velocity: 0.0,
            target: to,
            config,
            last: start,
        }
    }

    /// Initial velocity in units per second
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Override the settle thresholds, e.g. for scale where units are tiny
    pub fn with_rest(mut self, displacement: f32, speed: f32) -> Self {
        self.config.rest_displacement = displacement;
        self.config.rest_speed = speed;
        self
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn sample(&mut self, now: Instant) -> (f32, bool) {
        let mut remaining = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;

        let c = self.config;
        let mass = c.mass.max(1e-3);
        let mut substeps = 0;
        while remaining > 0.0 && substeps < SPRING_MAX_SUBSTEPS {
            let dt = remaining.min(SPRING_MAX_STEP);
            let force = -c.stiffness * (self.value - self.target) - c.damping * self.velocity;
            self.velocity += force / mass * dt;
            self.value += self.velocity * dt;
            remaining -= dt;
            substeps += 1;
        }

        let at_rest = (self.value - self.target).abs() < c.rest_displacement
            && self.velocity.abs() < c.rest_speed;
        if at_rest {
            self.value = self.target;
            self.velocity = 0.0;
        }
        (self.value, at_rest)
    }
}

/// Fixed-duration interpolation
#[derive(Debug, Clone)]
pub struct TimingAnimation {
    from: f32,
    to: f32,
    duration: Duration,
    easing: Easing,
    start: Instant,
}

impl TimingAnimation {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing, start: Instant) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            start,
        }
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn sample(&mut self, now: Instant) -> (f32, bool) {
        if self.duration.is_zero() {
            return (self.to, true);
        }
        let elapsed = now.saturating_duration_since(self.start);
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        if t >= 1.0 {
            return (self.to, true);
        }
        (self.from + (self.to - self.from) * self.easing.apply(t), false)
    }
}

/// Any animation that can drive one transform channel
#[derive(Debug, Clone)]
pub enum Animation {
    Decay(DecayAnimation),
    Spring(SpringAnimation),
    Timing(TimingAnimation),
}

impl Animation {
    /// Current value and whether the animation has finished
    pub fn sample(&mut self, now: Instant) -> (f32, bool) {
        match self {
            Animation::Decay(a) => a.sample(now),
            Animation::Spring(a) => a.sample(now),
            Animation::Timing(a) => a.sample(now),
        }
    }

    /// Final value, where it is known up front
    pub fn target(&self) -> Option<f32> {
        match self {
            Animation::Decay(a) => Some(a.resting_value()),
            Animation::Spring(a) => Some(a.target()),
            Animation::Timing(a) => Some(a.target()),
        }
    }
}

impl From<DecayAnimation> for Animation {
    fn from(a: DecayAnimation) -> Self {
        Animation::Decay(a)
    }
}

impl From<SpringAnimation> for Animation {
    fn from(a: SpringAnimation) -> Self {
        Animation::Spring(a)
    }
}

impl From<TimingAnimation> for Animation {
    fn from(a: TimingAnimation) -> Self {
        Animation::Timing(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseOutCubic, Easing::EaseInOutCubic] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert!((Easing::EaseInOutCubic.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_decay_moves_in_velocity_direction_and_stops() {
        let t0 = Instant::now();
        let mut decay = DecayAnimation::new(0.0, 1000.0, 0.998, t0);
        let (early, done) = decay.sample(t0 + ms(50));
        assert!(early > 0.0);
        assert!(!done);

        let (late, done) = decay.sample(t0 + ms(5000));
        assert!(done);
        assert!((late - decay.resting_value()).abs() < 5.0);
        assert!(late > early);
    }

    #[test]
    fn test_decay_clamps_at_bound() {
        let t0 = Instant::now();
        let mut decay = DecayAnimation::new(0.0, -3000.0, 0.998, t0).with_bounds(-100.0, 100.0);
        let (value, done) = decay.sample(t0 + ms(1000));
        assert_eq!(value, -100.0);
        assert!(done);
    }

    #[test]
    fn test_decay_bounds_include_origin() {
        let t0 = Instant::now();
        let mut decay = DecayAnimation::new(500.0, 10.0, 0.998, t0).with_bounds(-100.0, 100.0);
        let (value, _) = decay.sample(t0 + ms(16));
        assert!(value >= 500.0);
    }

    #[test]
    fn test_spring_settles_on_target() {
        let t0 = Instant::now();
        let mut spring = SpringAnimation::new(0.0, 300.0, SpringConfig::default(), t0);
        let mut now = t0;
        let mut settled = false;
        for _ in 0..300 {
            now += ms(16);
            let (value, done) = spring.sample(now);
            if done {
                assert_eq!(value, 300.0);
                settled = true;
                break;
            }
        }
        assert!(settled);
    }

    #[test]
    fn test_spring_with_tight_rest_for_scale() {
        let t0 = Instant::now();
        let mut spring =
            SpringAnimation::new(4.6, 4.0, SpringConfig::default(), t0).with_rest(1e-3, 1e-2);
        let (value, done) = spring.sample(t0 + ms(16));
        assert!(!done);
        assert!(value < 4.6);
    }

    #[test]
    fn test_timing_reaches_target_at_duration() {
        let t0 = Instant::now();
        let mut timing = TimingAnimation::new(1.0, 2.0, ms(400), Easing::Linear, t0);
        let (mid, done) = timing.sample(t0 + ms(200));
        assert!((mid - 1.5).abs() < 1e-4);
        assert!(!done);
        assert_eq!(timing.sample(t0 + ms(400)), (2.0, true));
    }

    #[test]
    fn test_zero_duration_timing_finishes_immediately() {
        let t0 = Instant::now();
        let mut timing = TimingAnimation::new(1.0, 2.0, Duration::ZERO, Easing::Linear, t0);
        assert_eq!(timing.sample(t0), (2.0, true));
    }
}
