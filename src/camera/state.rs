//! Shared camera transform and its single-writer guard
//!
//! [`TransformState`] is the one place the transform lives. Three writers
//! compete for it (panning, pinching and programmatic navigation) and at most
//! one is active at a time, recorded in [`ActiveWriter`]. Writers check the
//! guard at the top of every update instead of taking a lock: all writes
//! happen on the animation context, one frame at a time.
//!
//! Running animations (momentum, pinch bounce, navigation) are held by a
//! [`TransformAnimator`] and advanced with [`TransformState::step`].

use super::animation::Animation;
use crate::types::{Point, Transform};
use std::time::Instant;

/// Which writer currently owns the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveWriter {
    #[default]
    Idle,
    Panning,
    Pinching,
    Navigating,
}

/// Keeps a world point pinned under a screen point while scale animates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocalAnchor {
    pub screen: Point,
    pub world: Point,
}

impl FocalAnchor {
    /// Translation that keeps the anchor in place at `scale`
    pub fn transform_at(&self, scale: f32) -> Transform {
        Transform::new(
            self.screen.x - self.world.x * scale,
            self.screen.y - self.world.y * scale,
            scale,
        )
    }
}

/// Callback fired once when every channel has settled
pub type SettleCallback = Box<dyn FnOnce() + Send>;

/// Per-channel animations for the transform
#[derive(Default)]
pub struct TransformAnimator {
    pub translate_x: Option<Animation>,
    pub translate_y: Option<Animation>,
    pub scale: Option<Animation>,
    /// When set, translation is derived from scale instead of animated
    pub anchor: Option<FocalAnchor>,
    pub on_settle: Option<SettleCallback>,
}

impl std::fmt::Debug for TransformAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformAnimator")
            .field("translate_x", &self.translate_x)
            .field("translate_y", &self.translate_y)
            .field("scale", &self.scale)
            .field("anchor", &self.anchor)
            .field("on_settle", &self.on_settle.is_some())
            .finish()
    }
}

impl TransformAnimator {
    pub fn is_active(&self) -> bool {
        self.translate_x.is_some() || self.translate_y.is_some() || self.scale.is_some()
    }
}

/// Result of advancing animations by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// The transform was written this frame
    pub changed: bool,
    /// The last running animation finished this frame
    pub settled: bool,
}

/// The camera transform plus its writer guard and animations
#[derive(Debug)]
pub struct TransformState {
    transform: Transform,
    writer: ActiveWriter,
    animator: TransformAnimator,
    min_scale: f32,
    max_scale: f32,
    revision: u64,
}

impl TransformState {
    pub fn new(transform: Transform, min_scale: f32, max_scale: f32) -> Self {
        Self {
            transform: transform.clamped(min_scale, max_scale),
            writer: ActiveWriter::Idle,
            animator: TransformAnimator::default(),
            min_scale,
            max_scale,
            revision: 0,
        }
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[inline]
    pub fn writer(&self) -> ActiveWriter {
        self.writer
    }

    pub fn is_panning(&self) -> bool {
        self.writer == ActiveWriter::Panning
    }

    pub fn is_pinching(&self) -> bool {
        self.writer == ActiveWriter::Pinching
    }

    pub fn is_navigating(&self) -> bool {
        self.writer == ActiveWriter::Navigating
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_active()
    }

    /// Incremented on every write; cheap change detection for caches
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn scale_limits(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    /// Claim the transform for `writer`, displacing whoever held it
    pub fn begin(&mut self, writer: ActiveWriter) {
        if self.writer != writer {
            tracing::trace!("Transform writer {:?} -> {:?}", self.writer, writer);
        }
        self.writer = writer;
    }

    /// Release the transform if `writer` still holds it
    pub fn end(&mut self, writer: ActiveWriter) {
        if self.writer == writer {
            self.writer = ActiveWriter::Idle;
        }
    }

    /// Write a transform as-is; used by gestures inside their elastic band
    pub fn set_unclamped(&mut self, transform: Transform) {
        if transform != self.transform {
            self.transform = transform;
            self.revision += 1;
        }
    }

    /// Write a transform with the scale clamped to the resting limits
    pub fn set(&mut self, transform: Transform) {
        self.set_unclamped(transform.clamped(self.min_scale, self.max_scale));
    }

    /// Drop every running animation and its settle callback
    ///
    /// Idempotent. A navigation that loses its animations also loses the
    /// writer guard. An interrupted bounce snaps straight into the zoom
    /// limits, around its anchor when it has one.
    pub fn cancel_animations(&mut self) {
        let interrupted = std::mem::take(&mut self.animator);
        if interrupted.is_active() {
            tracing::trace!("Cancelling transform animations");
            let scale = self.transform.scale.clamp(self.min_scale, self.max_scale);
            if scale != self.transform.scale {
                match interrupted.anchor {
                    Some(anchor) => self.set(anchor.transform_at(scale)),
                    None => self.set(self.transform),
                }
            }
        }
        self.end(ActiveWriter::Navigating);
    }

    /// Replace running animations with `animator`
    pub fn animate(&mut self, animator: TransformAnimator) {
        self.animator = animator;
    }

    /// Advance animations to `now`
    pub fn step(&mut self, now: Instant) -> StepOutcome {
        if !self.animator.is_active() {
            return StepOutcome::default();
        }

        let mut next = self.transform;
        let animator = &mut self.animator;

        if let Some(anim) = animator.scale.as_mut() {
            let (value, done) = anim.sample(now);
            next.scale = value;
            if done {
                animator.scale = None;
            }
        }

        if let Some(anchor) = animator.anchor {
            next = anchor.transform_at(next.scale);
        } else {
            if let Some(anim) = animator.translate_x.as_mut() {
                let (value, done) = anim.sample(now);
                next.translate_x = value;
                if done {
                    animator.translate_x = None;
                }
            }
            if let Some(anim) = animator.translate_y.as_mut() {
                let (value, done) = anim.sample(now);
                next.translate_y = value;
                if done {
                    animator.translate_y = None;
                }
            }
        }

        let settled = !animator.is_active();
        let before = self.revision;
        if settled {
            self.set(next);
        } else {
            self.set_unclamped(next);
        }

        if settled {
            let callback = self.animator.on_settle.take();
            self.animator = TransformAnimator::default();
            self.end(ActiveWriter::Navigating);
            if let Some(callback) = callback {
                callback();
            }
        }

        StepOutcome {
            changed: self.revision != before,
            settled,
        }
    }
}
