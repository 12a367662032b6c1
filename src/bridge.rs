//! Boundary between the animation context and the application context
//!
//! The engine runs on the animation context and must never block. Everything
//! the application needs to hear about (selections, navigation progress,
//! visible-set changes, haptics) is published through an [`EventSink`] into
//! a bounded channel and drained by the [`EngineBridge`] on the application
//! side. Publishing is fire-and-forget: when the application falls behind,
//! events are dropped rather than stalling a frame.

use crate::camera::NavigationId;
use crate::hit_test::Selection;
use crate::types::{NodeId, Point, Rect, Transform};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Channel capacity for engine events (animation -> application).
/// About eight seconds of per-frame events at 60 fps.
const EVENT_CHANNEL_CAPACITY: usize = 512;

/// Haptic feedback requests; the host decides what they feel like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Selection,
    LongPress,
}

/// Messages from the engine to the application
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A tap resolved; misses are reported too so the host can dismiss UI
    Selection(Selection),

    /// Long-press on a node, for its quick-action menu
    QuickAction { node_id: NodeId, screen: Point },

    /// A navigation started; the destination is known immediately
    NavigationTarget {
        id: NavigationId,
        transform: Transform,
        bounds: Rect,
    },

    /// A navigation animation finished
    NavigationSettled(NavigationId),

    /// The transform came to rest after a gesture or animation
    TransformSnapshot(Transform),

    /// The visible node set changed
    VisibleSetChanged { ids: Vec<NodeId>, bounds: Rect },

    Haptic(HapticKind),
}

/// Application-side end of the bridge
pub struct EngineBridge {
    rx: Receiver<EngineEvent>,
}

impl EngineBridge {
    /// Create a connected `(bridge, sink)` pair
    ///
    /// The engine owns the sink.
    pub fn new() -> (Self, EventSink) {
        let (tx, rx) = bounded(EVENT_CHANNEL_CAPACITY);
        (Self { rx }, EventSink { tx: Some(tx) })
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Try to receive a single event without blocking.
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.rx.try_recv().ok()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Animation-side end of the bridge
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<Sender<EngineEvent>>,
}

impl EventSink {
    /// A sink that discards everything, for hosts without a listener
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn is_attached(&self) -> bool {
        self.tx.is_some()
    }

    /// Publish without blocking; returns whether the event was queued
    pub fn publish(&self, event: EngineEvent) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!("Engine event channel full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("Engine event listener gone");
                false
            }
        }
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::detached()
    }
}

/// Application-side filter that keeps only the newest navigation
///
/// A navigation interrupted by a newer one may still report completion on
/// some hosts; completions for anything but the latest id are stale.
#[derive(Debug, Clone, Default)]
pub struct NavigationTracker {
    latest: Option<NavigationId>,
}

impl NavigationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, id: NavigationId) {
        if self.latest.map_or(true, |latest| id > latest) {
            self.latest = Some(id);
        }
    }

    /// Returns true if `id` is the navigation the app is waiting for
    pub fn complete(&mut self, id: NavigationId) -> bool {
        if self.latest == Some(id) {
            self.latest = None;
            true
        } else {
            tracing::debug!("Dropping stale navigation completion {:?}", id);
            false
        }
    }

    pub fn in_flight(&self) -> Option<NavigationId> {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain_in_order() {
        let (bridge, sink) = EngineBridge::new();
        assert!(sink.publish(EngineEvent::Haptic(HapticKind::Selection)));
        assert!(sink.publish(EngineEvent::Selection(Selection::Miss)));
        assert_eq!(bridge.pending(), 2);
        assert_eq!(
            bridge.drain(),
            vec![
                EngineEvent::Haptic(HapticKind::Selection),
                EngineEvent::Selection(Selection::Miss),
            ]
        );
        assert!(bridge.try_recv().is_none());
    }

    #[test]
    fn test_full_channel_drops_without_blocking() {
        let (bridge, sink) = EngineBridge::new();
        for _ in 0..EVENT_CHANNEL_CAPACITY {
            assert!(sink.publish(EngineEvent::TransformSnapshot(Transform::IDENTITY)));
        }
        assert!(!sink.publish(EngineEvent::TransformSnapshot(Transform::IDENTITY)));
        assert_eq!(bridge.drain().len(), EVENT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_detached_and_disconnected_sinks() {
        let sink = EventSink::detached();
        assert!(!sink.is_attached());
        assert!(!sink.publish(EngineEvent::Haptic(HapticKind::LongPress)));

        let (bridge, sink) = EngineBridge::new();
        drop(bridge);
        assert!(!sink.publish(EngineEvent::Haptic(HapticKind::LongPress)));
    }

    #[test]
    fn test_tracker_drops_stale_completion() {
        let mut tracker = NavigationTracker::new();
        tracker.begin(NavigationId(1));
        tracker.begin(NavigationId(2));
        assert!(!tracker.complete(NavigationId(1)));
        assert!(tracker.complete(NavigationId(2)));
        assert!(!tracker.complete(NavigationId(2)));
        assert_eq!(tracker.in_flight(), None);
    }

    #[test]
    fn test_tracker_ignores_out_of_order_begin() {
        let mut tracker = NavigationTracker::new();
        tracker.begin(NavigationId(5));
        tracker.begin(NavigationId(3));
        assert_eq!(tracker.in_flight(), Some(NavigationId(5)));
    }
}
