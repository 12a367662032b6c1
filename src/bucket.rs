//! Image resolution bucket selection
//!
//! Each visible node needs its photo at some resolution. Requesting the exact
//! on-screen size would fetch a new image on every zoom frame, so sizes are
//! snapped to a fixed ascending list of buckets and switched conservatively:
//!
//! - **Hysteresis**: targets close to the committed bucket are ignored.
//! - **Slow upgrade**: a larger bucket is committed only after the request has
//!   been stable for `upgrade_delay`, so a continuous pinch does not fetch
//!   every intermediate resolution.
//! - **Instant downgrade**: a smaller bucket is committed immediately to free
//!   memory.
//!
//! Timers are deadlines checked by [`BucketTable::poll`] on the animation
//! clock rather than OS timers, which makes cancellation a plain removal and
//! keeps the table testable with synthetic instants.

use crate::config::BucketConfig;
use crate::types::NodeId;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// An upgrade waiting for its debounce deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingUpgrade {
    pub target: u32,
    pub deadline: Instant,
}

/// Bucket state for a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketState {
    /// Committed bucket size
    pub current: u32,
    pub pending: Option<PendingUpgrade>,
}

/// Smallest bucket that is at least `required_px`, or the largest bucket
pub fn target_bucket(sizes: &[u32], required_px: f32) -> u32 {
    sizes
        .iter()
        .copied()
        .find(|&size| size as f32 >= required_px)
        .or_else(|| sizes.last().copied())
        .unwrap_or(0)
}

/// Owned table of per-node bucket states and their debounce timers
#[derive(Debug, Clone)]
pub struct BucketTable {
    sizes: Vec<u32>,
    hysteresis: f32,
    upgrade_delay: Duration,
    states: HashMap<NodeId, BucketState>,
}

impl BucketTable {
    pub fn new(config: &BucketConfig) -> Self {
        Self {
            sizes: config.sizes.clone(),
            hysteresis: config.hysteresis,
            upgrade_delay: config.upgrade_delay(),
            states: HashMap::new(),
        }
    }

    /// Select the bucket for `node_id` given its required on-screen size
    ///
    /// Returns the committed bucket, which lags behind the target while an
    /// upgrade is pending.
    pub fn select(&mut self, node_id: NodeId, required_px: f32, now: Instant) -> u32 {
        let target = target_bucket(&self.sizes, required_px);

        let Some(state) = self.states.get_mut(&node_id) else {
            self.states.insert(
                node_id,
                BucketState {
                    current: target,
                    pending: None,
                },
            );
            return target;
        };

        let current = state.current;
        let band = current as f32 * self.hysteresis;

        if target == current || (target as f32 - current as f32).abs() <= band {
            state.pending = None;
            return current;
        }

        if target > current {
            if required_px <= current as f32 + band {
                state.pending = None;
                return current;
            }
            match state.pending {
                Some(pending) if pending.target == target => {}
                _ => {
                    state.pending = Some(PendingUpgrade {
                        target,
                        deadline: now + self.upgrade_delay,
                    });
                    tracing::trace!("Bucket upgrade {} -> {} scheduled for {}", current, target, node_id);
                }
            }
            return current;
        }

        tracing::trace!("Bucket downgrade {} -> {} for {}", current, target, node_id);
        state.current = target;
        state.pending = None;
        target
    }

    /// Commit every pending upgrade whose deadline has passed
    pub fn poll(&mut self, now: Instant) -> Vec<(NodeId, u32)> {
        let mut committed = Vec::new();
        for (&node_id, state) in self.states.iter_mut() {
            if let Some(pending) = state.pending {
                if now >= pending.deadline {
                    state.current = pending.target;
                    state.pending = None;
                    committed.push((node_id, pending.target));
                }
            }
        }
        if !committed.is_empty() {
            committed.sort_by_key(|(id, _)| *id);
            tracing::debug!("Committed {} bucket upgrades", committed.len());
        }
        committed
    }

    /// Committed bucket for a node, if it has been queried
    pub fn current(&self, node_id: NodeId) -> Option<u32> {
        self.states.get(&node_id).map(|s| s.current)
    }

    pub fn state(&self, node_id: NodeId) -> Option<&BucketState> {
        self.states.get(&node_id)
    }

    pub fn has_pending(&self, node_id: NodeId) -> bool {
        self.states
            .get(&node_id)
            .is_some_and(|s| s.pending.is_some())
    }

    /// Cancel a node's pending upgrade; no-op if there is none
    pub fn cancel(&mut self, node_id: NodeId) {
        if let Some(state) = self.states.get_mut(&node_id) {
            state.pending = None;
        }
    }

    /// Drop a node's state entirely, cancelling its timer
    pub fn evict(&mut self, node_id: NodeId) -> Option<BucketState> {
        self.states.remove(&node_id)
    }

    /// Evict every node not in `keep`, returning the evicted ids
    pub fn retain_only(&mut self, keep: &HashSet<NodeId>) -> Vec<NodeId> {
        let evicted: Vec<NodeId> = self
            .states
            .keys()
            .filter(|id| !keep.contains(id))
            .copied()
            .collect();
        for id in &evicted {
            self.states.remove(id);
        }
        evicted
    }

    /// Cancel all timers and forget all nodes
    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.states.values().filter(|s| s.pending.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table() -> BucketTable {
        BucketTable::new(&BucketConfig::default())
    }

    const DELAY: Duration = Duration::from_millis(150);

    #[test]
    fn test_target_bucket() {
        let sizes = [64, 128, 256];
        assert_eq!(target_bucket(&sizes, 10.0), 64);
        assert_eq!(target_bucket(&sizes, 64.0), 64);
        assert_eq!(target_bucket(&sizes, 65.0), 128);
        assert_eq!(target_bucket(&sizes, 9000.0), 256);
        assert_eq!(target_bucket(&[], 10.0), 0);
    }

    #[test]
    fn test_first_query_commits_immediately() {
        let mut t = table();
        let now = Instant::now();
        assert_eq!(t.select(NodeId(1), 200.0, now), 256);
        assert!(!t.has_pending(NodeId(1)));
    }

    #[test]
    fn test_upgrade_waits_for_delay() {
        let mut t = table();
        let t0 = Instant::now();
        t.select(NodeId(1), 100.0, t0);

        assert_eq!(t.select(NodeId(1), 400.0, t0), 128);
        assert!(t.has_pending(NodeId(1)));

        assert!(t.poll(t0 + Duration::from_millis(149)).is_empty());
        assert_eq!(t.current(NodeId(1)), Some(128));

        assert_eq!(t.poll(t0 + DELAY), vec![(NodeId(1), 512)]);
        assert_eq!(t.current(NodeId(1)), Some(512));
        assert!(!t.has_pending(NodeId(1)));
    }

    #[test]
    fn test_new_target_restarts_delay_and_later_target_wins() {
        let mut t = table();
        let t0 = Instant::now();
        t.select(NodeId(1), 100.0, t0);
        t.select(NodeId(1), 200.0, t0);

        let t1 = t0 + Duration::from_millis(100);
        t.select(NodeId(1), 900.0, t1);

        // The first deadline has passed but was superseded
        assert!(t.poll(t0 + DELAY).is_empty());
        assert_eq!(t.poll(t1 + DELAY), vec![(NodeId(1), 1024)]);
    }

    #[test]
    fn test_repeated_same_target_keeps_deadline() {
        let mut t = table();
        let t0 = Instant::now();
        t.select(NodeId(1), 100.0, t0);
        t.select(NodeId(1), 400.0, t0);
        t.select(NodeId(1), 410.0, t0 + Duration::from_millis(120));
        assert_eq!(t.poll(t0 + DELAY), vec![(NodeId(1), 512)]);
    }

    #[test]
    fn test_downgrade_is_synchronous() {
        let mut t = table();
        let t0 = Instant::now();
        t.select(NodeId(1), 500.0, t0);
        assert_eq!(t.select(NodeId(1), 60.0, t0), 64);
        assert_eq!(t.current(NodeId(1)), Some(64));
    }

    #[test]
    fn test_downgrade_cancels_pending_upgrade() {
        let mut t = table();
        let t0 = Instant::now();
        t.select(NodeId(1), 200.0, t0);
        t.select(NodeId(1), 900.0, t0);
        assert!(t.has_pending(NodeId(1)));
        t.select(NodeId(1), 50.0, t0);
        assert!(!t.has_pending(NodeId(1)));
        assert!(t.poll(t0 + DELAY * 2).is_empty());
    }

    #[test]
    fn test_required_size_just_past_boundary_holds() {
        let mut t = table();
        let t0 = Instant::now();
        t.select(NodeId(1), 128.0, t0);
        // 129px targets 256 but is within 15% of the committed 128
        assert_eq!(t.select(NodeId(1), 129.0, t0), 128);
        assert!(!t.has_pending(NodeId(1)));
    }

    #[test]
    fn test_evict_cancels_and_is_idempotent() {
        let mut t = table();
        let t0 = Instant::now();
        t.select(NodeId(1), 100.0, t0);
        t.select(NodeId(1), 400.0, t0);
        assert!(t.evict(NodeId(1)).is_some());
        assert!(t.evict(NodeId(1)).is_none());
        t.cancel(NodeId(1));
        assert!(t.poll(t0 + DELAY).is_empty());
    }

    #[test]
    fn test_retain_only_and_clear() {
        let mut t = table();
        let t0 = Instant::now();
        for id in 0..5 {
            t.select(NodeId(id), 100.0, t0);
        }
        let keep: HashSet<_> = [NodeId(1), NodeId(3)].into_iter().collect();
        let mut evicted = t.retain_only(&keep);
        evicted.sort();
        assert_eq!(evicted, vec![NodeId(0), NodeId(2), NodeId(4)]);
        assert_eq!(t.len(), 2);

        t.clear();
        assert!(t.is_empty());
    }

    proptest! {
        #[test]
        fn test_close_custom_buckets_never_flap(
            required in prop::collection::vec(95.0f32..115.0, 1..40),
        ) {
            // Buckets 100 and 110 are within 15% of each other
            let config = BucketConfig {
                sizes: vec![100, 110, 400],
                hysteresis: 0.15,
                upgrade_delay_ms: 150,
            };
            let mut t = BucketTable::new(&config);
            let t0 = Instant::now();
            let committed = t.select(NodeId(7), 100.0, t0);
            for (i, px) in required.into_iter().enumerate() {
                let now = t0 + Duration::from_millis(200 * i as u64);
                t.select(NodeId(7), px, now);
                t.poll(now);
                prop_assert_eq!(t.current(NodeId(7)), Some(committed));
            }
        }
    }
}
