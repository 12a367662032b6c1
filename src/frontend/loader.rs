//! Fake network for the demo viewer
//!
//! Every request completes after a latency that grows with the bucket size,
//! so progressive swaps are visible on screen without a real image service.

use crate::images::{ImageLoader, LoadState};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Base latency of every request
const BASE_LATENCY: Duration = Duration::from_millis(80);

/// Extra latency per 128 px of bucket edge
const LATENCY_PER_STEP: Duration = Duration::from_millis(60);

/// Loader that completes requests on a timer
#[derive(Debug, Default)]
pub struct SimulatedImageLoader {
    inflight: HashMap<(String, u32), Instant>,
    loaded: HashSet<(String, u32)>,
    /// URLs containing this fragment always fail
    fail_fragment: Option<String>,
    cancelled: usize,
}

impl SimulatedImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, fragment: impl Into<String>) -> Self {
        self.fail_fragment = Some(fragment.into());
        self
    }

    pub fn latency(bucket: u32) -> Duration {
        BASE_LATENCY + LATENCY_PER_STEP * (bucket / 128)
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    fn load_at(&mut self, url: &str, bucket: u32, now: Instant) -> LoadState {
        if self
            .fail_fragment
            .as_deref()
            .is_some_and(|fragment| url.contains(fragment))
        {
            return LoadState::Failed;
        }
        let key = (url.to_string(), bucket);
        if self.loaded.contains(&key) {
            return LoadState::Loaded;
        }
        let started = *self.inflight.entry(key.clone()).or_insert(now);
        if now.duration_since(started) >= Self::latency(bucket) {
            self.inflight.remove(&key);
            self.loaded.insert(key);
            LoadState::Loaded
        } else {
            LoadState::Loading
        }
    }
}

impl ImageLoader for SimulatedImageLoader {
    fn load(&mut self, url: &str, bucket: u32) -> LoadState {
        self.load_at(url, bucket, Instant::now())
    }

    fn cancel(&mut self, url: &str, bucket: u32) {
        if self.inflight.remove(&(url.to_string(), bucket)).is_some() {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_completes_after_latency() {
        let mut loader = SimulatedImageLoader::new();
        let t0 = Instant::now();
        assert_eq!(loader.load_at("a", 128, t0), LoadState::Loading);
        assert_eq!(loader.inflight(), 1);
        let done = t0 + SimulatedImageLoader::latency(128);
        assert_eq!(loader.load_at("a", 128, done), LoadState::Loaded);
        assert_eq!(loader.load_at("a", 128, t0), LoadState::Loaded);
        assert_eq!(loader.inflight(), 0);
    }

    #[test]
    fn test_cancel_forgets_inflight_request() {
        let mut loader = SimulatedImageLoader::new();
        let t0 = Instant::now();
        loader.load_at("a", 512, t0);
        loader.cancel("a", 512);
        loader.cancel("a", 512);
        assert_eq!(loader.cancelled(), 1);
        assert_eq!(loader.inflight(), 0);
    }

    #[test]
    fn test_failing_fragment() {
        let mut loader = SimulatedImageLoader::new().failing("/broken/");
        assert_eq!(
            loader.load_at("https://x/broken/1.jpg", 128, Instant::now()),
            LoadState::Failed
        );
    }
}
