//! Progressive image loading driven by resolution buckets
//!
//! [`ImagePipeline`] sits between the bucket selector and an external
//! [`ImageLoader`]. Every frame it receives the visible nodes, asks the
//! [`BucketTable`] which resolution each one should show, and requests that
//! resolution from the loader. Until a new resolution has loaded the
//! previously loaded one stays on screen, so an upgrade never flashes a
//! placeholder.

use crate::bucket::BucketTable;
use crate::config::BucketConfig;
use crate::types::{Node, NodeId};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Loader-reported state of one `(url, bucket)` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed,
}

/// External image fetcher and cache
///
/// `load` is called every frame for every visible image and must be cheap
/// for requests already in flight or cached.
#[cfg_attr(test, mockall::automock)]
pub trait ImageLoader: Send {
    fn load(&mut self, url: &str, bucket: u32) -> LoadState;

    /// Abandon a request; unknown requests are ignored
    fn cancel(&mut self, url: &str, bucket: u32);
}

/// What the renderer should draw for a node's photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageDisplay {
    /// No loader, photo hidden, or nothing requested yet
    Placeholder,
    /// First load in flight; nothing to show
    Loading,
    Ready { bucket: u32 },
    /// `shown` stays on screen while `loading` is fetched
    Swapping { shown: u32, loading: u32 },
    Failed,
}

#[derive(Debug, Clone)]
struct ImageEntry {
    url: String,
    requested: u32,
    displayed: Option<u32>,
    failed: bool,
}

/// Per-node image state for the visible set
pub struct ImagePipeline {
    buckets: BucketTable,
    loader: Option<Box<dyn ImageLoader>>,
    entries: HashMap<NodeId, ImageEntry>,
}

impl std::fmt::Debug for ImagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline")
            .field("buckets", &self.buckets)
            .field("loader", &self.loader.is_some())
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ImagePipeline {
    pub fn new(config: &BucketConfig, loader: Option<Box<dyn ImageLoader>>) -> Self {
        Self {
            buckets: BucketTable::new(config),
            loader,
            entries: HashMap::new(),
        }
    }

    pub fn set_loader(&mut self, loader: Option<Box<dyn ImageLoader>>) {
        self.clear();
        self.loader = loader;
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    pub fn buckets(&self) -> &BucketTable {
        &self.buckets
    }

    /// Bring image state in line with the visible set
    ///
    /// `photo_width` is the on-screen photo edge in logical pixels at scale
    /// 1.0; the required bucket is `photo_width * scale * dpr`.
    pub fn update(
        &mut self,
        visible: &[&Node],
        scale: f32,
        photo_width: f32,
        device_pixel_ratio: f32,
        show_photos: bool,
        now: Instant,
    ) {
        let wanted: HashSet<NodeId> = if show_photos {
            visible
                .iter()
                .filter(|n| n.shows_image(true))
                .map(|n| n.id)
                .collect()
        } else {
            HashSet::new()
        };

        // Evict first so departed nodes never commit a late upgrade
        for id in self.buckets.retain_only(&wanted) {
            self.evict(id);
        }
        let stale: Vec<NodeId> = self
            .entries
            .keys()
            .filter(|id| !wanted.contains(id))
            .copied()
            .collect();
        for id in stale {
            self.evict(id);
        }

        let required = photo_width * scale * device_pixel_ratio;
        for node in visible {
            if !wanted.contains(&node.id) {
                continue;
            }
            let Some(url) = node.image_url.as_deref() else {
                continue;
            };
            let bucket = self.buckets.select(node.id, required, now);
            self.request(node.id, url, bucket);
        }

        for (id, bucket) in self.buckets.poll(now) {
            if let Some(url) = self.entries.get(&id).map(|e| e.url.clone()) {
                self.request(id, &url, bucket);
            }
        }
    }

    /// Display state for a node
    pub fn display(&self, id: NodeId) -> ImageDisplay {
        if self.loader.is_none() {
            return ImageDisplay::Placeholder;
        }
        let Some(entry) = self.entries.get(&id) else {
            return ImageDisplay::Placeholder;
        };
        match entry.displayed {
            // A failed swap keeps showing what already loaded
            Some(shown) if shown == entry.requested || entry.failed => {
                ImageDisplay::Ready { bucket: shown }
            }
            Some(shown) => ImageDisplay::Swapping {
                shown,
                loading: entry.requested,
            },
            None if entry.failed => ImageDisplay::Failed,
            None => ImageDisplay::Loading,
        }
    }

    /// Number of nodes with image state
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancel every request and forget all state
    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.entries.keys().copied().collect();
        for id in ids {
            self.evict(id);
        }
        self.buckets.clear();
    }

    fn request(&mut self, id: NodeId, url: &str, bucket: u32) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        let entry = self.entries.entry(id).or_insert_with(|| ImageEntry {
            url: url.to_string(),
            requested: bucket,
            displayed: None,
            failed: false,
        });

        if entry.requested != bucket {
            // Drop an in-flight request that will never be shown
            if entry.displayed != Some(entry.requested) {
                loader.cancel(&entry.url, entry.requested);
            }
            entry.requested = bucket;
            entry.failed = false;
        }
        if entry.failed || entry.displayed == Some(bucket) {
            return;
        }
        match loader.load(&entry.url, bucket) {
            LoadState::Loaded => entry.displayed = Some(bucket),
            LoadState::Failed => entry.failed = true,
            LoadState::Loading => {}
        }
    }

    fn evict(&mut self, id: NodeId) {
        self.buckets.evict(id);
        let Some(entry) = self.entries.remove(&id) else {
            return;
        };
        if let Some(loader) = self.loader.as_mut() {
            if entry.displayed != Some(entry.requested) {
                loader.cancel(&entry.url, entry.requested);
            }
        }
        tracing::trace!("Evicted image state for {}", id);
    }
}
