//! Runtime settings that can be modified while the view is live
//!
//! These toggles are separate from the persistent [`EngineConfig`](super::EngineConfig):
//! they are flipped by the host application (or a diagnostics overlay) and
//! read by the engine on the next frame.
//!
//! # Main Types
//!
//! - [`RuntimeSettings`] - Detail kill switch, aggregation, photos, overlay
//!
//! # Kill Switch
//!
//! `force_full_detail` pins the LOD selector to full cards regardless of
//! zoom. It exists for diagnostics and as a low-power fallback when tier
//! transitions themselves are too costly.

use serde::{Deserialize, Serialize};

/// Runtime toggles for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Always draw full cards, ignoring zoom
    pub force_full_detail: bool,

    /// Whether the aggregated tier draws and hit-tests hero chips
    pub aggregation_enabled: bool,

    /// Global photo toggle; off draws every card text-only
    pub show_photos: bool,

    /// Draw grid and frame diagnostics on top of the tree
    pub show_debug_overlay: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            force_full_detail: false,
            aggregation_enabled: true,
            show_photos: true,
            show_debug_overlay: false,
        }
    }
}

impl RuntimeSettings {
    /// Create new runtime settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the full-detail kill switch
    pub fn toggle_force_full_detail(&mut self) {
        self.force_full_detail = !self.force_full_detail;
    }

    /// Toggle hero chip aggregation
    pub fn toggle_aggregation(&mut self) {
        self.aggregation_enabled = !self.aggregation_enabled;
    }

    /// Toggle photos
    pub fn toggle_photos(&mut self) {
        self.show_photos = !self.show_photos;
    }

    /// Toggle the diagnostics overlay
    pub fn toggle_debug_overlay(&mut self) {
        self.show_debug_overlay = !self.show_debug_overlay;
    }
}
