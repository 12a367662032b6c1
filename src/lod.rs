//! Level-of-detail tier selection
//!
//! Maps the camera scale to one of three drawing tiers. Two mechanisms keep
//! the tier from flickering while the user holds the zoom near a boundary:
//!
//! - **Quantization**: the scale is snapped to a fixed step and nothing is
//!   recomputed until the snapped value moves.
//! - **Hysteresis**: each threshold has a dead zone. Leaving a tier requires
//!   crossing the threshold by the full band in the direction of travel.

use crate::config::{LodConfig, RuntimeSettings};
use serde::{Deserialize, Serialize};

/// Drawing fidelity for the whole view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum DetailTier {
    /// Full cards with photo, name and dates
    #[default]
    Full,
    /// Compact name pills
    Compact,
    /// Hero chips standing in for whole subtrees
    Aggregated,
}

impl DetailTier {
    /// Numeric level, 1 (finest) to 3 (coarsest)
    pub fn level(self) -> u8 {
        match self {
            DetailTier::Full => 1,
            DetailTier::Compact => 2,
            DetailTier::Aggregated => 3,
        }
    }

    /// Whether photos are drawn at this tier under the global toggle
    pub fn draws_photos(self, show_photos: bool) -> bool {
        show_photos && self == DetailTier::Full
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DetailTier::Full => "Full",
            DetailTier::Compact => "Compact",
            DetailTier::Aggregated => "Aggregated",
        }
    }
}

/// Per-view tier cache, mutated only by [`select_tier`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierState {
    pub current: DetailTier,
    /// Quantized scale the current tier was computed from
    pub last_quantized: Option<f32>,
}

impl TierState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Snap a scale to the nearest multiple of `step`
pub fn quantize_scale(scale: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return scale;
    }
    (scale / step).round() * step
}

/// Select the detail tier for `scale`, updating `state` in place
pub fn select_tier(
    scale: f32,
    state: &mut TierState,
    config: &LodConfig,
    settings: &RuntimeSettings,
) -> DetailTier {
    if settings.force_full_detail {
        return DetailTier::Full;
    }

    let quantized = quantize_scale(scale, config.quantize_step);
    if let Some(last) = state.last_quantized {
        if (quantized - last).abs() < config.quantize_step * 1e-3 {
            return state.current;
        }
    }
    state.last_quantized = Some(quantized);

    let size = quantized * config.base_node_width * config.device_pixel_ratio;
    let h = config.hysteresis;
    let full_up = config.full_threshold_px * (1.0 + h);
    let full_down = config.full_threshold_px * (1.0 - h);
    let compact_up = config.compact_threshold_px * (1.0 + h);
    let compact_down = config.compact_threshold_px * (1.0 - h);

    let next = match state.current {
        DetailTier::Full => {
            if size < compact_down {
                DetailTier::Aggregated
            } else if size < full_down {
                DetailTier::Compact
            } else {
                DetailTier::Full
            }
        }
        DetailTier::Compact => {
            if size > full_up {
                DetailTier::Full
            } else if size < compact_down {
                DetailTier::Aggregated
            } else {
                DetailTier::Compact
            }
        }
        DetailTier::Aggregated => {
            if size > full_up {
                DetailTier::Full
            } else if size > compact_up {
                DetailTier::Compact
            } else {
                DetailTier::Aggregated
            }
        }
    };

    if next != state.current {
        tracing::debug!(
            "LOD tier {} -> {} at scale {:.2} ({:.1}px)",
            state.current.display_name(),
            next.display_name(),
            quantized,
            size
        );
        state.current = next;
    }
    next
}
