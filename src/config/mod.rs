//! Configuration module for kincanvas
//!
//! This module handles engine configuration including:
//! - Tunables for every engine component ([`EngineConfig`])
//! - The persisted view snapshot restored on the next launch ([`ViewState`])
//! - Runtime toggles flipped while the view is live ([`settings`])
//!
//! # App Data Location
//!
//! The engine configuration is read from the platform config directory and
//! the view snapshot is written to the platform data directory, both under
//! `dev.hxyulin.kincanvas`:
//!
//! - **Linux**: `~/.config/dev.hxyulin.kincanvas/engine.toml`, `~/.local/share/dev.hxyulin.kincanvas/view_state.json`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.kincanvas/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.kincanvas\`
//!
//! # Example
//!
//! ```ignore
//! use kincanvas::config::{EngineConfig, ViewState};
//!
//! let config = EngineConfig::load_or_default();
//! let mut view = ViewState::load_or_default();
//! view.last_transform = Some(engine.transform());
//! view.save()?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{KinCanvasError, Result, ResultExt};
use crate::types::{NodeId, Size, Transform};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Application identifier for config and data directories
pub const APP_ID: &str = "dev.hxyulin.kincanvas";

/// Engine configuration filename
pub const ENGINE_CONFIG_FILE: &str = "engine.toml";

/// View snapshot filename
pub const VIEW_STATE_FILE: &str = "view_state.json";

// ==================== Directories ====================

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        KinCanvasError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).context("Failed to create app data directory")?;
    }

    Ok(dir)
}

// ==================== Component Configs ====================

/// Level-of-detail tier selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Scale quantization step; smaller scale changes are ignored
    pub quantize_step: f32,
    /// Width of a full card at scale 1.0, in logical pixels
    pub base_node_width: f32,
    /// Physical pixels per logical pixel
    pub device_pixel_ratio: f32,
    /// On-screen card width at or above which full cards are drawn
    pub full_threshold_px: f32,
    /// On-screen card width at or above which compact pills are drawn
    pub compact_threshold_px: f32,
    /// Relative dead zone around each threshold
    pub hysteresis: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            quantize_step: 0.05,
            base_node_width: 120.0,
            device_pixel_ratio: 1.0,
            full_threshold_px: 90.0,
            compact_threshold_px: 36.0,
            hysteresis: 0.1,
        }
    }
}

/// Image resolution bucket selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Supported image edge lengths in pixels, ascending
    pub sizes: Vec<u32>,
    /// Relative dead zone around the committed bucket
    pub hysteresis: f32,
    /// Delay before an upgrade is committed, in milliseconds
    pub upgrade_delay_ms: u64,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            sizes: vec![64, 128, 256, 512, 1024],
            hysteresis: 0.15,
            upgrade_delay_ms: 150,
        }
    }
}

impl BucketConfig {
    pub fn upgrade_delay(&self) -> Duration {
        Duration::from_millis(self.upgrade_delay_ms)
    }
}

/// Spatial grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Grid cell edge length in world units
    pub cell_size: f32,
    /// Hard cap on nodes returned by one query
    pub max_visible_nodes: usize,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 400.0,
            max_visible_nodes: 1500,
        }
    }
}

/// Touch recognizer thresholds and momentum physics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Maximum finger travel for a tap, in screen pixels
    pub tap_max_distance: f32,
    /// Maximum press duration for a tap, in milliseconds
    pub tap_max_duration_ms: u64,
    /// Hold time before a long-press fires, in milliseconds
    pub long_press_duration_ms: u64,
    /// Maximum finger travel while holding, in screen pixels
    pub long_press_max_distance: f32,
    /// Release speed below which a pan ends without momentum (px/s)
    pub min_fling_velocity: f32,
    /// Release speed cap (px/s)
    pub max_fling_velocity: f32,
    /// Per-millisecond velocity retention during momentum
    pub deceleration: f32,
    /// Window of recent samples used to estimate release velocity, in milliseconds
    pub velocity_window_ms: u64,
    /// Screen pixels of content kept on screen when momentum is bounded
    pub pan_overscroll: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_max_distance: 10.0,
            tap_max_duration_ms: 250,
            long_press_duration_ms: 500,
            long_press_max_distance: 10.0,
            min_fling_velocity: 50.0,
            max_fling_velocity: 4000.0,
            deceleration: 0.998,
            velocity_window_ms: 100,
            pan_overscroll: 200.0,
        }
    }
}

impl GestureConfig {
    pub fn tap_max_duration(&self) -> Duration {
        Duration::from_millis(self.tap_max_duration_ms)
    }

    pub fn long_press_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_duration_ms)
    }

    pub fn velocity_window(&self) -> Duration {
        Duration::from_millis(self.velocity_window_ms)
    }
}

/// Damped spring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Distance from target below which the spring may settle
    pub rest_displacement: f32,
    /// Speed below which the spring may settle
    pub rest_speed: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 170.0,
            damping: 26.0,
            mass: 1.0,
            rest_displacement: 0.5,
            rest_speed: 2.0,
        }
    }
}

/// Zoom limits, visible-region margins and navigation animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Fraction the scale may exceed the limits while pinching
    pub elastic_overshoot: f32,
    /// Screen-space margin around the viewport used for visibility queries
    pub visible_margin_x: f32,
    pub visible_margin_y: f32,
    /// Scale range that navigation keeps as-is instead of snapping
    pub auto_zoom_min: f32,
    pub auto_zoom_max: f32,
    /// Scale navigation snaps to when the current one is out of range
    pub default_focus_scale: f32,
    /// Duration of the scale animation during navigation, in milliseconds
    pub navigate_scale_duration_ms: u64,
    /// Spring used for translation during navigation and pinch bounce
    pub spring: SpringConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.05,
            max_zoom: 4.0,
            elastic_overshoot: 0.15,
            visible_margin_x: 200.0,
            visible_margin_y: 200.0,
            auto_zoom_min: 0.6,
            auto_zoom_max: 2.5,
            default_focus_scale: 1.0,
            navigate_scale_duration_ms: 400,
            spring: SpringConfig::default(),
        }
    }
}

impl CameraConfig {
    pub fn navigate_scale_duration(&self) -> Duration {
        Duration::from_millis(self.navigate_scale_duration_ms)
    }

    /// Clamp a scale to the resting zoom limits
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_zoom, self.max_zoom)
    }

    /// Clamp a scale to the elastic band allowed during a pinch
    pub fn clamp_elastic(&self, scale: f32) -> f32 {
        scale.clamp(
            self.min_zoom * (1.0 - self.elastic_overshoot),
            self.max_zoom * (1.0 + self.elastic_overshoot),
        )
    }
}

/// Card dimensions shared by hit-testing and connector geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    /// Edge offset for non-root cards whose photo is hidden
    pub hidden_image_compensation: f32,
    /// Horizontal offset below which a single child needs no bus line
    pub bus_alignment_tolerance: f32,
    /// Card showing a photo
    pub photo: Size,
    /// Text-only card
    pub text: Size,
    /// The tree's root card
    pub root: Size,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        let photo = Size::new(120.0, 75.0);
        let text = Size::new(120.0, 40.0);
        Self {
            hidden_image_compensation: (photo.height - text.height) / 2.0,
            bus_alignment_tolerance: 5.0,
            photo,
            text,
            root: Size::new(150.0, 90.0),
        }
    }
}

/// Chip sizing for aggregated-tier hit testing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTestConfig {
    /// Chip edge length in screen pixels
    pub chip_size: f32,
    /// Enlargement applied to chips representing the tree's root
    pub root_chip_multiplier: f32,
}

impl Default for HitTestConfig {
    fn default() -> Self {
        Self {
            chip_size: 44.0,
            root_chip_multiplier: 1.5,
        }
    }
}

// ==================== Engine Config ====================

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lod: LodConfig,
    pub bucket: BucketConfig,
    pub spatial: SpatialConfig,
    pub gesture: GestureConfig,
    pub camera: CameraConfig,
    pub metrics: NodeMetrics,
    pub hit_test: HitTestConfig,
}

impl EngineConfig {
    /// Path of the engine config in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        app_config_dir().map(|p| p.join(ENGINE_CONFIG_FILE))
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: EngineConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path().filter(|p| p.exists()) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                tracing::info!("Loaded engine config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load engine config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.bucket.sizes.is_empty() {
            return Err(KinCanvasError::Config(
                "bucket.sizes must not be empty".to_string(),
            ));
        }
        if self.bucket.sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(KinCanvasError::Config(
                "bucket.sizes must be strictly ascending".to_string(),
            ));
        }
        if !(self.camera.min_zoom > 0.0 && self.camera.min_zoom <= self.camera.max_zoom) {
            return Err(KinCanvasError::Config(format!(
                "invalid zoom range [{}, {}]",
                self.camera.min_zoom, self.camera.max_zoom
            )));
        }
        if self.spatial.cell_size <= 0.0 {
            return Err(KinCanvasError::Config(
                "spatial.cell_size must be positive".to_string(),
            ));
        }
        if self.lod.quantize_step <= 0.0 {
            return Err(KinCanvasError::Config(
                "lod.quantize_step must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== View State ====================

/// Camera snapshot persisted across launches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewState {
    /// Version for future migration support
    #[serde(default = "default_view_state_version")]
    pub version: u32,

    /// Transform at the time of the last snapshot
    #[serde(default)]
    pub last_transform: Option<Transform>,

    /// Node the user last navigated to or selected
    #[serde(default)]
    pub focused_node: Option<NodeId>,

    /// When the snapshot was taken (Unix seconds)
    #[serde(default)]
    pub saved_at: u64,
}

fn default_view_state_version() -> u32 {
    1
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            version: 1,
            last_transform: None,
            focused_node: None,
            saved_at: 0,
        }
    }
}

impl ViewState {
    /// Load from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).context("Failed to read view state")?;
        serde_json::from_str(&content).context("Failed to parse view state")
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = app_data_dir()
            .map(|p| p.join(VIEW_STATE_FILE))
            .filter(|p| p.exists())
        else {
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load view state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save to a JSON file, stamping the save time
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.saved_at = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content).context("Failed to write view state")
    }

    /// Save to the default location
    pub fn save(&mut self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(VIEW_STATE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_compensation_matches_card_heights() {
        let m = NodeMetrics::default();
        assert_eq!(m.hidden_image_compensation, 17.5);
    }

    #[test]
    fn test_validate_rejects_unsorted_buckets() {
        let mut config = EngineConfig::default();
        config.bucket.sizes = vec![128, 64];
        assert!(config.validate().is_err());
        config.bucket.sizes.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_zoom_range() {
        let mut config = EngineConfig::default();
        config.camera.min_zoom = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [camera]
            max_zoom = 8.0

            [bucket]
            upgrade_delay_ms = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.camera.max_zoom, 8.0);
        assert_eq!(config.camera.min_zoom, CameraConfig::default().min_zoom);
        assert_eq!(config.bucket.upgrade_delay(), Duration::from_millis(300));
        assert_eq!(config.bucket.sizes, BucketConfig::default().sizes);
    }

    #[test]
    fn test_engine_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(ENGINE_CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.spatial.cell_size = 256.0;
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENGINE_CONFIG_FILE);
        std::fs::write(&path, "[camera\nmax_zoom = ").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }

    #[test]
    fn test_view_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VIEW_STATE_FILE);

        let mut state = ViewState {
            last_transform: Some(Transform::new(10.0, -20.0, 1.5)),
            focused_node: Some(NodeId(42)),
            ..Default::default()
        };
        state.save_to(&path).unwrap();
        assert!(state.saved_at > 0);

        let loaded = ViewState::load_from(&path).unwrap();
        assert_eq!(loaded.last_transform, state.last_transform);
        assert_eq!(loaded.focused_node, Some(NodeId(42)));
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_clamp_elastic_band() {
        let camera = CameraConfig::default();
        assert_eq!(camera.clamp_scale(10.0), camera.max_zoom);
        let elastic = camera.clamp_elastic(10.0);
        assert!(elastic > camera.max_zoom);
        assert!((elastic - camera.max_zoom * 1.15).abs() < 1e-5);
    }
}
