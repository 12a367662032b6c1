//! # kincanvas: rendering and interaction engine for large family trees
//!
//! Draws and navigates pre-positioned genealogical trees with thousands of
//! nodes at interactive frame rates on touch surfaces. Node positions come
//! from an upstream layout stage; this crate decides what to draw, at which
//! fidelity, and how touch input moves the camera.
//!
//! ## Architecture
//!
//! - **Selection of what to draw**: [`spatial`] grid queries for the visible
//!   set, [`lod`] detail tiers, [`connectors`] line geometry
//! - **Images**: [`bucket`] resolution buckets with debounced upgrades,
//!   driving the [`images`] pipeline over an external loader
//! - **Input**: [`gesture`] recognizers writing the camera transform, with
//!   [`hit_test`] resolving taps
//! - **Camera**: [`camera`] transform state, animations and navigation
//! - **Communication**: [`bridge`] crossbeam channel from the per-frame
//!   engine to the application
//!
//! [`engine::TreeEngine`] composes all of these once per frame.
//!
//! ## Configuration
//!
//! Engine tuning lives in `engine.toml` and the last camera position in
//! `view_state.json`, under `dev.hxyulin.kincanvas` in the platform config
//! and data directories.
//!
//! ## Example
//!
//! ```ignore
//! use kincanvas::{EngineBridge, EngineConfig, EngineEvent, TreeEngine};
//! use std::time::Instant;
//!
//! let (bridge, sink) = EngineBridge::new();
//! let mut engine = TreeEngine::new(EngineConfig::load_or_default(), sink);
//! engine.set_viewport(kincanvas::Viewport::new(1280.0, 720.0));
//! engine.set_nodes(kincanvas::sample::sample_tree(6, 3));
//!
//! let frame = engine.frame(Instant::now());
//! for event in bridge.drain() {
//!     if let EngineEvent::VisibleSetChanged { ids, .. } = event {
//!         println!("{} nodes on screen", ids.len());
//!     }
//! }
//! ```

pub mod bridge;
pub mod bucket;
pub mod camera;
pub mod config;
pub mod connectors;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod gesture;
pub mod hit_test;
pub mod images;
pub mod lod;
pub mod sample;
pub mod spatial;
pub mod tree;
pub mod types;

// Re-export commonly used types
pub use bridge::{EngineBridge, EngineEvent, EventSink, NavigationTracker};
pub use camera::{CameraController, NavigationId, TransformState};
pub use config::{settings::RuntimeSettings, EngineConfig, ViewState};
pub use engine::{FrameOutput, TreeEngine};
pub use error::{KinCanvasError, Result};
pub use frontend::KinCanvasApp;
pub use gesture::{GestureEngine, PointerEvent, PointerPhase};
pub use hit_test::Selection;
pub use images::{ImageDisplay, ImageLoader, LoadState};
pub use lod::DetailTier;
pub use spatial::SpatialIndex;
pub use tree::TreeFile;
pub use types::{Node, NodeId, Point, Rect, Transform, Viewport};
