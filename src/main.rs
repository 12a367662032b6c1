//! kincanvas demo viewer - Main Entry Point
//!
//! Usage: `kincanvas [tree.json]`. Without a tree file a synthetic tree is
//! generated so the engine can be exercised at scale.

use anyhow::Context;
use kincanvas::{
    config::{EngineConfig, ViewState},
    frontend::{KinCanvasApp, SimulatedImageLoader},
    sample::{sample_heroes, sample_tree},
    tree::TreeFile,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shape of the generated tree: 3280 nodes
const SAMPLE_GENERATIONS: u32 = 8;
const SAMPLE_FANOUT: u32 = 3;

/// Generation whose members become aggregation heroes
const SAMPLE_HERO_GENERATION: u32 = 2;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kincanvas=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kincanvas viewer");

    let config = EngineConfig::load_or_default();
    let view_state = ViewState::load_or_default();

    let tree = match std::env::args().nth(1) {
        Some(path) => TreeFile::load(&path).with_context(|| format!("Cannot open tree {}", path))?,
        None => {
            let nodes = sample_tree(SAMPLE_GENERATIONS, SAMPLE_FANOUT);
            let heroes = sample_heroes(&nodes, SAMPLE_HERO_GENERATION);
            TreeFile::new(nodes, heroes)
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("kincanvas"),
        ..Default::default()
    };

    eframe::run_native(
        "kincanvas",
        native_options,
        Box::new(|cc| {
            Ok(Box::new(KinCanvasApp::new(
                cc,
                config,
                tree,
                view_state,
                Some(Box::new(SimulatedImageLoader::new())),
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Viewer failed: {}", e))?;

    tracing::info!("Shutting down...");
    Ok(())
}
