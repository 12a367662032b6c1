//! Demo viewer built on eframe/egui
//!
//! A thin host for [`TreeEngine`]: it feeds egui input to the engine, paints
//! each [`FrameOutput`](crate::engine::FrameOutput), and reacts to the
//! events the engine publishes over the bridge.
//!
//! # Submodules
//!
//! - [`canvas`] - egui painter for frame output and the debug overlay
//! - [`input`] - egui events to engine pointer events
//! - [`loader`] - simulated image service with per-bucket latency

pub mod canvas;
pub mod input;
pub mod loader;

pub use input::InputAdapter;
pub use loader::SimulatedImageLoader;

use crate::bridge::{EngineBridge, EngineEvent, NavigationTracker};
use crate::config::{EngineConfig, ViewState};
use crate::engine::TreeEngine;
use crate::hit_test::Selection;
use crate::images::ImageLoader;
use crate::tree::TreeFile;
use crate::types::{NodeId, Point, Viewport};
use egui::{Color32, RichText};
use std::collections::VecDeque;
use std::time::Instant;

/// Lines kept in the event log panel
const EVENT_LOG_LEN: usize = 40;

/// Main application state for the viewer
pub struct KinCanvasApp {
    // === Engine ===
    engine: TreeEngine,
    bridge: EngineBridge,
    tracker: NavigationTracker,
    input: InputAdapter,

    // === UI State ===
    view_state: ViewState,
    selection: Option<Selection>,
    quick_action: Option<(NodeId, Point)>,
    navigate_input: String,
    event_log: VecDeque<String>,
    visible_count: usize,
    last_error: Option<String>,
}

impl KinCanvasApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: EngineConfig,
        tree: TreeFile,
        view_state: ViewState,
        loader: Option<Box<dyn ImageLoader>>,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let (bridge, sink) = EngineBridge::new();
        let mut engine = TreeEngine::new(config, sink);
        let (nodes, aggregation) = tree.into_parts();
        engine.set_nodes(nodes);
        engine.set_aggregation(Some(aggregation));
        engine.set_image_loader(loader);
        engine.restore_view(&view_state);

        tracing::info!("Viewer ready with {} nodes", engine.index().len());

        Self {
            engine,
            bridge,
            tracker: NavigationTracker::new(),
            input: InputAdapter::new(),
            view_state,
            selection: None,
            quick_action: None,
            navigate_input: String::new(),
            event_log: VecDeque::with_capacity(EVENT_LOG_LEN),
            visible_count: 0,
            last_error: None,
        }
    }

    fn log(&mut self, line: String) {
        if self.event_log.len() == EVENT_LOG_LEN {
            self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }

    fn navigate(&mut self, id: NodeId, now: Instant) {
        match self.engine.navigate_to(id, now) {
            Some(nav) => {
                self.tracker.begin(nav);
                self.last_error = None;
            }
            None => self.last_error = Some(format!("No node with id {}", id)),
        }
    }

    /// Drain the bridge; returns true if anything arrived
    fn process_engine_events(&mut self, now: Instant) -> bool {
        let events = self.bridge.drain();
        let had_events = !events.is_empty();

        for event in events {
            match event {
                EngineEvent::Selection(selection) => {
                    self.quick_action = None;
                    match selection {
                        // Tapping a hero zooms into its subtree
                        Selection::Chip(chip) => {
                            self.log(format!("Chip {} ({} people)", chip.node_id, chip.subtree_size));
                            self.navigate(chip.node_id, now);
                        }
                        Selection::Node(id) => self.log(format!("Selected {}", id)),
                        Selection::Miss => {}
                    }
                    self.selection = (!selection.is_miss()).then_some(selection);
                }
                EngineEvent::QuickAction { node_id, screen } => {
                    self.log(format!("Quick actions for {}", node_id));
                    self.quick_action = Some((node_id, screen));
                }
                EngineEvent::NavigationTarget { id, .. } => self.tracker.begin(id),
                EngineEvent::NavigationSettled(id) => {
                    if self.tracker.complete(id) {
                        self.log(format!("Arrived (navigation {})", id.0));
                    }
                }
                EngineEvent::TransformSnapshot(transform) => {
                    self.view_state.last_transform = Some(transform);
                }
                EngineEvent::VisibleSetChanged { ids, .. } => {
                    self.visible_count = ids.len();
                }
                EngineEvent::Haptic(kind) => {
                    tracing::trace!("Haptic {:?} (no actuator on desktop)", kind);
                }
            }
        }
        had_events
    }

    fn render_controls(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.heading("kincanvas");
        ui.label(
            RichText::new(format!(
                "{} nodes, {} visible",
                self.engine.index().len(),
                self.visible_count
            ))
            .small(),
        );
        ui.separator();

        let settings = self.engine.settings_mut();
        ui.checkbox(&mut settings.force_full_detail, "Force full detail");
        ui.checkbox(&mut settings.aggregation_enabled, "Aggregate when zoomed out");
        ui.checkbox(&mut settings.show_photos, "Show photos");
        ui.checkbox(&mut settings.show_debug_overlay, "Debug overlay");
        ui.separator();

        ui.label("Navigate to node");
        ui.horizontal(|ui| {
            let field = ui.add(egui::TextEdit::singleline(&mut self.navigate_input).desired_width(80.0));
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Go").clicked() || submitted {
                match self.navigate_input.trim().parse::<u64>() {
                    Ok(id) => self.navigate(NodeId(id), now),
                    Err(_) => self.last_error = Some("Node id must be a number".to_string()),
                }
            }
        });
        if ui.button("Reset view").clicked() {
            let root = self.engine.index().nodes().iter().find(|n| n.is_root()).map(|n| n.id);
            if let Some(id) = root {
                self.navigate(id, now);
            }
        }
        if let Some(error) = &self.last_error {
            ui.colored_label(Color32::LIGHT_RED, error);
        }
        ui.separator();

        if let Some(id) = self.selection.and_then(|s| s.node_id()) {
            if let Some(node) = self.engine.node(id) {
                ui.label(RichText::new(&node.label).strong());
                ui.label(format!("id {}  at ({:.0}, {:.0})", node.id, node.position.x, node.position.y));
                ui.label(format!("photo: {:?}", self.engine.image_display(id)));
            }
            ui.separator();
        }

        ui.label(RichText::new("Events").strong());
        egui::ScrollArea::vertical().stick_to_bottom(true).show(ui, |ui| {
            for line in &self.event_log {
                ui.label(RichText::new(line).small().monospace());
            }
        });
    }

    fn render_quick_actions(&mut self, ctx: &egui::Context, origin: egui::Pos2, now: Instant) {
        let Some((id, screen)) = self.quick_action else {
            return;
        };
        let mut close = false;
        egui::Area::new(egui::Id::new("quick_actions"))
            .fixed_pos(egui::pos2(origin.x + screen.x, origin.y + screen.y))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new(format!("Node {}", id)).strong());
                    if ui.button("Center").clicked() {
                        self.navigate(id, now);
                        close = true;
                    }
                    if ui.button("Highlight").clicked() {
                        self.engine.set_highlight(Some(id));
                        close = true;
                    }
                    if ui.button("Close").clicked() {
                        close = true;
                    }
                });
            });
        if close {
            self.quick_action = None;
        }
    }
}

impl eframe::App for KinCanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        egui::SidePanel::right("controls")
            .default_width(240.0)
            .show(ctx, |ui| self.render_controls(ui, now));

        let mut canvas_origin = egui::Pos2::ZERO;
        let mut needs_frame = false;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;
                canvas_origin = rect.min;
                self.engine
                    .set_viewport(Viewport::new(rect.width(), rect.height()));

                let input = ctx.input(|i| self.input.collect(i, rect, now));
                if input.focus_lost {
                    self.engine.cancel_input(now);
                }
                for event in input.pointers {
                    self.engine.handle_pointer(event);
                }
                if let Some((factor, focal)) = input.zoom {
                    self.engine.zoom_at(factor, focal, now);
                }

                let frame = self.engine.frame(now);
                canvas::paint_frame(&painter, rect.min, &frame, &self.engine);
                if self.engine.settings().show_debug_overlay {
                    canvas::paint_debug_overlay(&painter, rect.min, &frame, &self.engine);
                }
                needs_frame = frame.animating || self.engine.is_interacting();
            });

        let had_events = self.process_engine_events(now);
        self.render_quick_actions(ctx, canvas_origin, now);

        if needs_frame || had_events {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let mut view = self.engine.view_state();
        if view.last_transform.is_none() {
            view.last_transform = self.view_state.last_transform;
        }
        if let Err(e) = view.save() {
            tracing::warn!("Failed to save view state: {}", e);
        }
    }
}
