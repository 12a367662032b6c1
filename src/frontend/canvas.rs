//! Painting a [`FrameOutput`] with egui
//!
//! Drawing order is connectors, then cards or chips, then the debug overlay.
//! All geometry comes from the engine; this module only maps world space to
//! the canvas and picks colors.

use crate::engine::{FrameOutput, TreeEngine};
use crate::hit_test::{card_size, chip_rect};
use crate::images::ImageDisplay;
use crate::lod::DetailTier;
use crate::types::{Node, Point, Rect, Transform};
use egui::{Align2, Color32, FontId, Painter, Pos2, Stroke, StrokeKind};

const BACKGROUND: Color32 = Color32::from_rgb(24, 26, 30);
const CONNECTOR: Color32 = Color32::from_rgb(110, 116, 128);
const CARD: Color32 = Color32::from_rgb(58, 64, 76);
const ROOT_CARD: Color32 = Color32::from_rgb(92, 74, 140);
const HIGHLIGHT: Color32 = Color32::from_rgb(255, 196, 64);
const LABEL: Color32 = Color32::from_rgb(230, 232, 236);
const CHIP: Color32 = Color32::from_rgb(70, 130, 180);

/// Labels below this on-screen height are skipped
const MIN_LABEL_PX: f32 = 10.0;

/// Canvas placement of the engine's screen space
#[derive(Debug, Clone, Copy)]
pub struct CanvasMapping {
    pub origin: Pos2,
    pub transform: Transform,
}

impl CanvasMapping {
    pub fn to_pos(&self, world: Point) -> Pos2 {
        let s = self.transform.world_to_screen(world);
        Pos2::new(self.origin.x + s.x, self.origin.y + s.y)
    }

    pub fn to_rect(&self, world: Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.to_pos(Point::new(world.min_x, world.min_y)),
            self.to_pos(Point::new(world.max_x, world.max_y)),
        )
    }

    /// Screen-space engine rect to canvas rect
    pub fn screen_rect(&self, screen: Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            Pos2::new(self.origin.x + screen.min_x, self.origin.y + screen.min_y),
            Pos2::new(self.origin.x + screen.max_x, self.origin.y + screen.max_y),
        )
    }
}

/// Photo swatch color for an image state
///
/// Brighter means a larger bucket, so swaps are visible in the demo.
pub fn image_color(display: ImageDisplay) -> Color32 {
    match display {
        ImageDisplay::Placeholder => Color32::from_gray(90),
        ImageDisplay::Loading => Color32::from_gray(60),
        ImageDisplay::Ready { bucket } | ImageDisplay::Swapping { shown: bucket, .. } => {
            let level = (bucket.min(1024) as f32 / 1024.0 * 160.0) as u8;
            Color32::from_rgb(40, 80 + level / 2, 60 + level)
        }
        ImageDisplay::Failed => Color32::from_rgb(150, 50, 50),
    }
}

/// Paint one frame into `painter`, whose clip rect is the canvas
pub fn paint_frame(painter: &Painter, origin: Pos2, frame: &FrameOutput, engine: &TreeEngine) {
    painter.rect_filled(painter.clip_rect(), 0.0, BACKGROUND);

    let map = CanvasMapping {
        origin,
        transform: frame.transform,
    };
    let scale = frame.transform.scale;
    let line = Stroke::new((1.5 * scale).clamp(0.5, 2.0), CONNECTOR);
    for segment in frame.connectors.iter() {
        painter.line_segment([map.to_pos(segment.start), map.to_pos(segment.end)], line);
    }

    let aggregated = frame.tier == DetailTier::Aggregated;
    if aggregated && engine.settings().aggregation_enabled {
        for chip in frame.chips.iter() {
            let rect = map.screen_rect(chip_rect(chip, &frame.transform, &engine.config().hit_test));
            let color = if chip.is_root { ROOT_CARD } else { CHIP };
            painter.circle_filled(rect.center(), rect.width() / 2.0, color);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                chip.subtree_size.to_string(),
                FontId::proportional(12.0),
                LABEL,
            );
            if frame.highlight == Some(chip.node_id) {
                painter.circle_stroke(rect.center(), rect.width() / 2.0 + 2.0, Stroke::new(2.0, HIGHLIGHT));
            }
        }
        return;
    }

    for &id in frame.visible.iter() {
        if let Some(node) = engine.node(id) {
            paint_node(painter, &map, node, frame, engine);
        }
    }
}

fn paint_node(painter: &Painter, map: &CanvasMapping, node: &Node, frame: &FrameOutput, engine: &TreeEngine) {
    let settings = engine.settings();
    let metrics = &engine.config().metrics;
    let photos = frame.tier.draws_photos(settings.show_photos);
    let size = card_size(node, photos, metrics);
    let rect = map.to_rect(Rect::from_center(node.position, size));
    let fill = if node.is_root() { ROOT_CARD } else { CARD };
    let rounding = (6.0 * frame.transform.scale).min(8.0);
    painter.rect_filled(rect, rounding, fill);

    if frame.highlight == Some(node.id) {
        painter.rect_stroke(rect, rounding, Stroke::new(2.0, HIGHLIGHT), StrokeKind::Outside);
    }

    match frame.tier {
        DetailTier::Full => {
            if node.shows_image(photos) {
                let photo = photo_rect(rect);
                painter.rect_filled(photo, rounding / 2.0, image_color(engine.image_display(node.id)));
            }
            paint_label(painter, rect, &node.label, 13.0 * frame.transform.scale);
        }
        DetailTier::Compact => paint_label(painter, rect, &node.label, 11.0),
        DetailTier::Aggregated => {}
    }
}

/// Square photo swatch in the upper part of a card, leaving room for the label
fn photo_rect(card: egui::Rect) -> egui::Rect {
    let edge = (card.height() * 0.6).min(card.width() * 0.8);
    let top = card.top() + card.height() * 0.08;
    egui::Rect::from_min_size(Pos2::new(card.center().x - edge / 2.0, top), egui::vec2(edge, edge))
}

fn paint_label(painter: &Painter, card: egui::Rect, label: &str, size: f32) {
    if size < MIN_LABEL_PX || label.is_empty() {
        return;
    }
    painter.text(
        Pos2::new(card.center().x, card.bottom() - size),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(size.min(18.0)),
        LABEL,
    );
}

/// Engine statistics in the top-left corner
pub fn paint_debug_overlay(painter: &Painter, origin: Pos2, frame: &FrameOutput, engine: &TreeEngine) {
    let grid = engine.index().diagnostics();
    let lines = [
        format!(
            "tier {} | scale {:.3} | writer {:?}",
            frame.tier.display_name(),
            frame.transform.scale,
            engine.transform_state().writer()
        ),
        format!(
            "visible {} / {} | segments {} | chips {}",
            frame.visible.len(),
            engine.index().len(),
            frame.connectors.len(),
            frame.chips.len()
        ),
        format!(
            "grid {} / {} cells | max {} | avg {:.1}",
            grid.occupied_cells, grid.total_cells, grid.max_per_cell, grid.avg_per_cell
        ),
        format!(
            "bounds ({:.0}, {:.0}) - ({:.0}, {:.0})",
            frame.bounds.min_x, frame.bounds.min_y, frame.bounds.max_x, frame.bounds.max_y
        ),
    ];
    for (i, line) in lines.iter().enumerate() {
        painter.text(
            Pos2::new(origin.x + 8.0, origin.y + 8.0 + i as f32 * 16.0),
            Align2::LEFT_TOP,
            line,
            FontId::monospace(12.0),
            Color32::LIGHT_GREEN,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_offsets_by_origin() {
        let map = CanvasMapping {
            origin: Pos2::new(100.0, 50.0),
            transform: Transform::new(10.0, 20.0, 2.0),
        };
        assert_eq!(map.to_pos(Point::new(5.0, 5.0)), Pos2::new(120.0, 80.0));
        let rect = map.to_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(rect.width(), 20.0);
    }

    #[test]
    fn test_photo_fits_inside_card() {
        // Default photo card is 120 x 75
        for scale in [0.5, 1.0, 3.0] {
            let card = egui::Rect::from_min_size(Pos2::new(10.0, 20.0), egui::vec2(120.0 * scale, 75.0 * scale));
            let photo = photo_rect(card);
            assert!(card.contains_rect(photo));
            assert!((photo.width() - photo.height()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_larger_buckets_are_brighter() {
        let small = image_color(ImageDisplay::Ready { bucket: 128 });
        let large = image_color(ImageDisplay::Ready { bucket: 1024 });
        assert!(large.b() > small.b());
        assert_eq!(
            image_color(ImageDisplay::Swapping { shown: 128, loading: 512 }),
            small
        );
    }
}
