//! Renderer: draws the normalized objects of the current payload.
//!
//! Every redraw clears the canvas and draws the full layer stack in
//! zoomed content pixels (original coordinates times zoom). Which part of
//! that surface is visible is the canvas backend's concern.

mod canvas;
mod labels;
mod svg;
mod text;
mod vector;

pub use canvas::{Canvas, DrawCommand, DrawList, Stroke, TextAlign, TextStyle};
pub use labels::{LabelPlacer, Placement};
pub use svg::SvgCanvas;
pub use text::TextMetrics;

use crate::color::Color;
use crate::config::{DisplayConfig, StyleConfig};
use crate::constants::{
    ALERT_COLOR, DETAIL_REGION_COLOR, FILL_OPACITY, JUNCTION_COLOR, KEYPOINT_COLOR,
    LABEL_FALLBACK_SHIFT, LABEL_GAP, OCR_MARKER_COLOR, SIZE_REGION_COLOR,
};
use crate::geometry::{bbox_from_points, scale_points, BoundingBox, Point};
use crate::layers::LayerRegistry;
use crate::model::{Junction, NormalizedObject, ObjectKind};
use crate::payload::Size;

/// Width of OCR region borders and dashed outlines, unzoomed.
const THIN_LINE: f32 = 2.0;

/// Width of the white outline behind centered text, unzoomed.
const TEXT_OUTLINE: f32 = 3.0;

/// Which drawing of the scene the viewer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Filled shapes, labels and keypoints over the base image
    #[default]
    Annotated,
    /// Outlines on a dark grid, y-up, without the base image
    Vector,
}

/// What one redraw draws from.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub objects: &'a [NormalizedObject],
    pub layers: &'a LayerRegistry,
    pub junctions: &'a [Junction],
}

/// Counters from one redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub objects: usize,
    pub labels: usize,
    pub label_fallbacks: usize,
    pub hidden_unresolved: usize,
    pub junctions: usize,
}

/// Draws a [`Scene`] onto a [`Canvas`].
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub style: StyleConfig,
    pub display: DisplayConfig,
}

impl Renderer {
    pub fn new(style: StyleConfig, display: DisplayConfig) -> Self {
        Self { style, display }
    }

    /// Clear `canvas` and draw everything visible at `zoom`.
    ///
    /// `surface` is the zoomed content size.
    pub fn render(&self, scene: &Scene<'_>, zoom: f32, surface: Size, canvas: &mut dyn Canvas) -> RenderStats {
        canvas.clear(surface.width, surface.height);

        let mut stats = RenderStats::default();
        let mut placer = LabelPlacer::new(LABEL_GAP * zoom, LABEL_FALLBACK_SHIFT * zoom);

        for index in scene.layers.visible_objects() {
            let Some(object) = scene.objects.get(index) else {
                continue;
            };
            if let Some(area) = object.crop_index {
                if !scene.layers.is_dimension_visible(area) {
                    continue;
                }
            }
            if !object.resolved && self.display.hide_unresolved {
                stats.hidden_unresolved += 1;
                continue;
            }

            self.draw_object(object, zoom, canvas, &mut placer, &mut stats);
            stats.objects += 1;
        }

        if self.display.show_keypoints {
            for junction in scene.junctions {
                self.draw_junction(junction, zoom, canvas);
                stats.junctions += 1;
            }
        }

        stats.label_fallbacks = placer.fallback_count();
        log::debug!(
            "Redraw at zoom {:.3}: {} objects, {} labels ({} fallback), {} junctions",
            zoom,
            stats.objects,
            stats.labels,
            stats.label_fallbacks,
            stats.junctions
        );
        stats
    }

    fn draw_object(
        &self,
        object: &NormalizedObject,
        zoom: f32,
        canvas: &mut dyn Canvas,
        placer: &mut LabelPlacer,
        stats: &mut RenderStats,
    ) {
        let points = scale_points(&object.points, zoom);
        let bbox = bbox_from_points(&points);
        let color = object.color;
        let border = Stroke::solid(color, self.style.border_width * zoom);

        match (object.kind, bbox) {
            (_, None) => {}
            (ObjectKind::Polygon, Some(_)) => {
                canvas.fill_path(&points, color.with_alpha(FILL_OPACITY));
                canvas.stroke_path(&points, border);
                self.draw_keypoints(&points, zoom, canvas);
            }
            (ObjectKind::Box | ObjectKind::Symbol, Some(rect)) => {
                canvas.fill_rect(rect, color.with_alpha(FILL_OPACITY));
                canvas.stroke_rect(rect, border);
                self.draw_keypoints(&rect.corners(), zoom, canvas);
            }
            (ObjectKind::OcrText, Some(_)) => {
                let text = object.text.as_deref().unwrap_or(&object.label);
                self.draw_text_region(&points, text, OCR_MARKER_COLOR, zoom, canvas);
            }
        }

        if let Some(derived) = &object.derived_box {
            self.draw_dashed(&scale_points(derived, zoom), zoom, canvas);
        }

        if let Some(area) = &object.dimension_area {
            let area = scale_points(area, zoom);
            self.draw_dashed(&area, zoom, canvas);
            if let (Some(rect), Some(idx), true) =
                (bbox_from_points(&area), object.crop_index, self.display.show_labels)
            {
                let style = TextStyle {
                    size: self.style.ocr_font_size * zoom,
                    color: ALERT_COLOR,
                    align: TextAlign::Start,
                    outline: None,
                };
                let at = Point::new(rect.xmin, rect.ymin - style.size / 2.0 - LABEL_GAP * zoom);
                canvas.draw_text(&format!("[{}]", idx), at, style);
            }
        }

        for (region, region_color) in [
            (&object.size_region, SIZE_REGION_COLOR),
            (&object.detail_region, DETAIL_REGION_COLOR),
        ] {
            if let Some(region) = region {
                let points = scale_points(&region.points, zoom);
                self.draw_text_region(&points, &region.text, region_color, zoom, canvas);
            }
        }

        if let (Some(shape), true) = (bbox, self.display.show_labels) {
            if !object.label.is_empty() {
                self.draw_label(&object.label, shape, color, zoom, canvas, placer);
                stats.labels += 1;
            }
        }
    }

    /// Filled tag in the class color with white text.
    fn draw_label(
        &self,
        label: &str,
        shape: BoundingBox,
        color: Color,
        zoom: f32,
        canvas: &mut dyn Canvas,
        placer: &mut LabelPlacer,
    ) {
        let font = self.style.label_font_size * zoom;
        let padding = self.style.label_padding * zoom;
        let (text_width, _) = canvas.measure_text(label, font);
        let width = text_width + 2.0 * padding;
        let height = self.style.label_height * zoom;

        let (rect, _) = placer.place(shape, width, height);
        canvas.fill_rect(rect, color);
        canvas.draw_text(
            label,
            Point::new(rect.xmin + padding, rect.ymin + height / 2.0),
            TextStyle {
                size: font,
                color: Color::WHITE,
                align: TextAlign::Start,
                outline: None,
            },
        );
    }

    /// OCR region: translucent fill, thin border, centered outlined text.
    fn draw_text_region(
        &self,
        points: &[Point],
        text: &str,
        color: Color,
        zoom: f32,
        canvas: &mut dyn Canvas,
    ) {
        let Some(rect) = bbox_from_points(points) else {
            return;
        };
        canvas.fill_path(points, color.with_alpha(FILL_OPACITY));
        canvas.stroke_path(points, Stroke::solid(color, THIN_LINE * zoom));

        if self.display.show_labels && !text.is_empty() {
            let center = Point::new(
                (rect.xmin + rect.xmax) / 2.0,
                (rect.ymin + rect.ymax) / 2.0,
            );
            canvas.draw_text(
                text,
                center,
                TextStyle {
                    size: self.style.ocr_font_size * zoom,
                    color,
                    align: TextAlign::Center,
                    outline: Some(Stroke::solid(Color::WHITE, TEXT_OUTLINE * zoom)),
                },
            );
        }
    }

    /// Unfilled dashed outline in the alert color.
    fn draw_dashed(&self, points: &[Point], zoom: f32, canvas: &mut dyn Canvas) {
        let stroke = Stroke::dashed(ALERT_COLOR, THIN_LINE * zoom, self.style.dash_length * zoom);
        match points.len() {
            0 => {}
            // two corners describe a box
            1 | 2 => {
                if let Some(rect) = bbox_from_points(points) {
                    canvas.stroke_rect(rect, stroke);
                }
            }
            _ => canvas.stroke_path(points, stroke),
        }
    }

    fn draw_keypoints(&self, points: &[Point], zoom: f32, canvas: &mut dyn Canvas) {
        if !self.display.show_keypoints {
            return;
        }
        let radius = self.style.keypoint_radius * zoom;
        for &p in points {
            canvas.fill_circle(p, radius, KEYPOINT_COLOR);
        }
    }

    fn draw_junction(&self, junction: &Junction, zoom: f32, canvas: &mut dyn Canvas) {
        let center = junction.center.scaled(zoom);
        let radius = self.style.keypoint_radius * zoom;
        canvas.fill_circle(center, radius, JUNCTION_COLOR);
        if !junction.kind.is_empty() {
            canvas.draw_text(
                &junction.kind,
                Point::new(center.x + radius * 2.0, center.y),
                TextStyle {
                    size: self.style.ocr_font_size * zoom,
                    color: JUNCTION_COLOR,
                    align: TextAlign::Start,
                    outline: None,
                },
            );
        }
    }
}
