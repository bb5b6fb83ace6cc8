//! Vector view: the CAD-style drawing of object outlines.
//!
//! Dark background, a zoom-scaled grid and a y-up coordinate system with its
//! origin at the bottom-left of the content. Objects are outlines with their
//! vertices marked; nothing is filled or labeled.

use crate::color::Color;
use crate::constants::{
    VECTOR_ARROW_HALF_WIDTH, VECTOR_ARROW_LENGTH, VECTOR_AXIS_LENGTH, VECTOR_AXIS_MARGIN,
    VECTOR_BACKGROUND, VECTOR_GRID_COLOR, VECTOR_GRID_SPACING,
};
use crate::geometry::{BoundingBox, Point};
use crate::payload::Size;

use super::canvas::{Canvas, Stroke};
use super::{RenderStats, Renderer, Scene};

const GRID_LINE: f32 = 0.5;
const AXIS_LINE: f32 = 1.0;
const MIN_OUTLINE: f32 = 0.5;
const MIN_VERTEX_RADIUS: f32 = 1.5;

impl Renderer {
    /// Clear `canvas` and draw the vector view of everything visible at `zoom`.
    ///
    /// `surface` is the zoomed content size; its bottom-left corner is the
    /// origin of the y-up drawing.
    pub fn render_vector(
        &self,
        scene: &Scene<'_>,
        zoom: f32,
        surface: Size,
        canvas: &mut dyn Canvas,
    ) -> RenderStats {
        canvas.clear(surface.width, surface.height);
        canvas.fill_rect(
            BoundingBox::new(0.0, 0.0, surface.width, surface.height),
            VECTOR_BACKGROUND,
        );
        draw_grid(surface, VECTOR_GRID_SPACING * zoom, canvas);
        draw_axes(surface, canvas);

        // original space is y-down; flip about the content height
        let flip = |p: &Point| Point::new(p.x * zoom, surface.height - p.y * zoom);
        let outline = (AXIS_LINE * zoom).max(MIN_OUTLINE);
        let radius = (2.0 * zoom).max(MIN_VERTEX_RADIUS);

        let mut stats = RenderStats::default();
        for index in scene.layers.visible_objects() {
            let Some(object) = scene.objects.get(index) else {
                continue;
            };
            if object.points.is_empty() {
                continue;
            }
            if let Some(area) = object.crop_index {
                if !scene.layers.is_dimension_visible(area) {
                    continue;
                }
            }
            if !object.resolved && self.display.hide_unresolved {
                stats.hidden_unresolved += 1;
                continue;
            }

            let color = object.color.with_alpha(1.0);
            let points: Vec<Point> = object.points.iter().map(flip).collect();
            canvas.stroke_path(&points, Stroke::solid(color, outline));
            for &p in &points {
                canvas.fill_circle(p, radius, color);
            }
            stats.objects += 1;
        }

        log::debug!(
            "Vector redraw at zoom {:.3}: {} objects",
            zoom,
            stats.objects
        );
        stats
    }
}

fn draw_grid(surface: Size, spacing: f32, canvas: &mut dyn Canvas) {
    if spacing <= 0.0 || !spacing.is_finite() {
        return;
    }
    let stroke = Stroke::solid(VECTOR_GRID_COLOR, GRID_LINE);

    let mut x = 0.0;
    while x < surface.width {
        canvas.stroke_line(Point::new(x, 0.0), Point::new(x, surface.height), stroke);
        x += spacing;
    }
    // rows count up from the bottom edge
    let mut y = 0.0;
    while y < surface.height {
        let row = surface.height - y;
        canvas.stroke_line(Point::new(0.0, row), Point::new(surface.width, row), stroke);
        y += spacing;
    }
}

/// X to the right and Y upwards, with arrowheads, near the bottom-left corner.
fn draw_axes(surface: Size, canvas: &mut dyn Canvas) {
    let stroke = Stroke::solid(Color::WHITE, AXIS_LINE);
    let origin = Point::new(VECTOR_AXIS_MARGIN, surface.height - VECTOR_AXIS_MARGIN);

    let x_tip = Point::new(origin.x + VECTOR_AXIS_LENGTH, origin.y);
    canvas.stroke_line(origin, x_tip, stroke);
    for side in [-1.0, 1.0] {
        let barb = Point::new(
            x_tip.x - VECTOR_ARROW_LENGTH,
            x_tip.y + side * VECTOR_ARROW_HALF_WIDTH,
        );
        canvas.stroke_line(x_tip, barb, stroke);
    }

    let y_tip = Point::new(origin.x, origin.y - VECTOR_AXIS_LENGTH);
    canvas.stroke_line(origin, y_tip, stroke);
    for side in [-1.0, 1.0] {
        let barb = Point::new(
            y_tip.x + side * VECTOR_ARROW_HALF_WIDTH,
            y_tip.y + VECTOR_ARROW_LENGTH,
        );
        canvas.stroke_line(y_tip, barb, stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorConfig, ColorScheme, DisplayConfig, StyleConfig};
    use crate::layers::{LayerRegistry, Palette};
    use crate::model::{NormalizedObject, ObjectKind};
    use crate::render::{DrawCommand, DrawList};

    fn triangle() -> NormalizedObject {
        NormalizedObject::new(
            "wall",
            ObjectKind::Polygon,
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 50.0),
            ],
        )
        .with_label("wall")
    }

    fn render(objects: &mut [NormalizedObject], zoom: f32, surface: Size) -> (DrawList, RenderStats) {
        let mut palette = Palette::new(&ColorConfig {
            scheme: ColorScheme::Hashed,
            seed: None,
        });
        let layers = LayerRegistry::build(objects, &mut palette);
        let scene = Scene {
            objects,
            layers: &layers,
            junctions: &[],
        };
        let mut list = DrawList::new();
        let stats = Renderer::new(StyleConfig::default(), DisplayConfig::default())
            .render_vector(&scene, zoom, surface, &mut list);
        (list, stats)
    }

    fn is_line(c: &DrawCommand) -> bool {
        matches!(c, DrawCommand::StrokeLine { .. })
    }

    #[test]
    fn test_dark_background_first() {
        let (list, _) = render(&mut [], 1.0, Size::new(200.0, 100.0));

        assert!(matches!(list.commands[0], DrawCommand::Clear { .. }));
        assert_eq!(
            list.commands[1],
            DrawCommand::FillRect {
                rect: BoundingBox::new(0.0, 0.0, 200.0, 100.0),
                color: VECTOR_BACKGROUND,
            }
        );
    }

    #[test]
    fn test_grid_spacing_follows_zoom() {
        // 200x100 at zoom 1: columns 0,50,100,150 and rows 0,50; plus 6 axis strokes
        let (list, _) = render(&mut [], 1.0, Size::new(200.0, 100.0));
        assert_eq!(list.count(is_line), 4 + 2 + 6);

        // zoom 2 on the same surface: columns 0,100 and row 0
        let (list, _) = render(&mut [], 2.0, Size::new(200.0, 100.0));
        assert_eq!(list.count(is_line), 2 + 1 + 6);
    }

    #[test]
    fn test_axes_start_bottom_left() {
        let (list, _) = render(&mut [], 1.0, Size::new(200.0, 100.0));
        let white: Vec<(Point, Point)> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeLine { from, to, stroke } if stroke.color == Color::WHITE => {
                    Some((*from, *to))
                }
                _ => None,
            })
            .collect();

        assert_eq!(white.len(), 6);
        assert_eq!(white[0], (Point::new(10.0, 90.0), Point::new(70.0, 90.0)));
        assert_eq!(white[3], (Point::new(10.0, 90.0), Point::new(10.0, 30.0)));
    }

    #[test]
    fn test_outline_is_flipped_with_vertex_dots_and_no_labels() {
        let mut objects = vec![triangle()];
        let (list, stats) = render(&mut objects, 2.0, Size::new(200.0, 100.0));

        assert_eq!(stats.objects, 1);
        assert_eq!(stats.labels, 0);
        assert!(list.texts().is_empty());

        let outline = list
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::StrokePath { points, stroke } => Some((points.clone(), *stroke)),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            outline.0,
            vec![
                Point::new(0.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(200.0, 0.0)
            ]
        );
        assert_eq!(outline.1.width, 2.0);
        assert_eq!(list.count(|c| matches!(c, DrawCommand::FillCircle { radius, .. } if *radius == 4.0)), 3);
        assert_eq!(list.count(|c| matches!(c, DrawCommand::FillPath { .. })), 0);
    }

    #[test]
    fn test_line_width_and_dots_have_a_floor() {
        let mut objects = vec![triangle()];
        let (list, _) = render(&mut objects, 0.1, Size::new(10.0, 5.0));

        assert!(list.count(|c| matches!(
            c,
            DrawCommand::StrokePath { stroke, .. } if stroke.width == MIN_OUTLINE
        )) == 1);
        assert_eq!(
            list.count(|c| matches!(c, DrawCommand::FillCircle { radius, .. } if *radius == MIN_VERTEX_RADIUS)),
            3
        );
    }

    #[test]
    fn test_hidden_class_is_skipped() {
        let mut objects = vec![triangle()];
        let mut palette = Palette::new(&ColorConfig::default());
        let mut layers = LayerRegistry::build(&mut objects, &mut palette);
        layers.set_class_visible("wall", false);
        let scene = Scene {
            objects: &objects,
            layers: &layers,
            junctions: &[],
        };
        let mut list = DrawList::new();
        let stats = Renderer::new(StyleConfig::default(), DisplayConfig::default()).render_vector(
            &scene,
            1.0,
            Size::new(100.0, 100.0),
            &mut list,
        );

        assert_eq!(stats.objects, 0);
        assert_eq!(list.count(|c| matches!(c, DrawCommand::StrokePath { .. })), 0);
    }
}
