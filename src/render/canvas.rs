//! Drawing surface abstraction and a recording implementation.

use crate::color::Color;
use crate::geometry::{BoundingBox, Point};

use super::text::TextMetrics;

/// Stroke parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// Dash and gap length; `None` for a solid line.
    pub dash: Option<f32>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, dash: f32) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }
}

/// Horizontal text alignment relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Center,
}

/// Text parameters. Text is vertically centered on the anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    /// Outline drawn beneath the fill
    pub outline: Option<Stroke>,
}

/// A drawing surface in zoomed content pixels.
///
/// The renderer talks only to this trait; backends decide how the result is
/// stored or shown.
pub trait Canvas {
    /// Discard everything and start a surface of the given size.
    fn clear(&mut self, width: f32, height: f32);

    /// Fill a closed path.
    fn fill_path(&mut self, points: &[Point], color: Color);

    /// Stroke a closed path.
    fn stroke_path(&mut self, points: &[Point], stroke: Stroke);

    /// Stroke a single open segment.
    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke);

    fn fill_rect(&mut self, rect: BoundingBox, color: Color);

    fn stroke_rect(&mut self, rect: BoundingBox, stroke: Stroke);

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    fn draw_text(&mut self, text: &str, at: Point, style: TextStyle);

    /// Rendered `(width, height)` of `text` at `size`.
    fn measure_text(&self, text: &str, size: f32) -> (f32, f32) {
        TextMetrics::new(size).measure(text)
    }
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f32,
        height: f32,
    },
    FillPath {
        points: Vec<Point>,
        color: Color,
    },
    StrokePath {
        points: Vec<Point>,
        stroke: Stroke,
    },
    StrokeLine {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    FillRect {
        rect: BoundingBox,
        color: Color,
    },
    StrokeRect {
        rect: BoundingBox,
        stroke: Stroke,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
    },
    DrawText {
        text: String,
        position: Point,
        style: TextStyle,
    },
}

/// Canvas that records commands, for tests and for replaying elsewhere.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// All text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Canvas for DrawList {
    fn clear(&mut self, width: f32, height: f32) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_path(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::FillPath {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_path(&mut self, points: &[Point], stroke: Stroke) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            stroke,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeLine { from, to, stroke });
    }

    fn fill_rect(&mut self, rect: BoundingBox, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: BoundingBox, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeRect { rect, stroke });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, at: Point, style: TextStyle) {
        self.commands.push(DrawCommand::DrawText {
            text: text.to_string(),
            position: at,
            style,
        });
    }
}
