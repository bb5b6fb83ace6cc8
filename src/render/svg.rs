//! SVG canvas: renders the overlay as a vector document.
//!
//! The document is sized to the viewer and its `viewBox` selects the scrolled
//! window of the zoomed content, so rasterizing it yields exactly the visible
//! part of the overlay.

use std::fmt::Write as _;

use crate::color::Color;
use crate::geometry::{BoundingBox, Point};

use super::canvas::{Canvas, Stroke, TextAlign, TextStyle};

const FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";

/// Canvas producing an SVG document.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    viewer_width: f32,
    viewer_height: f32,
    scroll_x: f32,
    scroll_y: f32,
    body: String,
}

impl SvgCanvas {
    /// A canvas showing the `viewer_width`×`viewer_height` window at the
    /// given scroll offset.
    pub fn new(viewer_width: f32, viewer_height: f32, scroll_x: f32, scroll_y: f32) -> Self {
        Self {
            viewer_width,
            viewer_height,
            scroll_x,
            scroll_y,
            body: String::new(),
        }
    }

    /// The finished document.
    pub fn finish(&self) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" "#,
                r#"viewBox="{x} {y} {w} {h}">"#,
                "\n{body}</svg>\n"
            ),
            w = num(self.viewer_width),
            h = num(self.viewer_height),
            x = num(self.scroll_x),
            y = num(self.scroll_y),
            body = self.body
        )
    }

    fn element(&mut self, element: std::fmt::Arguments<'_>) {
        // writing into a String cannot fail
        let _ = self.body.write_fmt(element);
        self.body.push('\n');
    }
}

impl Canvas for SvgCanvas {
    fn clear(&mut self, _width: f32, _height: f32) {
        self.body.clear();
    }

    fn fill_path(&mut self, points: &[Point], color: Color) {
        if points.is_empty() {
            return;
        }
        self.element(format_args!(
            r#"<polygon points="{}" {}/>"#,
            point_list(points),
            fill(color)
        ));
    }

    fn stroke_path(&mut self, points: &[Point], stroke: Stroke) {
        if points.is_empty() {
            return;
        }
        self.element(format_args!(
            r#"<polygon points="{}" fill="none" {}/>"#,
            point_list(points),
            stroke_attrs(stroke)
        ));
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.element(format_args!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
            stroke_attrs(stroke)
        ));
    }

    fn fill_rect(&mut self, rect: BoundingBox, color: Color) {
        self.element(format_args!(
            r#"<rect {} {}/>"#,
            rect_attrs(rect),
            fill(color)
        ));
    }

    fn stroke_rect(&mut self, rect: BoundingBox, stroke: Stroke) {
        self.element(format_args!(
            r#"<rect {} fill="none" {}/>"#,
            rect_attrs(rect),
            stroke_attrs(stroke)
        ));
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.element(format_args!(
            r#"<circle cx="{}" cy="{}" r="{}" {}/>"#,
            num(center.x),
            num(center.y),
            num(radius),
            fill(color)
        ));
    }

    fn draw_text(&mut self, text: &str, at: Point, style: TextStyle) {
        let anchor = match style.align {
            TextAlign::Start => "start",
            TextAlign::Center => "middle",
        };
        let common = format!(
            r#"x="{}" y="{}" font-family="{}" font-weight="bold" font-size="{}" text-anchor="{}" dominant-baseline="central""#,
            num(at.x),
            num(at.y),
            FONT_FAMILY,
            num(style.size),
            anchor
        );
        let text = escape(text);

        if let Some(outline) = style.outline {
            self.element(format_args!(
                r#"<text {} fill="none" stroke-linejoin="round" {}>{}</text>"#,
                common,
                stroke_attrs(outline),
                text
            ));
        }
        self.element(format_args!(
            r#"<text {} {}>{}</text>"#,
            common,
            fill(style.color),
            text
        ));
    }
}

/// Compact number formatting: at most two decimals, no trailing zeros.
fn num(v: f32) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn point_list(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn rect_attrs(rect: BoundingBox) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}""#,
        num(rect.xmin),
        num(rect.ymin),
        num(rect.width()),
        num(rect.height())
    )
}

fn fill(color: Color) -> String {
    if color.a >= 1.0 {
        format!(r#"fill="{}""#, color.to_hex())
    } else {
        format!(r#"fill="{}" fill-opacity="{}""#, color.to_hex(), num(color.a))
    }
}

fn stroke_attrs(stroke: Stroke) -> String {
    let mut out = format!(
        r#"stroke="{}" stroke-width="{}""#,
        stroke.color.to_hex(),
        num(stroke.width)
    );
    if stroke.color.a < 1.0 {
        let _ = write!(out, r#" stroke-opacity="{}""#, num(stroke.color.a));
    }
    if let Some(dash) = stroke.dash {
        let _ = write!(out, r#" stroke-dasharray="{d} {d}""#, d = num(dash));
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_uses_scroll_as_view_box() {
        let canvas = SvgCanvas::new(800.0, 600.0, 120.5, 40.0);
        let svg = canvas.finish();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="800" height="600""#));
        assert!(svg.contains(r#"viewBox="120.5 40 800 600""#));
    }

    #[test]
    fn test_shapes() {
        let mut canvas = SvgCanvas::new(100.0, 100.0, 0.0, 0.0);
        canvas.fill_path(
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            Color::RED.with_alpha(0.25),
        );
        canvas.stroke_rect(
            BoundingBox::new(1.0, 2.0, 11.0, 7.0),
            Stroke::dashed(Color::RED, 2.0, 5.0),
        );
        canvas.fill_circle(Point::new(3.0, 4.0), 5.0, Color::BLUE);
        canvas.stroke_line(
            Point::new(0.0, 90.0),
            Point::new(60.0, 90.0),
            Stroke::solid(Color::WHITE, 1.0),
        );
        let svg = canvas.finish();

        assert!(svg.contains(
            r##"<polygon points="0,0 10,0 10,10" fill="#ff0000" fill-opacity="0.25"/>"##
        ));
        assert!(svg.contains(r#"x="1" y="2" width="10" height="5" fill="none""#));
        assert!(svg.contains(r#"stroke-dasharray="5 5""#));
        assert!(svg.contains(r##"<circle cx="3" cy="4" r="5" fill="#0000ff"/>"##));
        assert!(svg.contains(
            r##"<line x1="0" y1="90" x2="60" y2="90" stroke="#ffffff" stroke-width="1"/>"##
        ));
    }

    #[test]
    fn test_outlined_text_draws_outline_first() {
        let mut canvas = SvgCanvas::new(100.0, 100.0, 0.0, 0.0);
        canvas.draw_text(
            "A<B",
            Point::new(5.0, 5.0),
            TextStyle {
                size: 16.0,
                color: Color::BLUE,
                align: TextAlign::Center,
                outline: Some(Stroke::solid(Color::WHITE, 3.0)),
            },
        );
        let svg = canvas.finish();

        let outline = svg.find(r##"stroke="#ffffff""##).unwrap();
        let fill = svg.find(r##"fill="#0000ff""##).unwrap();
        assert!(outline < fill);
        assert!(svg.contains("A&lt;B"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn test_clear_discards_elements() {
        let mut canvas = SvgCanvas::new(10.0, 10.0, 0.0, 0.0);
        canvas.fill_rect(BoundingBox::new(0.0, 0.0, 1.0, 1.0), Color::RED);
        canvas.clear(10.0, 10.0);
        assert!(!canvas.finish().contains("<rect"));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(3.0), "3");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(0.126), "0.13");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(100.0), "100");
    }
}
