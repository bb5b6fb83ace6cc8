//! Viewport state: zoom level and scroll offset over the original image.
//!
//! Scroll offsets are in zoomed content pixels, the way a scroll container
//! works: the visible region starts at `scroll / zoom` in original space.
//! Offsets are clamped to `[0, content * zoom - viewer]` on every change.

use crate::constants::{
    AT_FIT_TOLERANCE, BUTTON_ZOOM_IN, BUTTON_ZOOM_OUT, MAX_ZOOM, MIN_FIT_ZOOM, TOGGLE_ZOOM,
    WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_EPSILON,
};
use crate::geometry::{BoundingBox, Point};
use crate::payload::Size;

/// Whether content dimensions are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    /// No content; every zoom and pan operation is a no-op.
    Unloaded,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start: Point,
    scroll_x: f32,
    scroll_y: f32,
}

/// Zoom and scroll over content of a known size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    viewer: Size,
    content: Option<Size>,
    zoom: f32,
    fit_zoom: f32,
    scroll_x: f32,
    scroll_y: f32,
    drag: Option<Drag>,
}

impl Viewport {
    pub fn new(viewer_width: f32, viewer_height: f32) -> Self {
        Self {
            viewer: Size::new(viewer_width, viewer_height),
            content: None,
            zoom: 1.0,
            fit_zoom: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            drag: None,
        }
    }

    pub fn state(&self) -> ViewportState {
        match self.content {
            Some(_) => ViewportState::Loaded,
            None => ViewportState::Unloaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Smallest zoom; the whole content fits the viewer at this level.
    pub fn fit_zoom(&self) -> f32 {
        self.fit_zoom
    }

    pub fn scroll(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn viewer_size(&self) -> Size {
        self.viewer
    }

    pub fn content_size(&self) -> Option<Size> {
        self.content
    }

    /// Content size at the current zoom.
    pub fn display_size(&self) -> Option<Size> {
        self.content
            .map(|c| Size::new(c.width * self.zoom, c.height * self.zoom))
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Back to the unloaded state, e.g. while a new image decodes.
    pub fn reset(&mut self) {
        self.content = None;
        self.zoom = 1.0;
        self.fit_zoom = 1.0;
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
        self.drag = None;
    }

    /// Load content of the given size: zoom to fit and center.
    ///
    /// Zero or non-finite dimensions leave the viewport unloaded.
    pub fn load(&mut self, content_width: f32, content_height: f32) -> bool {
        self.reset();
        let content = Size::new(content_width, content_height);
        if !content.is_valid() || !content_width.is_finite() || !content_height.is_finite() {
            log::warn!(
                "Ignoring content of size {}x{}; viewport stays unloaded",
                content_width,
                content_height
            );
            return false;
        }
        self.content = Some(content);
        self.fit_to_screen();
        log::debug!(
            "Viewport loaded {}x{} at fit zoom {:.4}",
            content_width,
            content_height,
            self.zoom
        );
        true
    }

    /// Change the viewer surface size, keeping the zoom where possible.
    pub fn set_viewer_size(&mut self, width: f32, height: f32) {
        self.viewer = Size::new(width, height);
        if self.content.is_some() {
            self.fit_zoom = self.compute_fit_zoom();
            self.zoom = self.clamp_zoom(self.zoom);
            self.clamp_scroll();
        }
    }

    /// Zoom to fit and center the content.
    pub fn fit_to_screen(&mut self) {
        let Some(content) = self.content else {
            return;
        };
        self.fit_zoom = self.compute_fit_zoom();
        self.zoom = self.fit_zoom;
        self.scroll_x = ((content.width * self.zoom - self.viewer.width) / 2.0).max(0.0);
        self.scroll_y = ((content.height * self.zoom - self.viewer.height) / 2.0).max(0.0);
    }

    /// Fractional content position under a viewer-local pixel.
    pub fn fraction_at(&self, anchor: Point) -> Option<Point> {
        let content = self.content?;
        Some(Point::new(
            (anchor.x + self.scroll_x) / (content.width * self.zoom),
            (anchor.y + self.scroll_y) / (content.height * self.zoom),
        ))
    }

    /// Zoom to `requested` (clamped) keeping the content under `anchor` fixed.
    ///
    /// Returns whether anything changed.
    pub fn zoom_at(&mut self, requested: f32, anchor: Point) -> bool {
        let Some(content) = self.content else {
            return false;
        };
        if !requested.is_finite() {
            return false;
        }
        let new_zoom = self.clamp_zoom(requested);
        if (new_zoom - self.zoom).abs() < ZOOM_EPSILON {
            return false;
        }

        let Some(fraction) = self.fraction_at(anchor) else {
            return false;
        };
        self.zoom = new_zoom;
        self.scroll_x = fraction.x * content.width * new_zoom - anchor.x;
        self.scroll_y = fraction.y * content.height * new_zoom - anchor.y;
        self.clamp_scroll();

        log::debug!(
            "Zoom {:.4} at ({:.0}, {:.0}), scroll ({:.1}, {:.1})",
            self.zoom,
            anchor.x,
            anchor.y,
            self.scroll_x,
            self.scroll_y
        );
        true
    }

    /// One wheel notch; negative `delta_y` (wheel up) zooms in.
    pub fn wheel(&mut self, delta_y: f32, anchor: Point) -> bool {
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_IN
        } else if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            return false;
        };
        self.zoom_at(self.zoom * factor, anchor)
    }

    /// Zoom-in button, anchored at the viewer center.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at(self.zoom * BUTTON_ZOOM_IN, self.viewer_center())
    }

    /// Zoom-out button, anchored at the viewer center.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at(self.zoom * BUTTON_ZOOM_OUT, self.viewer_center())
    }

    /// Double-activation: fit ↔ fixed zoom, anchored at the activation point.
    pub fn toggle_zoom(&mut self, anchor: Point) -> bool {
        let target = if (self.zoom - self.fit_zoom).abs() < AT_FIT_TOLERANCE {
            TOGGLE_ZOOM.min(MAX_ZOOM)
        } else {
            self.fit_zoom
        };
        self.zoom_at(target, anchor)
    }

    /// Move the view by `(dx, dy)` zoomed pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        if self.content.is_none() || !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        let before = (self.scroll_x, self.scroll_y);
        self.scroll_x += dx;
        self.scroll_y += dy;
        self.clamp_scroll();
        before != (self.scroll_x, self.scroll_y)
    }

    /// Primary button pressed at `pointer`.
    pub fn begin_drag(&mut self, pointer: Point) {
        if self.content.is_none() {
            return;
        }
        self.drag = Some(Drag {
            start: pointer,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        });
    }

    /// Pointer moved. A move without the button held ends the drag.
    pub fn drag_to(&mut self, pointer: Point, button_held: bool) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        if !button_held {
            self.end_drag();
            return false;
        }
        self.scroll_x = drag.scroll_x - (pointer.x - drag.start.x);
        self.scroll_y = drag.scroll_y - (pointer.y - drag.start.y);
        self.clamp_scroll();
        true
    }

    /// Button released or pointer left the viewer. The current scroll stands.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Visible part of the content in original-image space.
    pub fn visible_region(&self) -> Option<BoundingBox> {
        let content = self.content?;
        let x0 = self.scroll_x / self.zoom;
        let y0 = self.scroll_y / self.zoom;
        Some(BoundingBox::new(
            x0,
            y0,
            ((self.scroll_x + self.viewer.width) / self.zoom).min(content.width),
            ((self.scroll_y + self.viewer.height) / self.zoom).min(content.height),
        ))
    }

    fn viewer_center(&self) -> Point {
        Point::new(self.viewer.width / 2.0, self.viewer.height / 2.0)
    }

    fn compute_fit_zoom(&self) -> f32 {
        match self.content {
            Some(c) => (self.viewer.width / c.width)
                .min(self.viewer.height / c.height)
                .max(MIN_FIT_ZOOM),
            None => 1.0,
        }
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.min(MAX_ZOOM).max(self.fit_zoom)
    }

    fn clamp_scroll(&mut self) {
        let Some(content) = self.content else {
            return;
        };
        let max_x = (content.width * self.zoom - self.viewer.width).max(0.0);
        let max_y = (content.height * self.zoom - self.viewer.height).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }
}
