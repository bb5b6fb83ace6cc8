//! The engine context: everything one viewer session needs, owned in one place.
//!
//! The shell feeds it payloads, image-load events and user input; every
//! mutator leaves the object list, the layer registry and the viewport
//! consistent and marks a redraw. Drawing happens only in [`Engine::render`].

use crate::classify::classify;
use crate::config::{DisplayConfig, ViewerConfig};
use crate::error::{Result, Warning};
use crate::geometry::Point;
use crate::layers::{ClassSummary, LayerRegistry, Palette};
use crate::model::{parse_junctions, Junction, NormalizedObject};
use crate::payload::{Payload, PayloadKind, Size};
use crate::render::{Canvas, RenderStats, Renderer, Scene, SvgCanvas, ViewMode};
use crate::transform::TransformResolver;
use crate::viewport::Viewport;
use floorviz_raster::ViewWindow;

#[cfg(test)]
mod tests;

/// Base image loading, as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageState {
    NotRequested,
    /// Decode in flight; content dimensions must not be read.
    Pending,
    Ready {
        width: f32,
        height: f32,
    },
}

/// Pointer input from the viewer surface, in viewer-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Wheel { delta_y: f32, at: Point },
    DoubleClick { at: Point },
    Press { at: Point },
    Move { at: Point, button_held: bool },
    Release,
    Leave,
}

/// Summary of one `visualize` call.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeReport {
    pub payload: String,
    pub kind: PayloadKind,
    pub objects: usize,
    /// Class toggle list, sorted by name.
    pub classes: Vec<ClassSummary>,
    /// Dimension-area toggle list, ascending.
    pub dimension_indices: Vec<i64>,
    pub warnings: Vec<Warning>,
    /// Whether this payload established a crop transform.
    pub context_established: bool,
}

/// One viewer session.
#[derive(Debug)]
pub struct Engine {
    config: ViewerConfig,
    display: DisplayConfig,
    viewport: Viewport,
    resolver: TransformResolver,
    palette: Palette,
    objects: Vec<NormalizedObject>,
    layers: LayerRegistry,
    junctions: Vec<Junction>,
    image: ImageState,
    /// Original image size declared by the last crop payload.
    crop_content: Option<Size>,
    payload: Option<(String, PayloadKind)>,
    view_mode: ViewMode,
    needs_redraw: bool,
}

impl Engine {
    pub fn new(config: ViewerConfig) -> Self {
        let viewport = Viewport::new(config.viewer.width as f32, config.viewer.height as f32);
        Self {
            display: config.display,
            palette: Palette::new(&config.colors),
            config,
            viewport,
            resolver: TransformResolver::new(),
            objects: Vec::new(),
            layers: LayerRegistry::default(),
            junctions: Vec::new(),
            image: ImageState::NotRequested,
            crop_content: None,
            payload: None,
            view_mode: ViewMode::default(),
            needs_redraw: false,
        }
    }

    // === Accessors ===

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn display(&self) -> DisplayConfig {
        self.display
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resolver(&self) -> &TransformResolver {
        &self.resolver
    }

    pub fn objects(&self) -> &[NormalizedObject] {
        &self.objects
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn image_state(&self) -> ImageState {
        self.image
    }

    /// Identifier and kind of the payload on display.
    pub fn current_payload(&self) -> Option<(&str, PayloadKind)> {
        self.payload.as_ref().map(|(id, kind)| (id.as_str(), *kind))
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Size the viewport loads with: crop metadata first, then the decoded
    /// image. `None` while the image is still decoding.
    pub fn content_size(&self) -> Option<Size> {
        match self.image {
            ImageState::Ready { width, height } => {
                Some(self.crop_content.unwrap_or(Size::new(width, height)))
            }
            _ => None,
        }
    }

    /// The visible window for compositing the base image under the overlay.
    ///
    /// Carries the content size rather than the image's own size, so a base
    /// image whose natural size differs from the crop metadata is stretched
    /// onto the same space the overlay is drawn in.
    pub fn view_window(&self) -> Option<ViewWindow> {
        let content = self.viewport.content_size()?;
        let viewer = self.viewport.viewer_size();
        let (scroll_x, scroll_y) = self.viewport.scroll();
        Some(ViewWindow {
            content_width: content.width,
            content_height: content.height,
            zoom: self.viewport.zoom(),
            scroll_x,
            scroll_y,
            width: viewer.width.round().max(1.0) as u32,
            height: viewer.height.round().max(1.0) as u32,
        })
    }

    // === Payloads ===

    /// Replace the displayed objects with those of a newly selected payload.
    ///
    /// A crop payload also (re)establishes the crop transform. A crop-relative
    /// payload without one fails with [`crate::Error::MissingTransform`] and leaves
    /// nothing drawn. Per-record problems are returned as warnings and logged.
    pub fn visualize(&mut self, id: &str, kind: PayloadKind, content: &str) -> Result<NormalizeReport> {
        let payload = Payload::from_json(content)?;
        log::info!("Visualizing '{}' ({}): {} records", id, kind, payload.len());

        self.payload = Some((id.to_string(), kind));
        self.junctions.clear();
        self.needs_redraw = true;

        let classification = match classify(id, kind, &payload, &mut self.resolver) {
            Ok(c) => c,
            Err(e) => {
                self.objects.clear();
                self.layers = LayerRegistry::default();
                return Err(e);
            }
        };

        if kind == PayloadKind::Crop {
            self.crop_content = self.resolver.context().map(|c| c.original_size);
            self.sync_viewport();
        }

        self.objects = classification.objects;
        self.layers = LayerRegistry::build(&mut self.objects, &mut self.palette);

        for warning in &classification.warnings {
            warning.log();
        }

        let report = NormalizeReport {
            payload: id.to_string(),
            kind,
            objects: self.objects.len(),
            classes: self.layers.class_summaries(),
            dimension_indices: self.layers.dimension_indices(),
            warnings: classification.warnings,
            context_established: classification.context_established,
        };
        log::info!(
            "'{}': {} objects in {} classes, {} warnings",
            id,
            report.objects,
            report.classes.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Attach a junction overlay to the current payload.
    ///
    /// Returns the number of junctions read.
    pub fn attach_junctions(&mut self, content: &str) -> Result<usize> {
        self.junctions = parse_junctions(content)?;
        log::debug!("Attached {} junctions", self.junctions.len());
        self.needs_redraw = true;
        Ok(self.junctions.len())
    }

    // === Base image ===

    /// A new base image starts decoding. The viewport goes back to unloaded
    /// until [`Engine::image_loaded`] reports the natural size.
    pub fn begin_image_load(&mut self) {
        self.image = ImageState::Pending;
        self.viewport.reset();
        self.needs_redraw = true;
        log::debug!("Base image load started");
    }

    /// Decode-complete signal for the image requested last.
    ///
    /// Returns whether the viewport is now loaded.
    pub fn image_loaded(&mut self, width: f32, height: f32) -> bool {
        if self.image != ImageState::Pending {
            log::warn!("Ignoring image completion {}x{} without a pending load", width, height);
            return false;
        }
        self.image = ImageState::Ready { width, height };
        log::info!("Base image ready: {}x{}", width, height);
        self.sync_viewport();
        self.needs_redraw = true;
        self.viewport.is_loaded()
    }

    /// The pending image could not be decoded.
    pub fn image_failed(&mut self, reason: &str) {
        log::error!("Base image failed to load: {}", reason);
        self.image = ImageState::NotRequested;
        self.viewport.reset();
        self.needs_redraw = true;
    }

    /// Reload the viewport when the content size it should show changed.
    fn sync_viewport(&mut self) {
        let Some(content) = self.content_size() else {
            return;
        };
        if self.viewport.content_size() != Some(content) {
            self.viewport.load(content.width, content.height);
            self.needs_redraw = true;
        }
    }

    // === Visibility and display toggles ===

    /// Returns `false` for classes not in the current payload.
    pub fn set_class_visible(&mut self, class: &str, visible: bool) -> bool {
        let changed = self.layers.set_class_visible(class, visible);
        self.needs_redraw |= changed;
        changed
    }

    /// Returns `false` for indices not in the current payload.
    pub fn set_dimension_area_visible(&mut self, index: i64, visible: bool) -> bool {
        let changed = self.layers.set_dimension_visible(index, visible);
        self.needs_redraw |= changed;
        changed
    }

    /// Returns the new state.
    pub fn toggle_labels(&mut self) -> bool {
        self.display.show_labels = !self.display.show_labels;
        self.needs_redraw = true;
        self.display.show_labels
    }

    /// Returns the new state.
    pub fn toggle_keypoints(&mut self) -> bool {
        self.display.show_keypoints = !self.display.show_keypoints;
        self.needs_redraw = true;
        self.display.show_keypoints
    }

    pub fn set_hide_unresolved(&mut self, hide: bool) {
        self.needs_redraw |= self.display.hide_unresolved != hide;
        self.display.hide_unresolved = hide;
    }

    /// Switch between the annotated and the vector drawing.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.needs_redraw |= self.view_mode != mode;
        self.view_mode = mode;
    }

    // === Viewport ===

    /// Zoom to `value` keeping the content under `anchor` in place.
    pub fn set_zoom(&mut self, value: f32, anchor: Point) -> bool {
        let changed = self.viewport.zoom_at(value, anchor);
        self.needs_redraw |= changed;
        changed
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        let changed = self.viewport.pan(dx, dy);
        self.needs_redraw |= changed;
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.viewport.zoom_in();
        self.needs_redraw |= changed;
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.viewport.zoom_out();
        self.needs_redraw |= changed;
        changed
    }

    pub fn fit_to_screen(&mut self) {
        self.viewport.fit_to_screen();
        self.needs_redraw = true;
    }

    pub fn set_viewer_size(&mut self, width: f32, height: f32) {
        self.viewport.set_viewer_size(width, height);
        self.needs_redraw = true;
    }

    /// Route pointer input to the viewport. Returns whether a redraw is due.
    pub fn handle_pointer(&mut self, input: PointerInput) -> bool {
        let changed = match input {
            PointerInput::Wheel { delta_y, at } => self.viewport.wheel(delta_y, at),
            PointerInput::DoubleClick { at } => self.viewport.toggle_zoom(at),
            PointerInput::Press { at } => {
                self.viewport.begin_drag(at);
                false
            }
            PointerInput::Move { at, button_held } => self.viewport.drag_to(at, button_held),
            PointerInput::Release | PointerInput::Leave => {
                self.viewport.end_drag();
                false
            }
        };
        self.needs_redraw |= changed;
        changed
    }

    // === Drawing ===

    /// Full redraw of the current state onto `canvas`.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> RenderStats {
        let zoom = self.viewport.zoom();
        let surface = self
            .viewport
            .display_size()
            .unwrap_or_else(|| self.viewport.viewer_size());
        let scene = Scene {
            objects: &self.objects,
            layers: &self.layers,
            junctions: &self.junctions,
        };
        let renderer = Renderer::new(self.config.style, self.display);
        let stats = match self.view_mode {
            ViewMode::Annotated => renderer.render(&scene, zoom, surface, canvas),
            ViewMode::Vector => renderer.render_vector(&scene, zoom, surface, canvas),
        };
        self.needs_redraw = false;
        stats
    }

    /// Redraw into an SVG document showing the visible viewport window.
    pub fn render_svg(&mut self) -> (String, RenderStats) {
        let viewer = self.viewport.viewer_size();
        let (scroll_x, scroll_y) = self.viewport.scroll();
        let mut canvas = SvgCanvas::new(viewer.width, viewer.height, scroll_x, scroll_y);
        let stats = self.render(&mut canvas);
        (canvas.finish(), stats)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
