//! Raster output for floorviz overlays.
//!
//! The annotation overlay is produced as an SVG document. This crate turns
//! that document into pixels using resvg/tiny-skia and composites it over the
//! zoomed, scrolled base image so the result matches what the viewer shows.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use thiserror::Error;

/// Errors that can occur while producing raster output.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The overlay document could not be parsed
    #[error("Failed to parse SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),

    /// A pixmap of the requested size could not be allocated
    #[error("Failed to create pixmap {width}x{height}")]
    Pixmap {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Image encoding or decoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// The visible window of zoomed content.
///
/// `content_width`/`content_height` are the content size the viewer zooms
/// (original image pixels), `scroll_x`/`scroll_y` are offsets into the zoomed
/// content, `width`/`height` are the viewer surface in screen pixels. A base
/// image of a different natural size is stretched over the content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub content_width: f32,
    pub content_height: f32,
    pub zoom: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub width: u32,
    pub height: u32,
}

/// Options for SVG rasterization and compositing.
#[derive(Debug, Clone, Copy)]
pub struct RasterOptions {
    /// Load system fonts so label text is drawn. Without fonts only shapes render.
    pub system_fonts: bool,
    /// Fill behind the overlay when there is no base image.
    pub background: Rgba<u8>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            system_fonts: true,
            background: Rgba([255; 4]),
        }
    }
}

/// Rasterize an SVG document at its declared size.
///
/// Returns straight (non-premultiplied) RGBA so the result can be blended
/// with the `image` crate.
pub fn rasterize_svg(svg: &str, options: &RasterOptions) -> Result<RgbaImage, RasterError> {
    let mut usvg_options = resvg::usvg::Options::default();
    if options.system_fonts {
        usvg_options.fontdb_mut().load_system_fonts();
    }

    let tree = resvg::usvg::Tree::from_str(svg, &usvg_options)?;
    let size = tree.size();
    let width = size.width().ceil().max(1.0) as u32;
    let height = size.height().ceil().max(1.0) as u32;

    log::debug!("Rasterizing overlay: {} bytes, output {}x{}", svg.len(), width, height);

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RasterError::Pixmap { width, height })?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let mut out = RgbaImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    Ok(out)
}

/// Render the part of `base` visible through `view`.
///
/// The base image is mapped onto the content rectangle first, so the overlay
/// and the image line up whatever the image's own pixel size is. Areas of the
/// viewer not covered by the image stay transparent.
pub fn render_base_view(base: &RgbaImage, view: ViewWindow) -> RgbaImage {
    let mut out = RgbaImage::new(view.width.max(1), view.height.max(1));
    if view.zoom <= 0.0
        || view.content_width <= 0.0
        || view.content_height <= 0.0
        || base.width() == 0
        || base.height() == 0
    {
        return out;
    }

    // image pixels per content pixel
    let sx = base.width() as f32 / view.content_width;
    let sy = base.height() as f32 / view.content_height;

    // Visible region in content space
    let x0 = (view.scroll_x / view.zoom).max(0.0);
    let y0 = (view.scroll_y / view.zoom).max(0.0);
    let x1 = ((view.scroll_x + view.width as f32) / view.zoom).min(view.content_width);
    let y1 = ((view.scroll_y + view.height as f32) / view.zoom).min(view.content_height);
    if x1 <= x0 || y1 <= y0 {
        return out;
    }

    let src_x = ((x0 * sx).floor() as u32).min(base.width() - 1);
    let src_y = ((y0 * sy).floor() as u32).min(base.height() - 1);
    let src_w = ((x1 * sx).ceil() as u32).min(base.width()).saturating_sub(src_x).max(1);
    let src_h = ((y1 * sy).ceil() as u32).min(base.height()).saturating_sub(src_y).max(1);
    let region = imageops::crop_imm(base, src_x, src_y, src_w, src_h).to_image();

    let scale_x = view.zoom / sx;
    let scale_y = view.zoom / sy;
    let dst_w = (src_w as f32 * scale_x).round().max(1.0) as u32;
    let dst_h = (src_h as f32 * scale_y).round().max(1.0) as u32;
    log::trace!(
        "Base view: source {}x{} at ({}, {}) -> {}x{}",
        src_w,
        src_h,
        src_x,
        src_y,
        dst_w,
        dst_h
    );
    let scaled = imageops::resize(&region, dst_w, dst_h, imageops::FilterType::Triangle);

    let dst_x = (src_x as f32 * scale_x - view.scroll_x).round() as i64;
    let dst_y = (src_y as f32 * scale_y - view.scroll_y).round() as i64;
    imageops::replace(&mut out, &scaled, dst_x, dst_y);
    out
}

/// Alpha-blend `overlay` onto `target` at the origin.
pub fn composite(target: &mut RgbaImage, overlay: &RgbaImage) {
    imageops::overlay(target, overlay, 0, 0);
}

/// Build the final viewport image: base view (if any) with the overlay on top.
pub fn compose_viewport(
    base: Option<&RgbaImage>,
    overlay_svg: &str,
    view: ViewWindow,
    options: &RasterOptions,
) -> Result<RgbaImage, RasterError> {
    let overlay = rasterize_svg(overlay_svg, options)?;
    let mut out = match base {
        Some(base) => render_base_view(base, view),
        None => RgbaImage::from_pixel(view.width.max(1), view.height.max(1), options.background),
    };
    composite(&mut out, &overlay);
    Ok(out)
}

/// Decode an image file into RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, RasterError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Write an RGBA image as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), RasterError> {
    image.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("Wrote {}x{} image to {:?}", image.width(), image.height(), path);
    Ok(())
}
