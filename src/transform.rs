//! Coordinate transforms from crop and dimension-area space into original
//! image space.
//!
//! A crop payload's background record describes where the crop sits in the
//! original image. Every other payload (except dimension OCR) is in crop pixel
//! space and is mapped with the resulting [`Affine`]. Dimension OCR is in the
//! pixel space of a dimension area, a sub-region registered by the crop
//! payload under its index.

use std::collections::BTreeMap;

use crate::error::{Error, Result, Warning};
use crate::geometry::{bbox_from_points, BoundingBox, Point};
use crate::payload::{Payload, Size, BACKGROUND_CLASS, DIMENSION_AREA_CLASS};

/// Per-axis scale followed by an offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Affine {
    pub const fn new(scale_x: f32, scale_y: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        }
    }

    /// Map a region of `local` pixels onto `region` in original space.
    ///
    /// Fails if the region has no area; a zero local size yields a non-finite
    /// scale and is rejected by callers before getting here.
    pub fn from_region(region: BoundingBox, local: Size) -> Result<Self> {
        let (width, height) = (region.width(), region.height());
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::DegenerateRegion { width, height });
        }
        Ok(Self::new(
            width / local.width,
            height / local.height,
            region.xmin,
            region.ymin,
        ))
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale_x + self.offset_x,
            p.y * self.scale_y + self.offset_y,
        )
    }

    pub fn apply_all(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.apply(p)).collect()
    }
}

/// Crop placement derived from a crop payload's background record.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformContext {
    pub original_size: Size,
    pub crop_size: Size,
    /// Crop region in original-image space.
    pub region: BoundingBox,
    pub transform: Affine,
}

/// A named sub-region of a crop with its own pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionArea {
    pub index: i64,
    /// Declared pixel size of the sub-region image.
    pub size: Size,
    /// Region polygon in original-image space.
    pub region: Vec<Point>,
}

impl DimensionArea {
    /// Transform from sub-region pixels to original space, if derivable.
    pub fn transform(&self) -> Option<Affine> {
        if !self.size.is_valid() {
            return None;
        }
        let region = bbox_from_points(&self.region)?;
        Affine::from_region(region, self.size).ok()
    }
}

/// Outcome of resolving dimension-area geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Points mapped into original space.
    Resolved(Vec<Point>),
    /// Input points returned as-is, with the reason.
    Unresolved { points: Vec<Point>, warning: Warning },
}

impl Resolution {
    pub fn points(&self) -> &[Point] {
        match self {
            Resolution::Resolved(points) => points,
            Resolution::Unresolved { points, .. } => points,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Holds the active crop transform and the dimension-area registry.
#[derive(Debug, Clone, Default)]
pub struct TransformResolver {
    context: Option<TransformContext>,
    areas: BTreeMap<i64, DimensionArea>,
}

impl TransformResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active crop transform, if a crop payload established one.
    pub fn context(&self) -> Option<&TransformContext> {
        self.context.as_ref()
    }

    pub fn dimension_area(&self, index: i64) -> Option<&DimensionArea> {
        self.areas.get(&index)
    }

    pub fn dimension_areas(&self) -> impl Iterator<Item = &DimensionArea> {
        self.areas.values()
    }

    /// Forget the crop transform and all dimension areas.
    pub fn clear(&mut self) {
        self.context = None;
        self.areas.clear();
    }

    /// Derive the crop transform and dimension areas from a crop payload.
    ///
    /// Any previous state is discarded first. On failure nothing is
    /// established, so crop-relative payloads are refused until a valid crop
    /// payload is loaded.
    pub fn establish(&mut self, payload: &Payload) -> Result<&TransformContext> {
        self.clear();

        let background = payload
            .records
            .iter()
            .find(|r| r.class_name() == Some(BACKGROUND_CLASS))
            .ok_or(Error::MissingBackground)?;

        let original_size = background
            .original_size()
            .ok_or_else(|| Error::missing_size("original_size"))?;
        if !original_size.is_valid() {
            return Err(Error::missing_size("original_size.width/height"));
        }
        let crop_size = background
            .crop_size()
            .ok_or_else(|| Error::missing_size("crop_size"))?;
        if !crop_size.is_valid() {
            return Err(Error::missing_size("crop_size.width/height"));
        }

        let region = bbox_from_points(&background.region_points()).ok_or(Error::MissingRegion)?;
        let transform = Affine::from_region(region, crop_size)?;

        log::info!(
            "Crop transform: scale=({:.4}, {:.4}) offset=({:.1}, {:.1}), original {}x{}",
            transform.scale_x,
            transform.scale_y,
            transform.offset_x,
            transform.offset_y,
            original_size.width,
            original_size.height
        );

        for record in &payload.records {
            if record.class_name() != Some(DIMENSION_AREA_CLASS) {
                continue;
            }
            let Some(index) = record.area_index() else {
                continue;
            };
            let area = DimensionArea {
                index,
                size: record.area_size(),
                region: record.region_points(),
            };
            log::debug!(
                "Dimension area {}: {}x{}, {} region points",
                index,
                area.size.width,
                area.size.height,
                area.region.len()
            );
            self.areas.insert(index, area);
        }

        let context = self.context.insert(TransformContext {
            original_size,
            crop_size,
            region,
            transform,
        });
        Ok(&*context)
    }

    /// Map crop-local points into original space.
    ///
    /// Without an established context this fails instead of guessing.
    pub fn resolve_crop_relative(&self, payload: &str, points: &[Point]) -> Result<Vec<Point>> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| Error::missing_transform(payload))?;
        Ok(context.transform.apply_all(points))
    }

    /// Map dimension-area-local points into original space.
    ///
    /// An unknown index, a zero-sized area, or an area without a usable region
    /// leaves the points untouched and reports why.
    pub fn resolve_dimension_area(&self, index: Option<i64>, points: &[Point]) -> Resolution {
        let unresolved = |message: String| Resolution::Unresolved {
            points: points.to_vec(),
            warning: Warning::warning(message),
        };

        let Some(index) = index else {
            return unresolved("Dimension OCR record has no crop_idx".to_string());
        };
        let Some(area) = self.areas.get(&index) else {
            return unresolved(format!("dimension_area idx={} not found", index));
        };
        if !area.size.is_valid() {
            return unresolved(format!(
                "dimension_area idx={} has invalid size {}x{}",
                index, area.size.width, area.size.height
            ));
        }
        match area.transform() {
            Some(t) => Resolution::Resolved(t.apply_all(points)),
            None => unresolved(format!("dimension_area idx={} has no usable region", index)),
        }
    }
}
