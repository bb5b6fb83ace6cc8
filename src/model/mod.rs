//! Normalized annotation objects ready for drawing.
//!
//! All point sequences are in original-image pixel space.

use crate::color::Color;
use crate::geometry::{bbox_from_points, pair_to_point, BoundingBox, Point};

/// How an object is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Filled closed path
    Polygon,
    /// Filled rectangle from an axis-aligned box
    Box,
    /// Symbol rectangle with optional size/detail text sub-regions
    Symbol,
    /// Recognized text region
    OcrText,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Polygon => "polygon",
            ObjectKind::Box => "box",
            ObjectKind::Symbol => "symbol",
            ObjectKind::OcrText => "ocr_text",
        }
    }
}

/// A text sub-region of a symbol (its size or detail annotation).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    pub points: Vec<Point>,
    pub text: String,
}

/// A classified, coordinate-resolved annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedObject {
    pub class: String,
    pub kind: ObjectKind,
    pub points: Vec<Point>,
    pub label: String,
    /// Recognized text, drawn centered on OCR-text regions.
    pub text: Option<String>,
    /// Assigned by the layer registry, shared by every object of the class.
    pub color: Color,
    /// Index of the record in its payload.
    pub record: usize,
    /// Dimension area a text region was read from.
    pub crop_index: Option<i64>,
    /// False when the geometry could not be mapped into original space.
    pub resolved: bool,
    /// Auxiliary box drawn as a dashed outline.
    pub derived_box: Option<Vec<Point>>,
    /// Region of the dimension area this text came from.
    pub dimension_area: Option<Vec<Point>>,
    pub size_region: Option<TextRegion>,
    pub detail_region: Option<TextRegion>,
}

impl NormalizedObject {
    pub fn new(class: impl Into<String>, kind: ObjectKind, points: Vec<Point>) -> Self {
        let class = class.into();
        Self {
            label: class.clone(),
            class,
            kind,
            points,
            text: None,
            color: Color::WHITE,
            record: 0,
            crop_index: None,
            resolved: true,
            derived_box: None,
            dimension_area: None,
            size_region: None,
            detail_region: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_record(mut self, record: usize) -> Self {
        self.record = record;
        self
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        bbox_from_points(&self.points)
    }

    /// Whether the primary geometry has anything to draw.
    pub fn is_drawable(&self) -> bool {
        !self.points.is_empty()
    }
}

/// A junction point from a connection payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub center: Point,
    pub kind: String,
}

/// Parse a connection payload: `{"connection": [{"center_point": [x, y], "type": ".."}]}`.
///
/// Entries without a usable center point are skipped.
pub fn parse_junctions(json: &str) -> crate::Result<Vec<Junction>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let Some(list) = value.get("connection").and_then(|c| c.as_array()) else {
        log::warn!("Connection payload has no connection array");
        return Ok(Vec::new());
    };

    let junctions: Vec<Junction> = list
        .iter()
        .filter_map(|entry| {
            let center = entry.get("center_point").and_then(pair_to_point)?;
            let kind = entry
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string();
            Some(Junction { center, kind })
        })
        .collect();

    log::debug!("Parsed {} of {} junctions", junctions.len(), list.len());
    Ok(junctions)
}
