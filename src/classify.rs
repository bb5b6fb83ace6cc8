//! Annotation classifier: turns a parsed payload into normalized objects.
//!
//! Each record gets a class, a drawing kind, a label and geometry resolved
//! into original-image space. Problems with single records become warnings;
//! only a crop-relative payload without a crop transform fails as a whole.

use std::collections::HashSet;

use crate::error::{Result, Warning};
use crate::geometry::{normalize_optional, Point};
use crate::model::{NormalizedObject, ObjectKind, TextRegion};
use crate::payload::{AnnotationRecord, Payload, PayloadKind};
use crate::transform::{Resolution, TransformResolver};

/// Default class when nothing else applies.
pub const UNKNOWN_CLASS: &str = "Unknown";

/// Default class of crop records without a class name.
pub const UNKNOWN_CROP_CLASS: &str = "unknown_crop";

/// Class of dimension-area OCR records.
pub const DIM_OCR_CLASS: &str = "dim_ocr";

/// Class and fallback label of symbol OCR records.
pub const SYMBOL_OCR_CLASS: &str = "symbol_ocr";

/// Objects produced from one payload, plus everything worth reporting.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub objects: Vec<NormalizedObject>,
    pub warnings: Vec<Warning>,
    /// Set when a crop payload established a crop transform.
    pub context_established: bool,
}

/// Pick a class for a record.
///
/// Precedence: explicit `class_name`, the payload kind's own convention
/// (segmentation class for space OCR, fixed names for symbol OCR, dimension
/// OCR and crop records), geometry fields, then [`UNKNOWN_CLASS`].
pub fn class_for(kind: PayloadKind, record: &AnnotationRecord) -> String {
    if let Some(name) = record.class_name() {
        return name.to_string();
    }

    match kind {
        PayloadKind::SpaceOcr => {
            if let Some(seg) = record.segmentation_class() {
                return seg.to_string();
            }
        }
        PayloadKind::SymbolOcr => return SYMBOL_OCR_CLASS.to_string(),
        PayloadKind::DimensionOcr => return DIM_OCR_CLASS.to_string(),
        PayloadKind::Crop => return UNKNOWN_CROP_CLASS.to_string(),
        PayloadKind::CropRelative => {}
    }

    if AnnotationRecord::has(&record.symbol_polygon) {
        "Symbol".to_string()
    } else if AnnotationRecord::has(&record.polygon) {
        "Wall".to_string()
    } else if AnnotationRecord::has(&record.size_polygon)
        || AnnotationRecord::has(&record.detail_polygon)
    {
        "Text".to_string()
    } else {
        UNKNOWN_CLASS.to_string()
    }
}

/// Normalize every record of a payload.
///
/// A crop payload (re)establishes the crop transform on `resolver` before its
/// records are read. Crop-relative payloads fail with
/// [`crate::Error::MissingTransform`] if no transform exists.
pub fn classify(
    id: &str,
    kind: PayloadKind,
    payload: &Payload,
    resolver: &mut TransformResolver,
) -> Result<Classification> {
    let mut out = Classification {
        warnings: payload.skipped.clone(),
        ..Default::default()
    };
    let skipped: HashSet<usize> = payload.skipped.iter().filter_map(|w| w.record).collect();

    if kind == PayloadKind::Crop {
        match resolver.establish(payload) {
            Ok(_) => out.context_established = true,
            Err(e) => out
                .warnings
                .push(Warning::error(format!("No crop transform from '{}': {}", id, e))),
        }
    } else if kind.is_crop_relative() && resolver.context().is_none() {
        log::error!("Cannot draw '{}': no crop payload has been loaded", id);
        return Err(crate::Error::missing_transform(id));
    }

    for (i, record) in payload.records.iter().enumerate() {
        if skipped.contains(&i) {
            continue;
        }
        let object = match kind {
            PayloadKind::Crop => crop_object(record),
            PayloadKind::DimensionOcr => dimension_text_object(record, resolver, &mut out.warnings, i),
            _ => crop_relative_object(id, kind, record, resolver)?,
        };
        let object = object.with_record(i);

        if !object.is_drawable() {
            out.warnings
                .push(Warning::info(format!("No drawable geometry for class '{}'", object.class)).with_record(i));
        }
        if object.class == UNKNOWN_CLASS {
            out.warnings
                .push(Warning::info("No class could be determined").with_record(i));
        }
        out.objects.push(object);
    }

    Ok(out)
}

fn crop_object(record: &AnnotationRecord) -> NormalizedObject {
    let class = class_for(PayloadKind::Crop, record);
    let points = record.region_points();

    let mut object = match (points.is_empty(), record.bbox()) {
        (true, Some(bb)) => NormalizedObject::new(class, ObjectKind::Box, bb.corners().to_vec()),
        _ => NormalizedObject::new(class, ObjectKind::Polygon, points),
    };

    let derived = normalize_optional(record.bbox_polygon.as_ref());
    if !derived.is_empty() {
        object.derived_box = Some(derived);
    }
    object
}

fn dimension_text_object(
    record: &AnnotationRecord,
    resolver: &TransformResolver,
    warnings: &mut Vec<Warning>,
    index: usize,
) -> NormalizedObject {
    let class = class_for(PayloadKind::DimensionOcr, record);
    let raw = normalize_optional(record.polygon.as_ref());
    let crop_index = record.crop_index();

    let resolution = resolver.resolve_dimension_area(crop_index, &raw);
    let resolved = resolution.is_resolved();
    let points = match resolution {
        Resolution::Resolved(points) => points,
        Resolution::Unresolved { points, warning } => {
            warnings.push(warning.with_record(index));
            points
        }
    };

    let text = record.text().map(str::to_string);
    let base = text.clone().unwrap_or_else(|| class.clone());
    let label = match crop_index {
        Some(idx) => format!("{} [{}]", base, idx),
        None => base,
    };

    let mut object = NormalizedObject::new(class, ObjectKind::OcrText, points).with_label(label);
    object.text = text;
    object.crop_index = crop_index;
    object.resolved = resolved;
    object.dimension_area = crop_index
        .and_then(|idx| resolver.dimension_area(idx))
        .map(|area| area.region.clone())
        .filter(|region| !region.is_empty());
    object
}

fn crop_relative_object(
    id: &str,
    kind: PayloadKind,
    record: &AnnotationRecord,
    resolver: &TransformResolver,
) -> Result<NormalizedObject> {
    let class = class_for(kind, record);

    let symbol = normalize_optional(record.symbol_polygon.as_ref());
    let (local, from_symbol, from_bbox) = if !symbol.is_empty() {
        (symbol, true, false)
    } else {
        let polygon = [&record.polygon, &record.bbox_polygon, &record.original_polygon]
            .into_iter()
            .map(|field| normalize_optional(field.as_ref()))
            .find(|points| !points.is_empty());
        match (polygon, record.bbox()) {
            (Some(points), _) => (points, false, false),
            (None, Some(bb)) => (bb.corners().to_vec(), false, true),
            (None, None) => (Vec::new(), false, false),
        }
    };
    let points = resolver.resolve_crop_relative(id, &local)?;

    let text = record.text().map(str::to_string);
    let object_kind = if kind == PayloadKind::SymbolOcr || from_symbol {
        ObjectKind::Symbol
    } else if text.is_some() {
        ObjectKind::OcrText
    } else if from_bbox {
        ObjectKind::Box
    } else {
        ObjectKind::Polygon
    };

    let label = match (kind, &text) {
        (PayloadKind::SymbolOcr, _) => symbol_label(record),
        (_, Some(text)) => text.clone(),
        (_, None) => class.clone(),
    };

    let mut object = NormalizedObject::new(class, object_kind, points).with_label(label);
    object.text = text;
    object.size_region = text_region(id, resolver, &record.size_polygon, &record.size)?;
    object.detail_region = text_region(id, resolver, &record.detail_polygon, &record.detail)?;
    Ok(object)
}

/// `"<size> <detail>"`, or the symbol OCR class name when both are empty.
fn symbol_label(record: &AnnotationRecord) -> String {
    let size = record.size.as_deref().unwrap_or_default();
    let detail = record.detail.as_deref().unwrap_or_default();
    let label = format!("{} {}", size, detail).trim().to_string();
    if label.is_empty() {
        SYMBOL_OCR_CLASS.to_string()
    } else {
        label
    }
}

fn text_region(
    id: &str,
    resolver: &TransformResolver,
    polygon: &Option<serde_json::Value>,
    text: &Option<String>,
) -> Result<Option<TextRegion>> {
    let local: Vec<Point> = normalize_optional(polygon.as_ref());
    if local.is_empty() {
        return Ok(None);
    }
    Ok(Some(TextRegion {
        points: resolver.resolve_crop_relative(id, &local)?,
        text: text.clone().unwrap_or_default(),
    }))
}
