//! Payload kind tag.

use std::fmt;

/// Which coordinate space and field conventions a payload uses.
///
/// Decided once by whoever ingests the payload and passed alongside its
/// content; the engine never inspects identifiers itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Records already in original-image space; carries the background record
    /// that establishes the crop transform.
    Crop,
    /// OCR text found inside dimension areas, in sub-region pixel space.
    DimensionOcr,
    /// Symbol OCR in crop space.
    SymbolOcr,
    /// Space OCR in crop space, classed by segmentation class.
    SpaceOcr,
    /// Any other crop-relative payload.
    CropRelative,
}

impl PayloadKind {
    /// Tag an archive entry by its file name.
    pub fn from_entry_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("crop") {
            PayloadKind::Crop
        } else if lower.contains("dim_ocr") {
            PayloadKind::DimensionOcr
        } else if lower.contains("symbol_ocr") {
            PayloadKind::SymbolOcr
        } else if lower.contains("space_ocr") {
            PayloadKind::SpaceOcr
        } else {
            PayloadKind::CropRelative
        }
    }

    /// Whether records of this kind need the crop transform.
    pub fn is_crop_relative(self) -> bool {
        !matches!(self, PayloadKind::Crop | PayloadKind::DimensionOcr)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::Crop => "crop",
            PayloadKind::DimensionOcr => "dim_ocr",
            PayloadKind::SymbolOcr => "symbol_ocr",
            PayloadKind::SpaceOcr => "space_ocr",
            PayloadKind::CropRelative => "crop_relative",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
