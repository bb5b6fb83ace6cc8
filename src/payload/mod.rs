//! Annotation payloads: record parsing and the payload-kind tag.

mod kind;
mod record;

pub use kind::PayloadKind;
pub use record::{AnnotationRecord, Payload, Size};

/// Class name of the crop record that carries the transform metadata.
pub const BACKGROUND_CLASS: &str = "background";

/// Class name of crop records that register a dimension area.
pub const DIMENSION_AREA_CLASS: &str = "dimension_area";
