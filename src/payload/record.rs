//! Raw annotation records as they appear in result payloads.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Result, Warning};
use crate::geometry::{self, BoundingBox, Point};

/// Width/height pair read from `original_size`, `crop_size` and friends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// One detected entity. Every field is optional; geometry fields are kept as
/// raw JSON and normalized on demand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnotationRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub class_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub segmentation_class: Option<String>,

    pub polygon: Option<Value>,
    pub bbox: Option<Value>,
    pub bbox_polygon: Option<Value>,
    pub original_polygon: Option<Value>,
    pub symbol_polygon: Option<Value>,
    pub size_polygon: Option<Value>,
    pub detail_polygon: Option<Value>,

    #[serde(deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub detail: Option<String>,

    pub original_size: Option<Value>,
    pub crop_size: Option<Value>,
    pub crop_idx: Option<Value>,
    pub idx: Option<Value>,
    pub bbox_width: Option<Value>,
    pub bbox_height: Option<Value>,
}

impl AnnotationRecord {
    /// Explicit class name, ignoring empty strings.
    pub fn class_name(&self) -> Option<&str> {
        non_empty(&self.class_name)
    }

    pub fn segmentation_class(&self) -> Option<&str> {
        non_empty(&self.segmentation_class)
    }

    pub fn text(&self) -> Option<&str> {
        non_empty(&self.text)
    }

    /// Index of the dimension area an OCR record was extracted from.
    pub fn crop_index(&self) -> Option<i64> {
        self.crop_idx.as_ref().and_then(integer)
    }

    /// Index a `dimension_area` record registers itself under.
    pub fn area_index(&self) -> Option<i64> {
        self.idx.as_ref().and_then(integer)
    }

    pub fn original_size(&self) -> Option<Size> {
        self.original_size.as_ref().and_then(size_from_value)
    }

    pub fn crop_size(&self) -> Option<Size> {
        self.crop_size.as_ref().and_then(size_from_value)
    }

    /// Declared pixel size of a dimension area; missing values read as zero.
    pub fn area_size(&self) -> Size {
        let read = |v: &Option<Value>| v.as_ref().and_then(geometry::number).unwrap_or(0.0);
        Size::new(read(&self.bbox_width), read(&self.bbox_height))
    }

    /// Region polygon of a crop record: `original_polygon`, else `bbox_polygon`.
    pub fn region_polygon(&self) -> Option<&Value> {
        present(&self.original_polygon).or_else(|| present(&self.bbox_polygon))
    }

    /// Normalized `region_polygon`.
    pub fn region_points(&self) -> Vec<Point> {
        geometry::normalize_optional(self.region_polygon())
    }

    /// Axis-aligned `bbox` object, if present and complete.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox.as_ref().and_then(geometry::bbox_from_value)
    }

    /// Whether a raw geometry field is present (not missing and not null).
    pub fn has(field: &Option<Value>) -> bool {
        present(field).is_some()
    }
}

/// A parsed payload: the record list plus records that could not be read.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub records: Vec<AnnotationRecord>,
    pub skipped: Vec<Warning>,
}

impl Payload {
    /// Parse payload JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Read the record list from `objects`, falling back to `data.objects`.
    ///
    /// Entries that are not objects are skipped with a warning rather than
    /// failing the payload.
    pub fn from_value(value: &Value) -> Self {
        let list = value
            .get("objects")
            .and_then(Value::as_array)
            .or_else(|| {
                value
                    .get("data")
                    .and_then(|d| d.get("objects"))
                    .and_then(Value::as_array)
            });

        let mut payload = Payload::default();
        let Some(list) = list else {
            payload
                .skipped
                .push(Warning::info("Payload has no objects array"));
            return payload;
        };

        for (i, item) in list.iter().enumerate() {
            if !item.is_object() {
                payload
                    .skipped
                    .push(Warning::warning("Entry is not an object").with_record(i));
                // keep indices aligned with the source list
                payload.records.push(AnnotationRecord::default());
                continue;
            }
            match AnnotationRecord::deserialize(item) {
                Ok(record) => payload.records.push(record),
                Err(e) => {
                    payload
                        .skipped
                        .push(Warning::warning(format!("Unreadable record: {}", e)).with_record(i));
                    payload.records.push(AnnotationRecord::default());
                }
            }
        }

        payload
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn present(field: &Option<Value>) -> Option<&Value> {
    field.as_ref().filter(|v| !v.is_null())
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Whole numbers only; `2.0` and `"2"` are accepted, `2.5` is not.
fn integer(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => return Some(i),
            None => n.as_f64(),
        },
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => return Some(i),
            Err(_) => s.trim().parse::<f64>().ok(),
        },
        _ => None,
    }?;
    if number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Some(number as i64)
    } else {
        log::warn!("Ignoring non-integral index {}", value);
        None
    }
}

fn size_from_value(value: &Value) -> Option<Size> {
    let width = value.get("width").and_then(geometry::number).unwrap_or(0.0);
    let height = value.get("height").and_then(geometry::number).unwrap_or(0.0);
    Some(Size::new(width, height))
}

/// Accept strings and numbers for free-text fields; anything else reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
