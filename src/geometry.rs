//! Geometry primitives and normalization of raw polygon values.
//!
//! Annotation payloads encode polygons either as an ordered list of
//! `[x, y]` pairs or as an object mapping arbitrary keys to pairs. Both are
//! normalized into an ordered `Vec<Point>`; anything else becomes an empty
//! sequence, which callers treat as "nothing to draw".

use serde_json::Value;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Multiply both coordinates by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned bounding box stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    pub const fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Box with the given top-left corner and size.
    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    /// Corners in drawing order: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.xmin, self.ymin),
            Point::new(self.xmax, self.ymin),
            Point::new(self.xmax, self.ymax),
            Point::new(self.xmin, self.ymax),
        ]
    }

    /// Whether two boxes share any point. Touching edges count as overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.xmax < other.xmin
            || self.xmin > other.xmax
            || self.ymax < other.ymin
            || self.ymin > other.ymax)
    }

    /// Same box translated by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.xmin + dx, self.ymin + dy, self.xmax + dx, self.ymax + dy)
    }
}

/// Get the bounding box of a point sequence.
///
/// Returns `None` for an empty sequence.
pub fn bbox_from_points(points: &[Point]) -> Option<BoundingBox> {
    if points.is_empty() {
        return None;
    }

    let mut bb = BoundingBox::new(
        f32::INFINITY,
        f32::INFINITY,
        f32::NEG_INFINITY,
        f32::NEG_INFINITY,
    );
    for p in points {
        bb.xmin = bb.xmin.min(p.x);
        bb.ymin = bb.ymin.min(p.y);
        bb.xmax = bb.xmax.max(p.x);
        bb.ymax = bb.ymax.max(p.y);
    }
    Some(bb)
}

/// Scale every point by the zoom factor.
pub fn scale_points(points: &[Point], zoom: f32) -> Vec<Point> {
    points.iter().map(|p| p.scaled(zoom)).collect()
}

/// Normalize a raw polygon value into an ordered point sequence.
///
/// - A list of pairs passes through in order; if any entry is not a pair the
///   whole value is rejected.
/// - An object is read in lexicographic key order, skipping values that are
///   not pairs, so the result does not depend on the payload's key order.
/// - Anything else (including `null`) yields an empty sequence.
pub fn normalize_polygon(value: &Value) -> Vec<Point> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(pair_to_point)
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .filter_map(|k| pair_to_point(&map[k.as_str()]))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Normalize an optional raw polygon; absent values give an empty sequence.
pub fn normalize_optional(value: Option<&Value>) -> Vec<Point> {
    value.map(normalize_polygon).unwrap_or_default()
}

/// Read an axis-aligned `{xmin, ymin, xmax, ymax}` object.
pub fn bbox_from_value(value: &Value) -> Option<BoundingBox> {
    let obj = value.as_object()?;
    let get = |key: &str| obj.get(key).and_then(number);
    Some(BoundingBox::new(
        get("xmin")?,
        get("ymin")?,
        get("xmax")?,
        get("ymax")?,
    ))
}

/// A `[x, y, ...]` array with at least two numeric entries.
pub(crate) fn pair_to_point(value: &Value) -> Option<Point> {
    let arr = value.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    Some(Point::new(number(&arr[0])?, number(&arr[1])?))
}

/// Numeric coercion: numbers and numeric strings are accepted.
pub(crate) fn number(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
}
