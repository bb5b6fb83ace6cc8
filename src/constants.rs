//! Global constants for floorviz

use crate::color::Color;

/// Upper zoom bound
pub const MAX_ZOOM: f32 = 5.0;

/// Floor for the fit-to-bounds zoom
pub const MIN_FIT_ZOOM: f32 = 0.01;

/// Zoom changes smaller than this are ignored
pub const ZOOM_EPSILON: f32 = 1e-6;

/// Zoom level the double-activation toggle jumps to
pub const TOGGLE_ZOOM: f32 = 2.0;

/// Distance from the fit zoom still treated as "at fit"
pub const AT_FIT_TOLERANCE: f32 = 0.05;

/// Wheel zoom factors per notch
pub const WHEEL_ZOOM_IN: f32 = 1.1;
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

/// Button zoom factors
pub const BUTTON_ZOOM_IN: f32 = 1.2;
pub const BUTTON_ZOOM_OUT: f32 = 0.8;

/// Default viewer surface size
pub const DEFAULT_VIEWER_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWER_HEIGHT: u32 = 800;

/// Class color saturation and lightness
pub const CLASS_SATURATION: f32 = 0.7;
pub const CLASS_LIGHTNESS: f32 = 0.5;

/// Opacity of shape fills
pub const FILL_OPACITY: f32 = 0.25;

/// Dashed outlines of derived geometry
pub const ALERT_COLOR: Color = Color::from_rgb8(0xFF, 0x00, 0x00);

/// OCR text regions
pub const OCR_MARKER_COLOR: Color = Color::from_rgb8(0x00, 0xBF, 0xFF);

/// Symbol size / detail sub-regions
pub const SIZE_REGION_COLOR: Color = Color::from_rgb8(0x00, 0xBF, 0xFF);
pub const DETAIL_REGION_COLOR: Color = Color::from_rgb8(0xFF, 0x45, 0x00);

/// Keypoint markers
pub const KEYPOINT_COLOR: Color = Color::RED;

/// Junction markers
pub const JUNCTION_COLOR: Color = Color::BLUE;

/// Gap between a shape and its label, unzoomed
pub const LABEL_GAP: f32 = 3.0;

/// Vertical shift of the fallback label position, unzoomed
pub const LABEL_FALLBACK_SHIFT: f32 = 10.0;

/// Vector view: background and grid
pub const VECTOR_BACKGROUND: Color = Color::from_rgb8(0x1A, 0x1A, 0x1A);
pub const VECTOR_GRID_COLOR: Color = Color::from_rgb8(0x33, 0x33, 0x33);

/// Vector view grid spacing, unzoomed
pub const VECTOR_GRID_SPACING: f32 = 50.0;

/// Vector view axes: distance from the bottom-left corner, length, arrowhead size
pub const VECTOR_AXIS_MARGIN: f32 = 10.0;
pub const VECTOR_AXIS_LENGTH: f32 = 60.0;
pub const VECTOR_ARROW_LENGTH: f32 = 8.0;
pub const VECTOR_ARROW_HALF_WIDTH: f32 = 4.0;
