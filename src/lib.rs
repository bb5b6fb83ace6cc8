//! floorviz - floorplan annotation viewer engine
//!
//! Takes the annotation payloads returned for a floorplan (crops, OCR text,
//! symbols, walls), maps every geometry into the original image's pixel
//! space and draws classified, toggleable layers over a zoomable viewport.

pub mod archive;
pub mod classify;
pub mod color;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod layers;
pub mod model;
pub mod payload;
pub mod render;
pub mod transform;
pub mod viewport;

pub use archive::{EntryKind, ResultArchive};
pub use config::ViewerConfig;
pub use engine::{Engine, ImageState, NormalizeReport, PointerInput};
pub use error::{Error, Result, Warning, WarningSeverity};
pub use payload::PayloadKind;
