//! Error types for floorviz.
//!
//! Only conditions that stop a whole operation are errors. Problems scoped to
//! a single record (malformed geometry, unresolved dimension areas, unknown
//! classes) are reported as [`Warning`]s and the payload keeps going.

use thiserror::Error;

/// Errors that can occur while loading payloads, archives, or configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive could not be read
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Base image could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Overlay could not be rasterized or written
    #[error("Raster error: {0}")]
    Raster(#[from] floorviz_raster::RasterError),

    /// Crop payload has no record classed "background"
    #[error("Crop payload has no background record")]
    MissingBackground,

    /// Background record lacks size metadata
    #[error("Background record is missing {field}")]
    MissingSizeMetadata {
        /// Name of the missing or zero field
        field: String,
    },

    /// Background record has no region polygon
    #[error("Background record has no original_polygon or bbox_polygon")]
    MissingRegion,

    /// Region bounding box has no area
    #[error("Crop region has invalid size {width}x{height}")]
    DegenerateRegion {
        /// Region width in original pixels
        width: f32,
        /// Region height in original pixels
        height: f32,
    },

    /// Crop-relative payload visualized before any crop payload
    #[error("No crop transform established; load a crop payload before '{payload}'")]
    MissingTransform {
        /// Identifier of the payload that could not be resolved
        payload: String,
    },

    /// Archive entry does not exist
    #[error("Archive entry not found: {name}")]
    EntryNotFound {
        /// The requested entry name
        name: String,
    },

    /// Configuration content is invalid
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    ConfigVersion {
        file_version: u32,
        supported_version: u32,
    },
}

impl Error {
    /// Create a missing size metadata error.
    pub fn missing_size(field: impl Into<String>) -> Self {
        Self::MissingSizeMetadata {
            field: field.into(),
        }
    }

    /// Create a missing transform error for a payload.
    pub fn missing_transform(payload: impl Into<String>) -> Self {
        Self::MissingTransform {
            payload: payload.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Severity level for per-record warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Informational message, not a problem.
    Info,
    /// Something was skipped or drawn with a fallback.
    Warning,
    /// A record or payload could not be drawn at all.
    Error,
}

/// A problem scoped to one record or one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Index of the record in the payload, if the warning is about one record.
    pub record: Option<usize>,

    /// Human-readable message.
    pub message: String,

    /// Severity level.
    pub severity: WarningSeverity,
}

impl Warning {
    /// Create a new warning.
    pub fn new(message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            record: None,
            message: message.into(),
            severity,
        }
    }

    /// Create an info-level warning.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Info)
    }

    /// Create a warning-level warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Warning)
    }

    /// Create an error-level warning.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Error)
    }

    /// Attach the index of the record this warning relates to.
    pub fn with_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    /// Emit this warning through the `log` facade at the matching level.
    pub fn log(&self) {
        let prefix = match self.record {
            Some(i) => format!("record {}: ", i),
            None => String::new(),
        };
        match self.severity {
            WarningSeverity::Info => log::info!("{}{}", prefix, self.message),
            WarningSeverity::Warning => log::warn!("{}{}", prefix, self.message),
            WarningSeverity::Error => log::error!("{}{}", prefix, self.message),
        }
    }
}
