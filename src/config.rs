//! Viewer configuration file support.
//!
//! Configuration is read from an explicit JSON file; nothing is written back.
//! Missing sections and fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_VIEWER_HEIGHT, DEFAULT_VIEWER_WIDTH};
use crate::error::{Error, Result};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub viewer: ViewerSize,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub colors: ColorConfig,

    #[serde(default)]
    pub style: StyleConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Viewer surface size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewerSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWER_WIDTH,
            height: DEFAULT_VIEWER_HEIGHT,
        }
    }
}

/// Initial state of the display toggles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_labels: bool,
    pub show_keypoints: bool,
    /// Hide dimension OCR whose dimension area could not be resolved
    pub hide_unresolved: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_keypoints: true,
            hide_unresolved: false,
        }
    }
}

/// How class colors are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Random hue per class on every visualization
    #[default]
    Random,
    /// Hue derived from the class name
    Hashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ColorConfig {
    pub scheme: ColorScheme,
    /// Seed for the random scheme; unseeded draws from the thread RNG
    pub seed: Option<u64>,
}

/// Drawing sizes in unzoomed pixels; all are multiplied by the zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub label_font_size: f32,
    pub label_height: f32,
    pub label_padding: f32,
    pub border_width: f32,
    pub keypoint_radius: f32,
    pub dash_length: f32,
    pub ocr_font_size: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            label_font_size: 18.0,
            label_height: 28.0,
            label_padding: 8.0,
            border_width: 3.0,
            keypoint_radius: 5.0,
            dash_length: 5.0,
            ocr_font_size: 16.0,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            viewer: ViewerSize::default(),
            display: DisplayConfig::default(),
            colors: ColorConfig::default(),
            style: StyleConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl ViewerConfig {
    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(Error::ConfigVersion {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.viewer.width == 0 || self.viewer.height == 0 {
            return Err(Error::invalid_config(format!(
                "viewer size must be non-zero, got {}x{}",
                self.viewer.width, self.viewer.height
            )));
        }
        let s = &self.style;
        let sizes = [
            ("label_font_size", s.label_font_size),
            ("label_height", s.label_height),
            ("border_width", s.border_width),
            ("keypoint_radius", s.keypoint_radius),
            ("ocr_font_size", s.ocr_font_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| v.is_nan() || *v <= 0.0) {
            return Err(Error::invalid_config(format!("style.{} must be positive", name)));
        }
        if s.label_padding < 0.0 || s.dash_length < 0.0 {
            return Err(Error::invalid_config(
                "style.label_padding and style.dash_length must not be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.viewer.width, 1280);
        assert!(config.display.show_labels);
        assert_eq!(config.style.label_height, 28.0);
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "viewer": {"width": 640, "height": 480},
            "display": {"show_keypoints": false},
            "colors": {"scheme": "hashed"},
            "style": {"label_font_size": 12},
            "log_level": "debug"
        }"#;
        let config = ViewerConfig::from_json(json).unwrap();

        assert_eq!(config.viewer.height, 480);
        assert!(config.display.show_labels);
        assert!(!config.display.show_keypoints);
        assert_eq!(config.colors.scheme, ColorScheme::Hashed);
        assert_eq!(config.style.label_font_size, 12.0);
        assert_eq!(config.style.label_padding, 8.0);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_version_too_new() {
        let result = ViewerConfig::from_json(r#"{"version": 999}"#);
        assert!(matches!(
            result,
            Err(Error::ConfigVersion {
                file_version: 999,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ViewerConfig::from_json(r#"{"viewer": {"width": 0, "height": 10}}"#),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(matches!(
            ViewerConfig::from_json(r#"{"style": {"border_width": -1}}"#),
            Err(Error::InvalidConfig { .. })
        ));
        assert!(ViewerConfig::from_json("not json").is_err());
    }
}
