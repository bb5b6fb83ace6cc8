//! Text measurement utilities.
//!
//! Labels are drawn in a bold proportional sans-serif. Without access to the
//! font at layout time, sizes are estimated from average glyph proportions.

/// Metrics for a specific font size.
#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    /// Font size in pixels
    pub size: f32,
    /// Average character width as a ratio of font size
    pub char_width_ratio: f32,
    /// Line height as a ratio of font size
    pub line_height_ratio: f32,
}

impl TextMetrics {
    /// Proportions tuned for bold Arial-like label text.
    pub const BOLD_SANS: TextMetrics = TextMetrics {
        size: 18.0,
        char_width_ratio: 0.6,
        line_height_ratio: 1.2,
    };

    /// Create metrics for a specific font size.
    pub fn new(size: f32) -> Self {
        Self {
            size,
            ..Self::BOLD_SANS
        }
    }

    /// Estimate the width of a single line of text.
    pub fn line_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * self.char_width_ratio
    }

    pub fn line_height(&self) -> f32 {
        self.size * self.line_height_ratio
    }

    /// Estimate dimensions of (possibly multi-line) text.
    pub fn measure(&self, text: &str) -> (f32, f32) {
        let line_count = text.lines().count().max(1);
        let width = text
            .lines()
            .map(|line| self.line_width(line))
            .fold(0.0f32, f32::max);
        (width, line_count as f32 * self.line_height())
    }
}
