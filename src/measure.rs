//! Text measurement collaborator.
//!
//! The layout pipeline never rasterizes anything itself; it asks a
//! [`TextMeasurer`] for the advance width and vertical extents of a string
//! in a given font. A canvas host implements this with `measureText`.
//! [`MonospaceMeasurer`] is a deterministic stand-in for tests, benchmarks
//! and headless layout.

use unicode_width::UnicodeWidthChar;

use crate::font::FontDescriptor;

/// Ascent as a fraction of the rendered font size.
const ASCENT_RATIO: f32 = 0.75;
/// Descent as a fraction of the rendered font size.
const DESCENT_RATIO: f32 = 0.25;

/// Measured extents of a string.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width in pixels.
    pub width: f32,
    /// Distance from the baseline to the top of the glyphs.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the glyphs.
    pub descent: f32,
}

impl TextMetrics {
    #[must_use]
    pub const fn new(width: f32, ascent: f32, descent: f32) -> Self {
        Self {
            width,
            ascent,
            descent,
        }
    }

    /// Total glyph height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Measures text for layout.
///
/// Implementations must be deterministic: the pipeline measures the same
/// `(text, font)` pair many times per pass and assumes identical results.
/// Measuring an empty string must still report the font's ascent and
/// descent; blank lines take their height from it.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> TextMetrics;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, &FontDescriptor) -> TextMetrics,
{
    fn measure(&self, text: &str, font: &FontDescriptor) -> TextMetrics {
        self(text, font)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Advance {
    /// Fixed pixels per cell regardless of font.
    Fixed(f32),
    /// Fraction of the rendered font size per cell.
    Em(f32),
}

/// Monospace measurer: every terminal cell of a char gets the same advance.
///
/// Wide chars (CJK, most emoji) take two cells and zero-width chars none,
/// following `unicode-width`.
///
/// ```
/// use runchain::{FontDescriptor, MonospaceMeasurer, TextMeasurer};
///
/// let measurer = MonospaceMeasurer::new(8.0);
/// let metrics = measurer.measure("Hello", &FontDescriptor::default());
/// assert_eq!(metrics.width, 40.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    advance: Advance,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::em(0.5)
    }
}

impl MonospaceMeasurer {
    /// Fixed advance in pixels per cell.
    #[must_use]
    pub const fn new(advance: f32) -> Self {
        Self {
            advance: Advance::Fixed(advance),
        }
    }

    /// Advance proportional to the rendered font size.
    #[must_use]
    pub const fn em(ratio: f32) -> Self {
        Self {
            advance: Advance::Em(ratio),
        }
    }

    fn cell_advance(&self, font: &FontDescriptor) -> f32 {
        match self.advance {
            Advance::Fixed(px) => px,
            Advance::Em(ratio) => ratio * font.effective_size(),
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> TextMetrics {
        let cells: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
        let size = font.effective_size();
        TextMetrics {
            width: cells as f32 * self.cell_advance(font),
            ascent: size * ASCENT_RATIO,
            descent: size * DESCENT_RATIO,
        }
    }
}
