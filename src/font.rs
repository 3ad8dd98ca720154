//! Font descriptors for text runs.
//!
//! - [`FontDescriptor`]: size, family, weight, style, decorations, baseline
//!   shift and color of a run
//! - [`TextDecoration`]: bitflags for underline and strikethrough
//! - [`BaselineShift`]: superscript/subscript, one field so the two can
//!   never be set together
//!
//! # Examples
//!
//! ```
//! use runchain::{BaselineShift, FontDescriptor, FontWeight, Rgba};
//!
//! let heading = FontDescriptor::default()
//!     .with_size(24.0)
//!     .with_weight(FontWeight::Bold)
//!     .with_color(Rgba::BLUE);
//! assert_eq!(heading.css(), "bold 24px sans-serif");
//!
//! let sup = heading.clone().with_baseline(BaselineShift::Superscript);
//! assert_ne!(sup, heading);
//! ```

use bitflags::bitflags;

use crate::color::Rgba;

/// Scale applied to superscript and subscript glyphs.
pub const SCRIPT_SCALE: f32 = 0.7;

/// Default font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Default font family.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

bitflags! {
    /// Line decorations drawn with a run.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextDecoration: u8 {
        /// Line under the baseline.
        const UNDERLINE     = 0x01;
        /// Line through the x-height.
        const STRIKETHROUGH = 0x02;
    }
}

/// Font weight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Vertical position of the glyphs relative to the line baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BaselineShift {
    #[default]
    Normal,
    Superscript,
    Subscript,
}

/// Typeface description of a text run.
///
/// Descriptors are plain values: modify them with the `with_*` methods,
/// which return an updated copy.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDescriptor {
    /// Nominal size in pixels (always positive).
    pub size: f32,
    /// Family name as understood by the host measurer.
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub decorations: TextDecoration,
    pub baseline: BaselineShift,
    pub color: Rgba,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            family: DEFAULT_FONT_FAMILY.to_string(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            decorations: TextDecoration::empty(),
            baseline: BaselineShift::Normal,
            color: Rgba::BLACK,
        }
    }
}

impl FontDescriptor {
    /// Create a regular descriptor with the given size and family.
    #[must_use]
    pub fn new(size: f32, family: impl Into<String>) -> Self {
        Self {
            size,
            family: family.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    #[must_use]
    pub const fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub const fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the baseline shift. Superscript replaces subscript and vice versa.
    #[must_use]
    pub const fn with_baseline(mut self, baseline: BaselineShift) -> Self {
        self.baseline = baseline;
        self
    }

    /// Add or remove a decoration.
    #[must_use]
    pub fn with_decoration(mut self, decoration: TextDecoration, enabled: bool) -> Self {
        self.decorations.set(decoration, enabled);
        self
    }

    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    #[must_use]
    pub fn is_italic(&self) -> bool {
        self.style == FontStyle::Italic
    }

    #[must_use]
    pub const fn is_underline(&self) -> bool {
        self.decorations.contains(TextDecoration::UNDERLINE)
    }

    #[must_use]
    pub const fn is_strikethrough(&self) -> bool {
        self.decorations.contains(TextDecoration::STRIKETHROUGH)
    }

    #[must_use]
    pub fn is_superscript(&self) -> bool {
        self.baseline == BaselineShift::Superscript
    }

    #[must_use]
    pub fn is_subscript(&self) -> bool {
        self.baseline == BaselineShift::Subscript
    }

    /// Size the glyphs are actually rendered at.
    #[must_use]
    pub fn effective_size(&self) -> f32 {
        match self.baseline {
            BaselineShift::Normal => self.size,
            BaselineShift::Superscript | BaselineShift::Subscript => self.size * SCRIPT_SCALE,
        }
    }

    /// Vertical glyph offset from the line baseline (negative is up).
    #[must_use]
    pub fn baseline_offset(&self) -> f32 {
        match self.baseline {
            BaselineShift::Normal => 0.0,
            BaselineShift::Superscript => -0.35 * self.size,
            BaselineShift::Subscript => 0.15 * self.size,
        }
    }

    /// Canvas/CSS font shorthand, e.g. `"italic bold 16px Georgia"`.
    #[must_use]
    pub fn css(&self) -> String {
        let mut out = String::new();
        if self.is_italic() {
            out.push_str("italic ");
        }
        if self.is_bold() {
            out.push_str("bold ");
        }
        out.push_str(&format!("{}px {}", self.effective_size(), self.family));
        out
    }
}
