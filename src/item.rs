//! Items of the document sequence and their computed layout records.

use std::fmt;

use crate::font::FontDescriptor;

/// A span of text sharing one font.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: FontDescriptor,
}

impl TextRun {
    #[must_use]
    pub fn new(text: impl Into<String>, font: FontDescriptor) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }

    /// Length in chars, the unit of flattened positions.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split off everything from char `offset` on into a new run with a
    /// cloned font. `offset` is clamped to the run length.
    pub fn split_off(&mut self, offset: usize) -> Self {
        let byte = char_to_byte(&self.text, offset);
        Self {
            text: self.text.split_off(byte),
            font: self.font.clone(),
        }
    }

    /// True when the run is all whitespace (an empty run counts as not).
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_whitespace)
    }
}

/// One entry of the document sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum DocumentItem {
    /// Styled text; never spans a break.
    TextRun(TextRun),
    /// The caret. Exactly one exists after every layout pass.
    Cursor,
    /// User line break, one character in flattened text.
    HardBreak,
    /// Wrap point inserted by layout, regenerated every pass.
    SoftBreak,
}

impl DocumentItem {
    /// Convenience constructor for a text run item.
    #[must_use]
    pub fn text(text: impl Into<String>, font: FontDescriptor) -> Self {
        Self::TextRun(TextRun::new(text, font))
    }

    #[must_use]
    pub const fn as_run(&self) -> Option<&TextRun> {
        match self {
            Self::TextRun(run) => Some(run),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_cursor(&self) -> bool {
        matches!(self, Self::Cursor)
    }

    /// Hard and soft breaks both end a visual line.
    #[must_use]
    pub const fn is_break(&self) -> bool {
        matches!(self, Self::HardBreak | Self::SoftBreak)
    }

    /// Contribution to flattened character positions.
    #[must_use]
    pub fn flat_len(&self) -> usize {
        match self {
            Self::TextRun(run) => run.char_len(),
            Self::HardBreak => 1,
            Self::Cursor | Self::SoftBreak => 0,
        }
    }
}

impl fmt::Display for DocumentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextRun(run) => write!(f, "Run({:?}, {})", run.text, run.font.css()),
            Self::Cursor => f.write_str("Cursor"),
            Self::HardBreak => f.write_str("HardBreak"),
            Self::SoftBreak => f.write_str("SoftBreak"),
        }
    }
}

/// Computed placement of one item, rebuilt by every layout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemLayout {
    /// Left edge in pixels, alignment offset included.
    pub pos_x: f32,
    /// Baseline of the item's line.
    pub pos_y: f32,
    pub line_height: f32,
    /// Advance width (zero for everything but text runs).
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Caret height; only set for the cursor.
    pub height: f32,
}

/// Computed geometry of one visual line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineLayout {
    /// First item index of the line.
    pub start: usize,
    /// One past the last item; a terminating break is included.
    pub end: usize,
    /// Top edge of the line box.
    pub top: f32,
    pub height: f32,
    pub baseline: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Summed width of the line's runs.
    pub width: f32,
    /// Horizontal shift applied by paragraph alignment.
    pub offset_x: f32,
    /// Number of hard breaks before the line.
    pub paragraph: usize,
    /// Whether any text run sits on the line.
    pub has_text: bool,
}

impl LineLayout {
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Half-open vertical band owned by the line.
    #[must_use]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// Byte index of char `offset` in `text`, clamped to the end.
pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(byte, _)| byte)
}
