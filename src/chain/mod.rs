//! The document chain: item sequence, edits and the layout pipeline.
//!
//! A [`DocumentChain`] owns an ordered list of [`DocumentItem`]s (text runs,
//! one cursor, hard and soft breaks) and the layout computed from them.
//! Every public operation that changes the sequence finishes by running the
//! normalize/layout pipeline, so readers only ever observe consistent
//! layout.
//!
//! Positions come in two forms:
//!
//! - flattened char offsets (`usize`): runs count their chars, hard breaks
//!   count one, cursor and soft breaks count nothing. Selections and the
//!   clipboard use these because they survive structural edits.
//! - [`ItemPosition`]: an index into the current item sequence plus a char
//!   offset inside a run. Only valid until the next mutation.
//!
//! # Examples
//!
//! ```
//! use runchain::{ChainOptions, DocumentChain, MonospaceMeasurer};
//!
//! let mut chain = DocumentChain::new(MonospaceMeasurer::new(8.0), ChainOptions::default())?;
//! chain.insert_text("Hello");
//! chain.insert_hard_break();
//! chain.insert_text("world");
//! assert_eq!(chain.text(), "Hello\nworld");
//! assert_eq!(chain.lines().len(), 2);
//!
//! chain.click_at(1000.0, 0.0);
//! assert_eq!(chain.cursor_position(), 5);
//! # Ok::<(), runchain::Error>(())
//! ```

mod edit;
mod hit;
mod layout;
mod selection;

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::event::{INVARIANT_VIOLATION, LogLevel, emit_event, emit_log};
use crate::font::FontDescriptor;
use crate::history::Snapshot;
use crate::item::{DocumentItem, ItemLayout, LineLayout};
use crate::measure::TextMeasurer;

/// Default line height multiplier.
pub const DEFAULT_LINE_SPACING: f32 = 1.5;

/// Default wrap width in pixels.
pub const DEFAULT_WRAP_WIDTH: f32 = 800.0;

/// Layout configuration of a chain.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainOptions {
    /// Maximum line width before soft wrapping. `f32::INFINITY` disables
    /// wrapping.
    pub wrap_width: f32,
    /// Multiplier applied to the natural line height.
    pub line_spacing: f32,
    /// Font used for newly typed text and blank line heights.
    pub font: FontDescriptor,
    /// Log a chain dump at `Debug` level and emit a `layout` event after
    /// every pass. The dump bypasses the global log level.
    pub debug: bool,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            line_spacing: DEFAULT_LINE_SPACING,
            font: FontDescriptor::default(),
            debug: false,
        }
    }
}

/// Horizontal alignment of a paragraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A non-empty range of flattened char offsets with `start < end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Build a normalized selection; `None` when both ends coincide.
    #[must_use]
    pub fn new(a: usize, b: usize) -> Option<Self> {
        if a == b {
            return None;
        }
        Some(Self {
            start: a.min(b),
            end: a.max(b),
        })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if a flattened position is inside the selection.
    #[must_use]
    pub const fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }
}

/// Place in the item sequence: before char `offset` of the run at `index`,
/// or before the item at `index` when `offset` is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItemPosition {
    pub index: usize,
    pub offset: usize,
}

impl ItemPosition {
    #[must_use]
    pub const fn new(index: usize, offset: usize) -> Self {
        Self { index, offset }
    }

    /// Position directly before an item.
    #[must_use]
    pub const fn before(index: usize) -> Self {
        Self { index, offset: 0 }
    }
}

pub(crate) fn validate_wrap_width(width: f32) -> Result<f32> {
    if width.is_nan() || width <= 0.0 {
        return Err(Error::InvalidWrapWidth(width));
    }
    Ok(width)
}

pub(crate) fn validate_line_spacing(spacing: f32) -> Result<f32> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(Error::InvalidLineSpacing(spacing));
    }
    Ok(spacing)
}

pub(crate) fn validate_font_size(size: f32) -> Result<f32> {
    if !size.is_finite() || size <= 0.0 {
        return Err(Error::InvalidFontSize(size));
    }
    Ok(size)
}

/// Ordered document items plus the layout computed from them.
pub struct DocumentChain {
    items: Vec<DocumentItem>,
    /// Parallel to `items` once a pass completes; empty during the pass.
    layout: Vec<ItemLayout>,
    lines: Vec<LineLayout>,
    measurer: Box<dyn TextMeasurer>,
    wrap_width: f32,
    line_spacing: f32,
    current_font: FontDescriptor,
    /// Sparse: paragraphs without an entry are left aligned.
    alignments: BTreeMap<usize, Alignment>,
    selection: Option<Selection>,
    /// Sticky column for vertical moves.
    target_x: Option<f32>,
    /// The cursor was placed at the start of a wrapped line and should stay
    /// there rather than at the end of the line above.
    caret_after_wrap: bool,
    revision: u64,
    violations: usize,
    debug: bool,
}

impl fmt::Debug for DocumentChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentChain")
            .field("items", &self.items)
            .field("wrap_width", &self.wrap_width)
            .field("line_spacing", &self.line_spacing)
            .field("current_font", &self.current_font)
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl DocumentChain {
    /// Create an empty chain holding only the cursor, laid out.
    pub fn new(measurer: impl TextMeasurer + 'static, options: ChainOptions) -> Result<Self> {
        Self::from_items(measurer, options, vec![DocumentItem::Cursor])
    }

    /// Create a chain from an existing item sequence.
    ///
    /// A sequence without a cursor is repaired (and counted as an invariant
    /// violation); soft breaks are discarded by the first layout pass.
    pub fn from_items(
        measurer: impl TextMeasurer + 'static,
        options: ChainOptions,
        items: Vec<DocumentItem>,
    ) -> Result<Self> {
        let wrap_width = validate_wrap_width(options.wrap_width)?;
        let line_spacing = validate_line_spacing(options.line_spacing)?;
        validate_font_size(options.font.size)?;
        let mut chain = Self {
            items,
            layout: Vec::new(),
            lines: Vec::new(),
            measurer: Box::new(measurer),
            wrap_width,
            line_spacing,
            current_font: options.font,
            alignments: BTreeMap::new(),
            selection: None,
            target_x: None,
            caret_after_wrap: false,
            revision: 0,
            violations: 0,
            debug: options.debug,
        };
        chain.run_pipeline();
        Ok(chain)
    }

    /// The item sequence as of the last layout pass.
    #[must_use]
    pub fn items(&self) -> &[DocumentItem] {
        &self.items
    }

    /// Computed layout of the item at `index`.
    #[must_use]
    pub fn layout(&self, index: usize) -> Option<&ItemLayout> {
        self.layout.get(index)
    }

    /// Computed layout of every item, parallel to [`items`](Self::items).
    #[must_use]
    pub fn layouts(&self) -> &[ItemLayout] {
        &self.layout
    }

    /// Visual lines, top to bottom.
    #[must_use]
    pub fn lines(&self) -> &[LineLayout] {
        &self.lines
    }

    /// Total height of the laid out document.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.lines.last().map_or(0.0, LineLayout::bottom)
    }

    #[must_use]
    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    #[must_use]
    pub const fn wrap_width(&self) -> f32 {
        self.wrap_width
    }

    /// Change the wrap width and re-layout.
    pub fn set_wrap_width(&mut self, width: f32) -> Result<()> {
        self.wrap_width = validate_wrap_width(width)?;
        self.run_pipeline();
        Ok(())
    }

    #[must_use]
    pub const fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    pub fn set_line_spacing(&mut self, spacing: f32) -> Result<()> {
        self.line_spacing = validate_line_spacing(spacing)?;
        self.run_pipeline();
        Ok(())
    }

    /// Font applied to text typed from now on.
    #[must_use]
    pub const fn current_font(&self) -> &FontDescriptor {
        &self.current_font
    }

    pub fn set_current_font(&mut self, font: FontDescriptor) -> Result<()> {
        validate_font_size(font.size)?;
        self.replace_current_font(font);
        Ok(())
    }

    pub(crate) fn replace_current_font(&mut self, font: FontDescriptor) {
        self.current_font = font;
        // Blank lines take their height from the current font.
        self.run_pipeline();
    }

    /// Alignment of paragraph `paragraph` (count of hard breaks before it).
    #[must_use]
    pub fn alignment(&self, paragraph: usize) -> Alignment {
        self.alignments
            .get(&paragraph)
            .copied()
            .unwrap_or_default()
    }

    /// Set a paragraph's alignment and re-layout. `Left` clears the entry.
    pub fn set_alignment(&mut self, paragraph: usize, alignment: Alignment) {
        match alignment {
            Alignment::Left => {
                self.alignments.remove(&paragraph);
            }
            Alignment::Center | Alignment::Right => {
                self.alignments.insert(paragraph, alignment);
            }
        }
        self.run_pipeline();
    }

    /// Number of completed layout passes.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// How many times a broken invariant had to be repaired.
    #[must_use]
    pub const fn invariant_violations(&self) -> usize {
        self.violations
    }

    /// Index of the cursor item.
    ///
    /// A missing cursor is a bug elsewhere in the chain. It is logged with a
    /// full dump, reported as an [`INVARIANT_VIOLATION`] event and repaired
    /// by appending a cursor at the end of the document, so the host keeps
    /// a usable editor.
    pub fn cursor_index(&mut self) -> usize {
        if let Some(index) = self.find_cursor() {
            return index;
        }
        self.report_violation("cursor missing, re-inserted at document end");
        self.items.push(DocumentItem::Cursor);
        self.items.len() - 1
    }

    /// Index of the cursor item without repairing anything.
    #[must_use]
    pub fn find_cursor(&self) -> Option<usize> {
        self.items.iter().position(DocumentItem::is_cursor)
    }

    /// Computed layout of the cursor.
    #[must_use]
    pub fn cursor_layout(&self) -> Option<&ItemLayout> {
        self.find_cursor().and_then(|index| self.layout.get(index))
    }

    /// Flattened offset of the cursor.
    #[must_use]
    pub fn cursor_position(&self) -> usize {
        let index = self.find_cursor().unwrap_or(self.items.len());
        self.flat_start_of(index)
    }

    /// Move the cursor to a flattened offset (clamped) and re-layout.
    pub fn set_cursor_position(&mut self, pos: usize) {
        self.selection = None;
        self.target_x = None;
        self.place_cursor_flat(pos);
        self.run_pipeline();
    }

    /// Number of flattened chars in the document.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.items.iter().map(DocumentItem::flat_len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Flattened offset at which the item at `index` starts.
    #[must_use]
    pub fn flat_start_of(&self, index: usize) -> usize {
        self.items
            .iter()
            .take(index)
            .map(DocumentItem::flat_len)
            .sum()
    }

    /// Convert an item position to a flattened offset.
    ///
    /// Out of range indices clamp to the document end and offsets clamp to
    /// the item's length, so stale positions never panic.
    #[must_use]
    pub fn flat_position(&self, pos: ItemPosition) -> usize {
        let index = pos.index.min(self.items.len());
        let within = self
            .items
            .get(index)
            .map_or(0, |item| pos.offset.min(item.flat_len()));
        self.flat_start_of(index) + within
    }

    /// Plain text with `'\n'` for hard breaks. Formatting is not included.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                DocumentItem::TextRun(run) => out.push_str(&run.text),
                DocumentItem::HardBreak => out.push('\n'),
                DocumentItem::Cursor | DocumentItem::SoftBreak => {}
            }
        }
        out
    }

    /// Replace the document with plain text in the current font. The cursor
    /// ends up at the end and the selection is cleared.
    pub fn set_text(&mut self, text: &str) {
        self.items.clear();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.items.push(DocumentItem::HardBreak);
            }
            if !line.is_empty() {
                self.items
                    .push(DocumentItem::text(line, self.current_font.clone()));
            }
        }
        self.items.push(DocumentItem::Cursor);
        self.selection = None;
        self.target_x = None;
        self.caret_after_wrap = false;
        self.run_pipeline();
    }

    /// Value copy of the items (soft breaks dropped) and selection.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self
                .items
                .iter()
                .filter(|item| !matches!(item, DocumentItem::SoftBreak))
                .cloned()
                .collect(),
            selection: self.selection,
        }
    }

    /// Restore a snapshot and re-layout.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.items = snapshot.items;
        self.selection = snapshot.selection;
        self.target_x = None;
        self.caret_after_wrap = false;
        self.run_pipeline();
        self.clamp_selection();
    }

    /// Human-readable listing of items and their layout.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = format!(
            "chain rev {} wrap {} ({} items, {} lines)\n",
            self.revision,
            self.wrap_width,
            self.items.len(),
            self.lines.len()
        );
        for (i, item) in self.items.iter().enumerate() {
            match self.layout.get(i) {
                Some(l) => {
                    let _ = writeln!(
                        out,
                        "  [{i}] {item} x={} y={} w={} lh={}",
                        l.pos_x, l.pos_y, l.width, l.line_height
                    );
                }
                None => {
                    let _ = writeln!(out, "  [{i}] {item} (no layout)");
                }
            }
        }
        out
    }

    fn report_violation(&mut self, what: &str) {
        self.violations += 1;
        emit_log(
            LogLevel::Error,
            &format!("invariant violation: {what}\n{}", self.dump()),
        );
        emit_event(INVARIANT_VIOLATION, what);
    }

    /// Insert the cursor item, remembering whether it starts a wrapped line.
    fn insert_cursor_at(&mut self, index: usize) {
        let index = index.min(self.items.len());
        self.items.insert(index, DocumentItem::Cursor);
        self.caret_after_wrap =
            index > 0 && matches!(self.items[index - 1], DocumentItem::SoftBreak);
    }

    /// Move the cursor item to an item position, splitting a run when the
    /// position falls inside one. Does not re-layout.
    fn place_cursor(&mut self, pos: ItemPosition) {
        let current = self.cursor_index();
        self.items.remove(current);
        let mut index = pos.index.min(self.items.len() + 1);
        if current < index {
            index -= 1;
        }
        let mut insert_at = index;
        let mut tail = None;
        if let Some(DocumentItem::TextRun(run)) = self.items.get_mut(index) {
            if pos.offset > 0 {
                insert_at = index + 1;
                if pos.offset < run.char_len() {
                    tail = Some(run.split_off(pos.offset));
                }
            }
        }
        if let Some(tail) = tail {
            self.items.insert(index + 1, DocumentItem::TextRun(tail));
        }
        self.insert_cursor_at(insert_at);
    }

    /// Move the cursor item to a flattened offset (clamped), splitting a run
    /// when needed. Does not re-layout.
    fn place_cursor_flat(&mut self, pos: usize) {
        if let Some(current) = self.find_cursor() {
            self.items.remove(current);
        }
        let mut acc = 0;
        let mut target = None;
        for (i, item) in self.items.iter_mut().enumerate() {
            match item {
                DocumentItem::TextRun(run) => {
                    let len = run.char_len();
                    if pos <= acc {
                        target = Some((i, None));
                        break;
                    }
                    if pos < acc + len {
                        target = Some((i + 1, Some(run.split_off(pos - acc))));
                        break;
                    }
                    acc += len;
                }
                DocumentItem::HardBreak => {
                    if pos <= acc {
                        target = Some((i, None));
                        break;
                    }
                    acc += 1;
                }
                DocumentItem::Cursor | DocumentItem::SoftBreak => {}
            }
        }
        match target {
            Some((index, Some(tail))) => {
                self.items.insert(index, DocumentItem::TextRun(tail));
                self.insert_cursor_at(index);
            }
            Some((index, None)) => self.insert_cursor_at(index),
            None => self.insert_cursor_at(self.items.len()),
        }
    }

    /// Split the run containing flattened `pos` strictly inside it.
    fn split_at_flat(&mut self, pos: usize) {
        let mut acc = 0;
        let mut split = None;
        for (i, item) in self.items.iter_mut().enumerate() {
            let len = item.flat_len();
            if let DocumentItem::TextRun(run) = item {
                if pos > acc && pos < acc + len {
                    split = Some((i + 1, run.split_off(pos - acc)));
                    break;
                }
            }
            acc += len;
        }
        if let Some((index, tail)) = split {
            self.items.insert(index, DocumentItem::TextRun(tail));
        }
    }

    /// Drop a selection that no longer fits the document.
    fn clamp_selection(&mut self) {
        let len = self.len_chars();
        self.selection = self
            .selection
            .and_then(|sel| Selection::new(sel.start.min(len), sel.end.min(len)));
    }
}
